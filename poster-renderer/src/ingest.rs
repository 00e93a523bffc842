//! Asynchronous asset ingestion.
//!
//! Backgrounds, QR codes, and logos are fetched and decoded on the tokio
//! runtime, never on the interaction thread. Each completed decode is posted
//! to an unbounded completion channel; the session owner applies completions
//! in arrival order. Placement is fixed by the request's slot within its
//! batch, so interleaved completions still land at their intended spots.
//!
//! Every request is stamped with the loader generation current at issue
//! time. [`AssetLoader::invalidate_pending`] bumps the generation, which
//! strands in-flight requests: their completions are recognized as stale by
//! [`AssetLoader::is_current`] and dropped instead of resurrecting elements
//! after a clear.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::Engine;
use poster_core::{
    Bitmap, EditorSession, EngineConfig, ImageElement, Point, QrCodeSource, QrMetadata,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{RenderError, RenderResult};

/// Where an asset's bytes come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// HTTP(S) fetch.
    Url(String),
    /// Filesystem read.
    File(PathBuf),
    /// `data:image/...;base64,` payload.
    DataUri(String),
    /// Bytes already in hand.
    Bytes(Vec<u8>),
}

/// What the decoded asset becomes in the scene.
#[derive(Debug, Clone)]
pub enum AssetKind {
    /// Scene background, stretched across the whole canvas.
    Background,
    /// Pre-rendered QR code with provenance metadata.
    Qr {
        /// Origin text and payload kind, carried for display.
        metadata: QrMetadata,
        /// Position within the ingest batch.
        slot: usize,
    },
    /// Uploaded QR image file.
    QrUpload {
        /// Position within the ingest batch.
        slot: usize,
    },
    /// Uploaded logo file.
    Logo {
        /// Position within the ingest batch.
        slot: usize,
    },
}

/// Unique identifier for one ingest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pairs a request with the loader generation it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestTicket {
    /// Request identifier.
    pub id: RequestId,
    /// Loader generation at request time.
    pub generation: u64,
}

/// What a completed ingest produced.
#[derive(Debug)]
pub enum IngestPayload {
    /// A decoded background bitmap.
    Background(Arc<Bitmap>),
    /// A placed image element ready for insertion.
    Element(ImageElement),
}

/// One finished ingest request, successful or not.
#[derive(Debug)]
pub struct IngestOutcome {
    /// The originating request.
    pub ticket: IngestTicket,
    /// Decoded payload, or the failure that prevented it.
    pub result: RenderResult<IngestPayload>,
}

/// Spawns decode tasks and funnels their outcomes into one channel.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    sender: mpsc::UnboundedSender<IngestOutcome>,
    generation: Arc<AtomicU64>,
    config: EngineConfig,
}

impl AssetLoader {
    /// Create a loader and the receiving end of its completion channel.
    #[must_use]
    pub fn new(config: EngineConfig) -> (Self, mpsc::UnboundedReceiver<IngestOutcome>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let loader = Self {
            sender,
            generation: Arc::new(AtomicU64::new(0)),
            config,
        };
        (loader, receiver)
    }

    /// Generation stamp issued to new requests.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a completion is still current.
    #[must_use]
    pub fn is_current(&self, ticket: &IngestTicket) -> bool {
        ticket.generation == self.generation()
    }

    /// Invalidate every outstanding request.
    ///
    /// Completions already decoded but not yet applied become stale; the
    /// receiver drops them via [`AssetLoader::is_current`]. Pairs with
    /// [`EditorSession::clear`] so a late decode cannot resurrect an
    /// element after the canvas was cleared.
    pub fn invalidate_pending(&self) {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Ingest generation advanced to {next}");
    }

    /// Queue one asset for fetch and decode. Needs a running tokio runtime.
    ///
    /// Returns the ticket identifying the eventual completion.
    #[must_use]
    pub fn request(&self, source: AssetSource, kind: AssetKind) -> IngestTicket {
        let ticket = IngestTicket {
            id: RequestId::new(),
            generation: self.generation(),
        };
        let sender = self.sender.clone();
        let config = self.config.clone();
        tracing::debug!("Ingest {} queued: {kind:?}", ticket.id);
        tokio::spawn(async move {
            let result = load_asset(&source, &kind, &config).await;
            if let Err(error) = &result {
                tracing::warn!("Ingest {} failed: {error}", ticket.id);
            }
            if sender.send(IngestOutcome { ticket, result }).is_err() {
                tracing::debug!("Completion receiver dropped; discarding {}", ticket.id);
            }
        });
        ticket
    }

    /// Queue a background load.
    #[must_use]
    pub fn request_background(&self, source: AssetSource) -> IngestTicket {
        self.request(source, AssetKind::Background)
    }

    /// Queue every QR code of a generator batch, placed diagonally from the
    /// QR origin in slot order.
    #[must_use]
    pub fn request_qr_batch(&self, sources: &[QrCodeSource]) -> Vec<IngestTicket> {
        sources
            .iter()
            .enumerate()
            .map(|(slot, source)| {
                self.request(
                    AssetSource::DataUri(source.data_url.clone()),
                    AssetKind::Qr {
                        metadata: source.metadata(),
                        slot,
                    },
                )
            })
            .collect()
    }

    /// Queue uploaded QR images. Sources beyond the per-batch limit are
    /// discarded.
    #[must_use]
    pub fn request_qr_uploads(&self, sources: Vec<AssetSource>) -> Vec<IngestTicket> {
        let limit = self.config.max_qr_uploads;
        if sources.len() > limit {
            tracing::warn!("QR upload batch truncated to {limit}");
        }
        sources
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(slot, source)| self.request(source, AssetKind::QrUpload { slot }))
            .collect()
    }

    /// Queue uploaded logos. Sources beyond the per-batch limit are
    /// discarded.
    #[must_use]
    pub fn request_logos(&self, sources: Vec<AssetSource>) -> Vec<IngestTicket> {
        let limit = self.config.max_logo_uploads;
        if sources.len() > limit {
            tracing::warn!("Logo upload batch truncated to {limit}");
        }
        sources
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(slot, source)| self.request(source, AssetKind::Logo { slot }))
            .collect()
    }
}

/// Apply one completion to the session.
///
/// Stale completions are dropped at debug level and failed ones propagate
/// their error; in both cases the scene is left untouched. Returns whether
/// the scene was mutated.
///
/// # Errors
///
/// Returns the ingest failure carried by a current (non-stale) outcome.
pub fn apply_outcome(
    session: &mut EditorSession,
    loader: &AssetLoader,
    outcome: IngestOutcome,
) -> RenderResult<bool> {
    if !loader.is_current(&outcome.ticket) {
        tracing::debug!("Dropping stale ingest completion {}", outcome.ticket.id);
        return Ok(false);
    }
    match outcome.result? {
        IngestPayload::Background(bitmap) => session.set_background(Some(bitmap)),
        IngestPayload::Element(element) => {
            session.insert_image(element);
        }
    }
    Ok(true)
}

async fn load_asset(
    source: &AssetSource,
    kind: &AssetKind,
    config: &EngineConfig,
) -> RenderResult<IngestPayload> {
    let bytes = fetch_bytes(source).await.map_err(|e| annotate(kind, e))?;
    let bitmap = decode_bitmap(&bytes).map_err(|e| annotate(kind, e))?;
    Ok(place_payload(bitmap, kind, config))
}

/// Background failures carry their own caller-facing message.
fn annotate(kind: &AssetKind, error: RenderError) -> RenderError {
    match kind {
        AssetKind::Background => RenderError::Background(error.to_string()),
        _ => error,
    }
}

async fn fetch_bytes(source: &AssetSource) -> RenderResult<Vec<u8>> {
    match source {
        AssetSource::Url(url) => {
            let response = reqwest::get(url)
                .await
                .map_err(|e| RenderError::Fetch(e.to_string()))?
                .error_for_status()
                .map_err(|e| RenderError::Fetch(e.to_string()))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| RenderError::Fetch(e.to_string()))?;
            Ok(bytes.to_vec())
        }
        AssetSource::File(path) => Ok(tokio::fs::read(path).await?),
        AssetSource::DataUri(uri) => decode_data_uri(uri),
        AssetSource::Bytes(bytes) => Ok(bytes.clone()),
    }
}

fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let payload = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Decode("not a data URI".to_string()))?;
    let comma = payload
        .find(',')
        .ok_or_else(|| RenderError::Decode("data URI missing comma".to_string()))?;
    let (header, encoded) = payload.split_at(comma);
    let encoded = &encoded[1..];
    if !header.contains(";base64") {
        return Err(RenderError::Decode(
            "unsupported data URI encoding".to_string(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| RenderError::Decode(format!("bad base64 payload: {e}")))
}

fn decode_bitmap(bytes: &[u8]) -> RenderResult<Arc<Bitmap>> {
    let decoded = image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let bitmap = Bitmap::from_rgba8(width, height, rgba.into_raw())
        .map_err(|e| RenderError::Decode(e.to_string()))?;
    Ok(Arc::new(bitmap))
}

/// Compute the element placement for a decoded asset.
#[allow(clippy::cast_precision_loss)]
fn place_payload(bitmap: Arc<Bitmap>, kind: &AssetKind, config: &EngineConfig) -> IngestPayload {
    match kind {
        AssetKind::Background => IngestPayload::Background(bitmap),
        AssetKind::Qr { metadata, slot } => {
            let offset = *slot as f32 * config.qr_step;
            IngestPayload::Element(ImageElement {
                position: Point::new(config.qr_origin.x + offset, config.qr_origin.y + offset),
                width: config.qr_size,
                height: config.qr_size,
                source_aspect: 1.0,
                qr: Some(metadata.clone()),
                bitmap,
            })
        }
        AssetKind::QrUpload { slot } => {
            let offset = *slot as f32 * config.qr_step;
            let aspect = bitmap.aspect_ratio();
            IngestPayload::Element(ImageElement {
                position: Point::new(config.qr_origin.x + offset, config.qr_origin.y + offset),
                width: config.qr_size,
                height: config.qr_size / aspect,
                source_aspect: aspect,
                qr: None,
                bitmap,
            })
        }
        AssetKind::Logo { slot } => {
            let aspect = bitmap.aspect_ratio();
            IngestPayload::Element(ImageElement {
                position: Point::new(
                    config.logo_origin.x + *slot as f32 * config.logo_step_x,
                    config.logo_origin.y,
                ),
                width: config.logo_width,
                height: config.logo_width / aspect,
                source_aspect: aspect,
                qr: None,
                bitmap,
            })
        }
    }
}
