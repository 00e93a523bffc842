//! # Poster CLI
//!
//! Headless poster composition: ingest a background, QR codes, and logos,
//! lay text over them, and export the print-resolution PNG.
//!
//! Asset references may be file paths, http(s) URLs, or data URIs. Set
//! `RUST_LOG` to control log levels and `RUST_LOG_FORMAT=json` for JSON
//! output.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use poster_core::{EditorSession, EngineConfig, QrCodeSource};
use poster_renderer::{apply_outcome, AssetLoader, AssetSource, Compositor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long to wait for any single asset before giving up on the batch.
const INGEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Vertical spacing between successive `--text` lines.
const TEXT_LINE_STEP: f32 = 60.0;

#[derive(Parser, Debug)]
#[command(
    name = "poster-cli",
    about = "Compose a poster headlessly and export it as a PNG",
    version
)]
struct Cli {
    /// Background image: file path, http(s) URL, or data URI.
    #[arg(long, env = "POSTER_BACKGROUND", value_name = "SOURCE")]
    background: Option<String>,

    /// JSON file holding a QR generator batch (array of dataURL entries).
    #[arg(long, value_name = "PATH")]
    qr_manifest: Option<PathBuf>,

    /// Logo image file; repeat for multiple logos.
    #[arg(long = "logo", value_name = "PATH")]
    logos: Vec<PathBuf>,

    /// Text line to place on the poster; repeat for multiple lines.
    #[arg(long = "text", value_name = "CONTENT")]
    texts: Vec<String>,

    /// Output path. Defaults to the generated poster filename.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

/// Initialize structured tracing.
///
/// `RUST_LOG` controls levels (default: info plus renderer debug).
/// `RUST_LOG_FORMAT=json` switches to JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,poster_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Classify a command-line asset reference.
fn parse_source(raw: &str) -> AssetSource {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        AssetSource::Url(raw.to_string())
    } else if raw.starts_with("data:") {
        AssetSource::DataUri(raw.to_string())
    } else {
        AssetSource::File(PathBuf::from(raw))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = EngineConfig::default();
    let mut session = EditorSession::new(config.clone());
    let compositor = Compositor::with_defaults();
    let (loader, mut completions) = AssetLoader::new(config.clone());

    // Queue every asset up front; decodes run concurrently on the runtime.
    let mut tickets = Vec::new();
    if let Some(background) = &cli.background {
        tickets.push(loader.request_background(parse_source(background)));
    }
    if let Some(manifest_path) = &cli.qr_manifest {
        let manifest = std::fs::read_to_string(manifest_path)
            .with_context(|| format!("reading QR manifest {}", manifest_path.display()))?;
        let sources = QrCodeSource::parse_batch(&manifest)
            .with_context(|| format!("parsing QR manifest {}", manifest_path.display()))?;
        tickets.extend(loader.request_qr_batch(&sources));
    }
    if !cli.logos.is_empty() {
        let sources = cli.logos.iter().cloned().map(AssetSource::File).collect();
        tickets.extend(loader.request_logos(sources));
    }

    tracing::info!("Waiting for {} asset(s)", tickets.len());
    let mut applied = 0_usize;
    for remaining in (1..=tickets.len()).rev() {
        let outcome = match tokio::time::timeout(INGEST_TIMEOUT, completions.recv()).await {
            Ok(outcome) => outcome.context("asset pipeline closed early")?,
            Err(_) => {
                tracing::warn!("Timed out with {remaining} asset(s) outstanding");
                break;
            }
        };
        match apply_outcome(&mut session, &loader, outcome) {
            Ok(true) => applied += 1,
            Ok(false) => {}
            Err(error) => tracing::warn!("Skipping asset: {error}"),
        }
    }
    tracing::info!("Composed {applied} ingested asset(s)");

    // Text lines stack downward from the default position.
    for (line, content) in cli.texts.iter().enumerate() {
        let mut text = config.default_text_element();
        text.content.clone_from(content);
        #[allow(clippy::cast_precision_loss)]
        let line_offset = line as f32 * TEXT_LINE_STEP;
        text.position.y += line_offset;
        tracing::debug!("Placing text line at y={}", text.position.y);
        session.add_text(text);
    }

    let bundle = compositor.export_png(session.scene())?;
    let out_path = cli
        .out
        .unwrap_or_else(|| PathBuf::from(&bundle.suggested_filename));
    tokio::fs::write(&out_path, &bundle.bytes)
        .await
        .with_context(|| format!("writing {}", out_path.display()))?;

    tracing::info!(
        "Poster exported to {} ({}x{})",
        out_path.display(),
        bundle.width,
        bundle.height
    );
    Ok(())
}
