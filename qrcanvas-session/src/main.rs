//! # qrcanvas
//!
//! Renders one payload to a styled QR image file.

use anyhow::{bail, Context};
use clap::Parser;
use qrcanvas_renderer::GraphicExporter;
use qrcanvas_session::{Cli, LogoStatus, RenderSession, RenderStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,qrcanvas_session=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,qrcanvas_session=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid render config")?;
    let Some(format) = cli.output_format() else {
        bail!(
            "cannot infer output format from {}; pass --format",
            cli.output.display()
        );
    };
    tracing::info!(
        style = %config.style,
        size = config.target_pixel_size,
        level = %config.error_correction,
        format = format.extension(),
        "Rendering"
    );

    let mut session = RenderSession::with_default_encoder(config)?;
    session.set_payload(&cli.payload)?;

    let state = session.wait_ready().await;
    if let RenderStatus::Error(err) = state.status {
        bail!("payload cannot be encoded: {err}");
    }
    if let LogoStatus::Failed(reason) = session.wait_logo_settled().await {
        tracing::warn!(%reason, "Continuing without logo");
    }

    let graphic = session
        .draw()?
        .context("no symbol available after encoding")?;
    let bytes = GraphicExporter::new(cli.export_config())
        .export(&graphic, format)
        .context("export failed")?;
    std::fs::write(&cli.output, &bytes)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;

    tracing::info!(
        path = %cli.output.display(),
        bytes = bytes.len(),
        modules = graphic.matrix_size,
        "Wrote symbol"
    );
    session.close();
    Ok(())
}
