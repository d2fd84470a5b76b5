use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use capture_detect::adapters::{
    capture::load_rgb,
    fs::label_file::FileClassTableSource,
    http::{router, state::HttpState},
    onnx::{engine::OnnxDetectorFactory, model_catalog::OnnxModelCatalog},
    overlay::render::{draw_detections, encode_jpeg, BOX_COLOR},
};
use capture_detect::application::services::DetectionService;
use capture_detect::config::{Cli, Command, DetectArgs, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=info unless told otherwise
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let service = Arc::new(DetectionService::new(
        Arc::new(OnnxDetectorFactory::new()),
        Arc::new(OnnxModelCatalog::new()),
        Arc::new(FileClassTableSource::new()),
    ));

    match cli.command {
        Command::Serve(args) => serve(service, args).await,
        Command::Detect(args) => detect_once(service, args).await,
    }
}

async fn serve(service: Arc<DetectionService>, args: ServeArgs) -> anyhow::Result<()> {
    if args.lazy {
        tracing::info!("Starting without a model, waiting for POST /api/config");
    } else {
        service
            .configure(args.detector.to_config())
            .await
            .context("loading detector")?;
    }

    let state = HttpState { detection: service };
    let app = router(state).fallback_service(ServeDir::new(&args.static_dir));

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("🚀 Detection server listening on http://{}", addr);
    tracing::info!("📂 Static files served from {}", args.static_dir.display());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn detect_once(service: Arc<DetectionService>, args: DetectArgs) -> anyhow::Result<()> {
    service
        .configure(args.detector.to_config())
        .await
        .context("loading detector")?;

    let path = args.image.clone();
    let image = tokio::task::spawn_blocking(move || load_rgb(&path)).await??;
    let mut canvas = args.overlay.as_ref().map(|_| image.clone());

    let report = service.detect(image, None).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for d in &report.detections {
            println!(
                "{:<16} {:>5.3}  x={:.1} y={:.1} w={:.1} h={:.1}",
                d.label, d.confidence, d.x, d.y, d.width, d.height
            );
        }
    }

    if let (Some(out), Some(canvas)) = (args.overlay, canvas.as_mut()) {
        draw_detections(canvas, &report.detections, BOX_COLOR, 2);
        let jpeg = encode_jpeg(canvas)?;
        tokio::fs::write(&out, jpeg)
            .await
            .with_context(|| format!("writing overlay {}", out.display()))?;
        tracing::info!("Overlay written to {}", out.display());
    }
    Ok(())
}
