// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use std::env;
use std::sync::Arc;
use tokio::signal;
use woodscan_node::{
    api::{self, AppState},
    config::NodeConfig,
    detector::{self, WoodDetector, YoloParams, YoloWoodModel},
    storage::UploadStore,
    suggestions::SuggestionTable,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting WoodScan Node...\n");
    println!("📦 BUILD VERSION: {}", woodscan_node::version::VERSION);
    println!("📅 Build Date: {}", woodscan_node::version::BUILD_DATE);
    println!();

    let config = NodeConfig::from_env();

    // Prepare the upload staging directory
    let uploads = UploadStore::new(&config.upload_dir).await?;
    println!("📂 Upload directory: {}", uploads.dir().display());

    // Resolve the class list: explicit file wins, built-in species otherwise
    let class_names = match &config.class_list_path {
        Some(path) => detector::load_class_names(path.as_ref())?,
        None => detector::default_class_names(),
    };

    println!("🌲 Loading wood detection model...");
    let params = YoloParams {
        confidence_threshold: config.confidence_threshold,
        iou_threshold: config.iou_threshold,
        ..YoloParams::default()
    };
    let detector = YoloWoodModel::load(&config.model_path, class_names, params)?;
    println!(
        "✅ Detection model '{}' loaded (confidence {}, IoU {})",
        detector.model_name(),
        detector.params().confidence_threshold,
        detector.params().iou_threshold
    );

    let state = AppState::new(
        Arc::new(detector),
        Arc::new(uploads),
        Arc::new(SuggestionTable::new()),
    );

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("WoodScan Node ready");
    println!("{}", separator);
    println!("Listen address: {}", config.listen_addr());
    println!("CORS mode:      {:?}", config.cors_mode);
    println!("\nAPI Endpoints:");
    println!("  Health:       http://localhost:{}/health", config.api_port);
    println!(
        "  Predict:      POST http://localhost:{}/predict",
        config.api_port
    );
    println!("\nTest with curl:");
    println!(
        "  curl -X POST http://localhost:{}/predict \\",
        config.api_port
    );
    println!("    -F 'image=@sample.jpg'");
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    tokio::select! {
        result = api::start_server(&config, state) => result?,
        _ = signal::ctrl_c() => {
            println!("\n⏹️  Shutting down...");
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}
