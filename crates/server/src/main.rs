use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use faceverify_core::models::model_registry::ModelRegistry;
use faceverify_core::pipeline::verify_photo_use_case::VerifyPhotoUseCase;
use faceverify_core::upload::infrastructure::image_crate_decoder::ImageCrateDecoder;
use faceverify_server::config::ServerConfig;
use faceverify_server::routes::{create_router, AppState};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();
    config.validate()?;

    let paths = config.model_paths()?;
    let registry = Arc::new(ModelRegistry::load(&paths, &config.session_settings())?);
    let use_case = VerifyPhotoUseCase::new(registry, Arc::new(ImageCrateDecoder::new()));
    let state = Arc::new(AppState {
        use_case: Arc::new(use_case),
    });

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(&config, state))
}

async fn serve(config: &ServerConfig, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(config.bind).await?;
    log::info!(
        "faceverify v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        listener.local_addr()?
    );

    axum::serve(listener, create_router(state, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested, draining in-flight requests");
}
