use std::path::PathBuf;
use std::sync::Arc;

use burn_tch::{LibTorch, LibTorchDevice};
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use crate::infer::{Classifier, ModelLoader};
use crate::server::{AppState, Readiness};

mod data;
mod error;
mod i18n;
mod infer;
mod label;
mod model;
mod render;
mod server;

/// Leaf photo upload form backed by a pretrained PlantVillage classifier
#[derive(Parser, Debug)]
#[command(name = "plant-disease-detection", version, about)]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8501")]
    port: u16,

    /// Model artifact, without the .mpk extension
    #[arg(long, env = "PLANT_MODEL_PATH", default_value = "models/2")]
    model: PathBuf,

    /// Folder whose sub-folders name the classes, in training order
    #[arg(long, env = "PLANT_DATA_DIR", default_value = "training/PlantVillage")]
    data_dir: PathBuf,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value = "200")]
    max_upload_mb: usize,

    /// Run inference on the CPU even if CUDA is available
    #[arg(long)]
    cpu: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;

    info!("Checking CUDA configuration...");
    let device = if !cli.cpu && tch::utils::has_cuda() {
        LibTorchDevice::Cuda(0)
    } else {
        LibTorchDevice::Cpu
    };
    info!("Using device {:?}", device);
    info!("Model path:  {:?}", cli.model);
    info!("Data folder: {:?}", cli.data_dir);

    let loader = ModelLoader::<LibTorch>::new(&cli.model, device);
    let model = loader.load().map(|model| model as Arc<dyn Classifier>);

    let readiness = Readiness::start(model, &cli.data_dir);
    if let Readiness::Failed(fatal) = &readiness {
        log::warn!("Startup failed ({:?}); every request will show the error page", fatal);
    }

    let state = Arc::new(AppState::new(readiness));
    let app = server::router(state, cli.max_upload_mb * 1024 * 1024);

    let listener = server::listen(&cli.host, cli.port).await?;
    info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
