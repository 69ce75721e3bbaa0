use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use backend_bootstrap::logging::init_tracing;
use backend_infrastructure::{AppConfig, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "lootfeed-backend")]
#[command(about = "Loot feed webhook and query server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_PATH_ENV, config);
    }

    let config = AppConfig::load().await?;
    let _guard = init_tracing(config.log_dir.as_deref());

    let path = AppConfig::config_path();
    if Path::new(&path).exists() {
        info!("loaded config from {}", path);
    } else {
        warn!("{} not found, using defaults", path);
    }

    backend_bootstrap::run_standalone(config).await
}
