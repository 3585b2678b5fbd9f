//! wadwise main entry point

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use wadwise_api::{start_server, AppState};
use wadwise_config::Config;
use wadwise_core::AppData;

#[derive(Parser, Debug)]
#[command(name = "wadwise")]
#[command(version = "0.1.0")]
#[command(about = "Transaction entry, account picker and import reconciliation for wadwise", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = if args.config.exists() {
        Config::load(args.config.clone())
            .with_context(|| format!("failed to load configuration from {}", args.config.display()))?
    } else {
        Config::default()
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();
    if !args.config.exists() {
        warn!("Config file {} not found, using defaults", args.config.display());
    }
    info!("Config loaded: bootstrap={}, backend={}", config.data.bootstrap.display(), config.backend.base_url);

    let data = match AppData::load_configured(&config) {
        Ok(data) => data,
        Err(e) => {
            warn!("Starting without bootstrap data: {}", e);
            AppData {
                cur_list: config.currency.default_list.clone(),
                ..AppData::default()
            }
        }
    };

    start_server(AppState::new(config, data)).await
}
