//! Chargecast - Health Insurance Charge Prediction Service
//!
//! Entry point for the prediction API server and the offline training
//! pipeline that produces its artifacts.

use chargecast::{
    run_training, ApiServer, EncodingStrategy, InferenceService, ServiceConfig,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chargecast")]
#[command(about = "Health insurance charge prediction service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction API
    Serve {
        /// Bind address (overrides CHARGECAST_ADDR)
        #[arg(long)]
        addr: Option<String>,

        /// Directory holding the prediction artifacts (overrides CHARGECAST_MODEL_DIR)
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },

    /// Fit the encoder and model from a CSV dataset and write artifacts
    Train {
        /// Path to the cleaned CSV dataset
        #[arg(long)]
        data: PathBuf,

        /// Directory to write the prediction artifacts into
        #[arg(long)]
        model_dir: PathBuf,

        /// Encoding strategy for the region column (ordinal or onehot)
        #[arg(long, default_value = "ordinal")]
        encoding: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::new(format!(
        "chargecast={}",
        level.as_str().to_lowercase()
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Chargecast v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { addr, model_dir } => {
            let mut config = ServiceConfig::from_env();
            if let Some(addr) = addr {
                config.addr = addr
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;
            }
            if let Some(model_dir) = model_dir {
                config.model_dir = model_dir;
            }

            let service = Arc::new(InferenceService::load(&config));
            ApiServer::new(config.addr, service).serve().await
        }
        Commands::Train {
            data,
            model_dir,
            encoding,
        } => {
            let strategy: EncodingStrategy = encoding.parse()?;
            let report = run_training(&data, &model_dir, strategy)?;

            println!("Trained on {} rows ({} strategy)", report.rows, strategy);
            println!("Feature columns: {}", report.feature_names.join(", "));
            println!(
                "Training-set fit: MAE={:.2} RMSE={:.2} R2={:.4}",
                report.mae, report.rmse, report.r2
            );
            Ok(())
        }
    }
}
