use anyhow::Result;
use tracing::{error, info};

use geofence_console::cli::{self, Command};
use geofence_console::config::Config;
use geofence_console::logging::init_logging;
use geofence_console::runner::Runner;
use persistence::HttpGeofenceStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let command = cli::parse_args(&args)?;
    if command == Command::Help {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    init_logging(&config.logging);

    info!("Starting geofence console v{}", env!("CARGO_PKG_VERSION"));
    if command.needs_backend() {
        info!(base_url = %config.backend.base_url, "Using geofence backend");
    }

    let store = HttpGeofenceStore::new(config.backend.settings())?;
    let runner = Runner::new(store, config.editor.settings());

    match runner.run(command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            for detail in e.details() {
                eprintln!("  {}", detail);
            }
            error!(error = %e, "Command failed");
            Err(e.into())
        }
    }
}
