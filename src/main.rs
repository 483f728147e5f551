use gtfs_rt_validator::{launch, logging, ArchiveBatch, HttpServerLauncher, ValidatorError};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let batch = ArchiveBatch::new();
    let server = HttpServerLauncher;

    match launch(&args, &batch, &server).await {
        Ok(outcome) => info!("Validator finished ({:?} mode)", outcome),
        // Usage errors, --help and --version are printed by clap with its own exit code.
        Err(ValidatorError::ArgumentParse(e)) => e.exit(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
