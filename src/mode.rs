use async_trait::async_trait;
use tracing::info;

use crate::batch::BatchEngine;
use crate::cli::RunConfiguration;
use crate::error::Result;

/// Starts the interactive server and blocks until it stops.
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    async fn serve(&self, config: RunConfiguration) -> Result<()>;
}

/// The two mutually exclusive ways a process can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Full process argument vector, forwarded as-is.
    Batch(Vec<String>),
    Server(RunConfiguration),
}

impl RunMode {
    pub fn decide(args: &[String]) -> Result<Self> {
        let config = RunConfiguration::from_args(args)?;
        if config.is_batch() {
            Ok(RunMode::Batch(args.to_vec()))
        } else {
            Ok(RunMode::Server(config))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Batch,
    Server,
}

/// Decides the run mode once and hands off to exactly one collaborator.
pub async fn launch(
    args: &[String],
    batch: &dyn BatchEngine,
    server: &dyn ServerLauncher,
) -> Result<Outcome> {
    match RunMode::decide(args)? {
        RunMode::Batch(args) => {
            info!("Running in batch mode");
            batch.run(&args)?;
            Ok(Outcome::Batch)
        }
        RunMode::Server(config) => {
            info!("Running in server mode on port {}", config.port);
            server.serve(config).await?;
            Ok(Outcome::Server)
        }
    }
}
