use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop the validator before or while it serves.
///
/// Argument and resource errors are raised before the listener exists, so a
/// failed startup never leaves a half-initialized server behind.
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("invalid command line: {0}")]
    ArgumentParse(#[from] clap::Error),

    #[error("invalid value '{value}' for -{option}")]
    InvalidArgument { option: &'static str, value: String },

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("port {0} is already in use")]
    PortInUse(u16),

    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("storage initialization failed: {0:#}")]
    Storage(anyhow::Error),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("batch target not found: {0}")]
    BatchTarget(String),
}

pub type Result<T> = std::result::Result<T, ValidatorError>;

impl ValidatorError {
    /// Maps a listener bind failure onto the taxonomy.
    pub fn from_bind(port: u16, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::AddrInUse {
            ValidatorError::PortInUse(port)
        } else {
            ValidatorError::Bind { port, source }
        }
    }
}
