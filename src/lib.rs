//! GTFS-realtime validator launcher.
//!
//! Parses the command line and either hands archived feed files to the batch
//! engine or starts the web server (static UI, `/getFeed`, REST API).

pub mod api;
pub mod batch;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mode;
pub mod resources;
pub mod server;
pub mod storage;

pub use batch::{ArchiveBatch, BatchEngine};
pub use cli::RunConfiguration;
pub use error::{Result, ValidatorError};
pub use mode::{launch, Outcome, RunMode, ServerLauncher};
pub use resources::ResourcePaths;
pub use server::{HttpServerLauncher, ServerBootstrap, ServerHandle};
