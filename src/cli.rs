use clap::Parser;
use tracing::debug;

use crate::error::{Result, ValidatorError};

pub const DEFAULT_PORT: u16 = 8080;

const PORT_OPTION: &str = "port";
const BATCH_OPTION: &str = "batch";

#[derive(Parser, Debug)]
#[command(name = "gtfs-rt-validator")]
#[command(about = "GTFS-realtime validator: web UI and REST API, or batch mode on archived files", long_about = None)]
#[command(version)]
struct CliArgs {
    /// Port number the server should run on
    #[arg(long = "port", value_name = "PORT", allow_hyphen_values = true)]
    port: Option<String>,

    /// If the validator should run in batch mode on archived files
    #[arg(long = "batch", value_name = "PATH", allow_hyphen_values = true)]
    batch: Option<String>,

    /// Stray positional arguments are accepted and ignored
    #[arg(hide = true)]
    rest: Vec<String>,
}

/// What a single process invocation will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub port: u16,
    pub batch_target: Option<String>,
}

impl RunConfiguration {
    /// Parses the process arguments (without the program name).
    ///
    /// With `-batch` present the port is never consulted, so a malformed
    /// `-port` value does not prevent a batch run.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let cli = parse(args)?;
        if !cli.rest.is_empty() {
            debug!("Ignoring positional arguments {:?}", cli.rest);
        }
        let port = match (&cli.port, &cli.batch) {
            (Some(value), None) => parse_port_value(value)?,
            (Some(value), Some(_)) => parse_port_value(value).unwrap_or(DEFAULT_PORT),
            (None, _) => DEFAULT_PORT,
        };
        Ok(Self {
            port,
            batch_target: cli.batch,
        })
    }

    pub fn is_batch(&self) -> bool {
        self.batch_target.is_some()
    }
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            batch_target: None,
        }
    }
}

/// Port from `-port`, or 8080 when absent.
pub fn parse_port(args: &[String]) -> Result<u16> {
    match parse(args)?.port {
        Some(value) => parse_port_value(&value),
        None => Ok(DEFAULT_PORT),
    }
}

/// True iff `-batch` is present. Its value is left to the batch engine.
pub fn parse_batch_flag(args: &[String]) -> Result<bool> {
    Ok(parse(args)?.batch.is_some())
}

fn parse_port_value(value: &str) -> Result<u16> {
    value.parse::<u16>().map_err(|_| ValidatorError::InvalidArgument {
        option: PORT_OPTION,
        value: value.to_string(),
    })
}

fn parse(args: &[String]) -> Result<CliArgs> {
    let argv = std::iter::once("gtfs-rt-validator".to_string()).chain(normalize(args));
    Ok(CliArgs::try_parse_from(argv)?)
}

/// Rewrites the single-dash long options (`-port 9090`, `-batch=dir`) into
/// the `--port` form clap understands. Other tokens pass through untouched.
fn normalize(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let Some(rest) = arg.strip_prefix('-') else {
                return arg.clone();
            };
            if rest.starts_with('-') {
                return arg.clone();
            }
            let name = rest.split('=').next().unwrap_or(rest);
            if name == PORT_OPTION || name == BATCH_OPTION {
                format!("-{}", arg)
            } else {
                arg.clone()
            }
        })
        .collect()
}
