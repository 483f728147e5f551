//! Batch mode: process archived GTFS-realtime files without starting the server.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cli::RunConfiguration;
use crate::error::{Result, ValidatorError};

/// Entry point for batch processing. Receives the full, untouched argument
/// vector of the process.
pub trait BatchEngine: Send + Sync {
    fn run(&self, args: &[String]) -> Result<()>;
}

/// What a batch run went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: Vec<PathBuf>,
    pub total_bytes: u64,
}

/// Walks the archive named by `-batch`: a directory of captured feed
/// snapshots or a single archive file.
#[derive(Debug, Default)]
pub struct ArchiveBatch;

impl ArchiveBatch {
    pub fn new() -> Self {
        Self
    }

    /// Lists the archive entries in name order (snapshot file names carry
    /// their capture time, so this is chronological).
    pub fn process(&self, target: &Path) -> Result<BatchSummary> {
        if !target.exists() {
            return Err(ValidatorError::BatchTarget(target.display().to_string()));
        }

        let mut files = if target.is_dir() {
            let entries = std::fs::read_dir(target)
                .map_err(|e| ValidatorError::BatchTarget(format!("{}: {}", target.display(), e)))?;
            entries
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry.path()),
                    Err(e) => {
                        warn!("Skipping unreadable entry in {}: {}", target.display(), e);
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect::<Vec<_>>()
        } else {
            vec![target.to_path_buf()]
        };
        files.sort();

        let mut summary = BatchSummary::default();
        for file in files {
            let size = entry_size(&file);
            debug!("Archive entry {} ({} bytes)", file.display(), size);
            summary.total_bytes += size;
            summary.files.push(file);
        }
        Ok(summary)
    }
}

/// Size of an archive entry. Unreadable metadata counts as 0 bytes.
fn entry_size(path: &Path) -> u64 {
    match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!("Cannot read size of {}: {}", path.display(), e);
            0
        }
    }
}

impl BatchEngine for ArchiveBatch {
    fn run(&self, args: &[String]) -> Result<()> {
        let config = RunConfiguration::from_args(args)?;
        let target = config
            .batch_target
            .ok_or_else(|| ValidatorError::BatchTarget("no -batch argument".to_string()))?;

        info!("Batch mode: processing archived files in {}", target);
        let summary = self.process(Path::new(&target))?;
        info!(
            "Batch run finished: {} file(s), {} bytes",
            summary.files.len(),
            summary.total_bytes
        );
        Ok(())
    }
}
