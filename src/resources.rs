//! Locating the directories the server reads from and writes to.
//!
//! Two content roots are involved: the bundled `webroot` that ships next to
//! the executable (read-only UI assets) and `<install-dir>/classes/webroot`,
//! where generated validation output is written and served from.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, ValidatorError};

/// Name of the resource directory packaged with the executable.
pub const BUNDLED_ROOT_NAME: &str = "webroot";

/// Overrides the bundled root lookup (custom packaging, debugging).
pub const WEBROOT_ENV: &str = "GTFSRT_VALIDATOR_WEBROOT";

/// Resolved content roots, produced once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    pub install_dir: PathBuf,
    pub bundled_root: PathBuf,
    pub output_root: PathBuf,
}

impl ResourcePaths {
    /// Resolves both roots relative to the running executable.
    pub fn resolve() -> Result<Self> {
        let install_dir = locate_install_directory()?;
        let override_dir = std::env::var_os(WEBROOT_ENV).map(PathBuf::from);
        Self::for_install_dir(install_dir, override_dir)
    }

    /// Roots for an explicit install directory and optional bundled-root
    /// override.
    pub fn for_install_dir(install_dir: PathBuf, override_dir: Option<PathBuf>) -> Result<Self> {
        let bundled_root = find_bundled_root(override_dir, &install_dir)?;
        let output_root = output_root_for(&install_dir);
        debug!(
            "Resolved resource paths: bundled={:?} output={:?}",
            bundled_root, output_root
        );
        Ok(Self {
            install_dir,
            bundled_root,
            output_root,
        })
    }
}

/// Directory containing the running executable.
pub fn locate_install_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        ValidatorError::ResourceNotFound(format!("cannot resolve executable path: {}", e))
    })?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        ValidatorError::ResourceNotFound(format!(
            "executable {} has no parent directory",
            exe.display()
        ))
    })
}

/// Bundled root for the running executable.
pub fn locate_bundled_root() -> Result<PathBuf> {
    let install_dir = locate_install_directory()?;
    let override_dir = std::env::var_os(WEBROOT_ENV).map(PathBuf::from);
    find_bundled_root(override_dir, &install_dir)
}

/// Writable output directory for a given install directory.
pub fn output_root_for(install_dir: &Path) -> PathBuf {
    install_dir.join("classes").join(BUNDLED_ROOT_NAME)
}

fn bundled_root_candidates(override_dir: Option<PathBuf>, install_dir: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = override_dir {
        candidates.push(dir);
    }

    // Shipped next to the binary.
    candidates.push(install_dir.join(BUNDLED_ROOT_NAME));
    // Packaged installs: <prefix>/bin/<exe> and <prefix>/share/gtfs-rt-validator/webroot.
    candidates.push(
        install_dir
            .join("../share/gtfs-rt-validator")
            .join(BUNDLED_ROOT_NAME),
    );
    // Local dev builds.
    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(BUNDLED_ROOT_NAME));

    candidates
}

/// First existing bundled root candidate, explicit override first.
pub fn find_bundled_root(override_dir: Option<PathBuf>, install_dir: &Path) -> Result<PathBuf> {
    let candidates = bundled_root_candidates(override_dir, install_dir);
    candidates
        .iter()
        .find(|p| p.is_dir())
        .cloned()
        .ok_or_else(|| {
            ValidatorError::ResourceNotFound(format!(
                "no '{}' directory found (searched {:?})",
                BUNDLED_ROOT_NAME, candidates
            ))
        })
}

/// Creates the output root and its parents. An existing directory is fine.
pub fn ensure_output_root(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| ValidatorError::OutputRoot {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads `reader` to the end, line by line, joining lines WITHOUT separators.
///
/// `\n`, `\r\n` and a bare `\r` all end a line. Bytes that are not valid
/// UTF-8 are replaced with U+FFFD. Never fails: a read error is logged and
/// whatever was read before it is returned. Line breaks are lost, so callers
/// must only feed it content where that does not matter (JSON documents,
/// diagnostics).
pub fn read_all_as_string<R: Read>(reader: R) -> String {
    let mut reader = BufReader::new(reader);
    let mut out = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                buf.retain(|b| *b != b'\n' && *b != b'\r');
                out.push_str(&String::from_utf8_lossy(&buf));
            }
            Err(e) => {
                warn!(
                    "Partial read after {} bytes, returning what was read: {}",
                    out.len(),
                    e
                );
                break;
            }
        }
    }
    out
}

/// [`read_all_as_string`] over a file. An unopenable file yields "".
pub fn read_file_as_string(path: &Path) -> String {
    match std::fs::File::open(path) {
        Ok(file) => read_all_as_string(file),
        Err(e) => {
            warn!("Failed to open {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    /// Yields its data once, then fails.
    struct FailingReader {
        data: Option<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                None => Err(io::Error::new(io::ErrorKind::Other, "connection reset")),
            }
        }
    }

    #[test]
    fn test_read_all_joins_lines_without_separators() {
        let input = "first\nsecond\r\nthird";
        assert_eq!(read_all_as_string(input.as_bytes()), "firstsecondthird");
    }

    #[test]
    fn test_read_all_empty_input() {
        assert_eq!(read_all_as_string(io::empty()), "");
    }

    #[test]
    fn test_read_all_returns_partial_data_on_error() {
        let reader = FailingReader {
            data: Some(b"{\"a\":\n1}\n".to_vec()),
        };
        assert_eq!(read_all_as_string(reader), "{\"a\":1}");
    }

    #[test]
    fn test_read_all_replaces_invalid_utf8_and_keeps_reading() {
        let input: &[u8] = b"ok\n\xff\xfe\nlater\n";
        assert_eq!(read_all_as_string(input), "ok\u{FFFD}\u{FFFD}later");

        let latin1: &[u8] = b"{\"stop\":\"Caf\xe9\"}\n{\"next\":1}\n";
        assert_eq!(
            read_all_as_string(latin1),
            "{\"stop\":\"Caf\u{FFFD}\"}{\"next\":1}"
        );
    }

    #[test]
    fn test_read_all_treats_bare_carriage_return_as_line_end() {
        assert_eq!(read_all_as_string(&b"a\rb\n"[..]), "ab");
        assert_eq!(read_all_as_string(&b"a\r\n\rb"[..]), "ab");
    }

    #[test]
    fn test_read_file_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_file_as_string(&dir.path().join("nope.json")), "");
    }

    #[test]
    fn test_output_root_layout() {
        let root = output_root_for(Path::new("/opt/validator/bin"));
        assert_eq!(root, PathBuf::from("/opt/validator/bin/classes/webroot"));
    }

    #[test]
    fn test_ensure_output_root_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let out = output_root_for(dir.path());

        ensure_output_root(&out).unwrap();
        assert!(out.is_dir());
        ensure_output_root(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_ensure_output_root_fails_on_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("classes");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = ensure_output_root(&blocker.join("webroot")).unwrap_err();
        assert!(matches!(err, ValidatorError::OutputRoot { .. }));
    }

    #[test]
    fn test_find_bundled_root_prefers_override() {
        let install = TempDir::new().unwrap();
        std::fs::create_dir_all(install.path().join(BUNDLED_ROOT_NAME)).unwrap();
        let custom = TempDir::new().unwrap();

        let found = find_bundled_root(Some(custom.path().to_path_buf()), install.path()).unwrap();
        assert_eq!(found, custom.path());
    }

    #[test]
    fn test_find_bundled_root_next_to_executable() {
        let install = TempDir::new().unwrap();
        let webroot = install.path().join(BUNDLED_ROOT_NAME);
        std::fs::create_dir_all(&webroot).unwrap();

        let missing_override = install.path().join("does-not-exist");
        let found = find_bundled_root(Some(missing_override), install.path()).unwrap();
        assert_eq!(found, webroot);
    }

    #[test]
    fn test_find_bundled_root_falls_back_to_crate_webroot() {
        let install = TempDir::new().unwrap();
        let found = find_bundled_root(None, install.path()).unwrap();
        assert_eq!(
            found,
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(BUNDLED_ROOT_NAME)
        );
    }

    #[test]
    fn test_install_directory_is_executable_parent() {
        let exe = std::env::current_exe().unwrap();
        assert_eq!(locate_install_directory().unwrap(), exe.parent().unwrap());
    }

    #[test]
    fn test_resolve_derives_output_root_from_install_dir() {
        let paths = ResourcePaths::resolve().unwrap();
        assert_eq!(paths.install_dir, locate_install_directory().unwrap());
        assert_eq!(paths.output_root, output_root_for(&paths.install_dir));
        assert!(paths.bundled_root.is_dir());
        assert_eq!(paths.bundled_root, locate_bundled_root().unwrap());
    }

    #[test]
    fn test_for_install_dir_uses_explicit_roots() {
        let install = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();

        let paths = ResourcePaths::for_install_dir(
            install.path().to_path_buf(),
            Some(custom.path().to_path_buf()),
        )
        .unwrap();

        assert_eq!(paths.install_dir, install.path());
        assert_eq!(paths.bundled_root, custom.path());
        assert_eq!(paths.output_root, install.path().join("classes").join("webroot"));
        assert!(!paths.output_root.exists());
    }
}
