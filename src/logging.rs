use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::app_dirs::AppDirs;

/// Send `log` output to a file; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` level. Does nothing when no state
/// directory can be resolved, or when a logger is already installed.
pub fn init() -> io::Result<()> {
    match AppDirs::log_path() {
        Some(path) => init_with_path(&path),
        None => Ok(()),
    }
}

pub fn init_with_path(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("reflectis.log");

        init_with_path(&path).unwrap();
        assert!(path.exists());

        // a second init keeps the first logger and still succeeds
        init_with_path(&path).unwrap();
    }
}
