use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use tempfile::TempDir;

use crate::error::{IngestError, Result};

/// Default name prefix of scratch directories.
pub const DEFAULT_PREFIX: &str = "appstream-glib-";

/// A private temporary directory that extracted members are written into.
///
/// Dropping the value unlinks every tracked path and then removes the
/// directory itself, whatever else is left in it.  Failures along the way are
/// logged and otherwise ignored.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    tracked: Vec<PathBuf>,
}

impl ScratchDir {
    /// Creates `<root>/<prefix>XXXXXX` with six random characters.
    pub fn create_in(root: &Path, prefix: &str) -> Result<ScratchDir> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .rand_bytes(6)
            .tempdir_in(root)
            .map_err(|e| IngestError::io("failed to create temp dir", e))?;
        debug!("created scratch directory {}", dir.path().display());
        Ok(ScratchDir { dir: Some(dir), tracked: Vec::new() })
    }

    /// Returns the directory's absolute path.
    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => unreachable!("scratch directory used after cleanup"),
        }
    }

    /// Records a path, relative to the directory, that was written into it.
    pub fn track(&mut self, relative: impl Into<PathBuf>) {
        self.tracked.push(relative.into());
    }

    /// Paths recorded with [`track`](Self::track), in order.
    pub fn tracked(&self) -> &[PathBuf] {
        &self.tracked
    }

    /// Removes tracked files and the directory now.
    pub fn close(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let dir = match self.dir.take() {
            Some(dir) => dir,
            None => return,
        };
        for relative in self.tracked.drain(..) {
            let path = dir.path().join(&relative);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to unlink {}: {}", path.display(), e),
            }
        }
        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            warn!("failed to remove {}: {}", path.display(), e);
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}
