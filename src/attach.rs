use std::{fs, path::Path};

use log::debug;

use crate::appstream::{App, Release, SizeKind};
use crate::error::{IngestError, Result};

/// Suffix of detached signature files.
pub const SIGNATURE_SUFFIX: &str = ".asc";

/// Attaches firmware and signature blobs to every release of every app.
pub fn attach_blobs(apps: &mut [App], dir: &Path) -> Result<()> {
    for app in apps.iter_mut() {
        for release in app.releases_mut() {
            attach_release_blobs(release, dir)?;
        }
    }
    Ok(())
}

/// Looks up the release's firmware file, and its `.asc` signature, directly
/// under `dir` and attaches whichever exist.
///
/// A firmware file that is absent is not an error.  When it is present and
/// the installed size is unset, the file length becomes the installed size.
pub fn attach_release_blobs(release: &mut Release, dir: &Path) -> Result<()> {
    let basename = match release.filename().map(basename) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            debug!("release {:?} names no firmware file", release.version());
            return Ok(());
        }
    };

    if let Some(data) = read_if_exists(&dir.join(&basename))? {
        if release.size(SizeKind::Installed) == 0 {
            release.set_size(SizeKind::Installed, data.len() as u64);
        }
        debug!("attaching {} ({} bytes)", basename, data.len());
        release.set_blob(basename.clone(), data);
    }

    let signature = format!("{}{}", basename, SIGNATURE_SUFFIX);
    if let Some(data) = read_if_exists(&dir.join(&signature))? {
        debug!("attaching {} ({} bytes)", signature, data.len());
        release.set_blob(signature, data);
    }
    Ok(())
}

fn basename(filename: &str) -> &str {
    filename.rsplit(|c| c == '\\' || c == '/').next().unwrap_or(filename)
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read(path)
        .map(Some)
        .map_err(|e| IngestError::io(format!("failed to open {}", path.display()), e))
}
