use std::path::Path;

use log::debug;

use crate::appstream::{guess_source_kind, App, SizeKind, SourceKind};
use crate::error::{IngestError, Result};
use crate::extract::member_relative_path;

/// File name assumed for releases whose metadata does not name one.
pub const LEGACY_FIRMWARE_FILENAME: &str = "firmware.bin";

/// Parses every metainfo document among the extracted `members`.
///
/// The default release of each component is normalized: a missing firmware
/// file name becomes [`LEGACY_FIRMWARE_FILENAME`], and when `archive_size` is
/// known an unset download size is taken from it.
pub fn scan_metainfo(
    dir: &Path,
    members: &[String],
    archive_size: u64,
) -> Result<Vec<App>> {
    let mut apps = Vec::new();
    for (index, name) in members.iter().enumerate() {
        debug!("found file {}\t{}", index, name);
        match guess_source_kind(name) {
            SourceKind::Metainfo => {
                let relative = member_relative_path(name)
                    .map_err(|e| IngestError::CabFormat(e.to_string()))?;
                let path = dir.join(relative);
                let mut app = App::parse_file(&path).map_err(|e| {
                    IngestError::MetainfoParse {
                        path: path.clone(),
                        message: e.to_string(),
                    }
                })?;

                let release = app
                    .default_release_mut()
                    .ok_or_else(|| IngestError::NoRelease { path: path.clone() })?;
                if release.filename().is_none() {
                    release.set_filename(LEGACY_FIRMWARE_FILENAME);
                }
                if archive_size > 0 && release.size(SizeKind::Download) == 0 {
                    release.set_size(SizeKind::Download, archive_size);
                }
                apps.push(app);
            }
            // TODO: driver descriptors could yield components of their own.
            SourceKind::Inf => debug!("ignoring driver descriptor {}", name),
            SourceKind::Unknown => {}
        }
    }
    Ok(apps)
}
