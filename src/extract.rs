use std::{
    fs::{self, File},
    io::{self, Read, Seek},
    path::{Component, Path, PathBuf},
};

use crate::cabinet::Cabinet;
use crate::error::{IngestError, Result};

/// Loads a cabinet and extracts its members into a directory.
pub struct CabExtractor<R> {
    cabinet: Cabinet<R>,
}

impl<R: Read + Seek> CabExtractor<R> {
    /// Parses the cabinet headers from a seekable reader.
    pub fn load(reader: R) -> Result<CabExtractor<R>> {
        let cabinet = Cabinet::new(reader).map_err(|e| {
            IngestError::CabFormat(format!("cannot load .cab file: {}", e))
        })?;
        Ok(CabExtractor { cabinet })
    }

    /// Member names in header order.
    pub fn member_names(&self) -> Vec<String> {
        self.cabinet
            .file_entries()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    /// Writes every member to `<dir>/<member path>` and returns the member
    /// names in extraction order.
    ///
    /// `on_member` is told each member's name and its path relative to
    /// `dir` just before the file is created.
    pub fn extract_to<F>(&mut self, dir: &Path, mut on_member: F) -> Result<Vec<String>>
    where
        F: FnMut(&str, &Path),
    {
        let mut names = Vec::new();
        self.cabinet
            .for_each_file(|entry, data| {
                let relative = member_relative_path(entry.name())?;
                on_member(entry.name(), &relative);
                let path = dir.join(&relative);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut file = File::create(&path)?;
                io::copy(data, &mut file)?;
                names.push(entry.name().to_string());
                Ok(())
            })
            .map_err(|e| {
                IngestError::CabFormat(format!("failed to extract .cab file: {}", e))
            })?;
        Ok(names)
    }
}

/// Maps a member name onto a relative filesystem path.
///
/// Both `\` and `/` separate components.  Names that would escape the
/// extraction directory are rejected.
pub(crate) fn member_relative_path(name: &str) -> io::Result<PathBuf> {
    let mut relative = PathBuf::new();
    for part in name.split(|c| c == '\\' || c == '/') {
        if part.is_empty() || part == "." {
            continue;
        }
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(normal)), None) => relative.push(normal),
            _ => invalid_data!("unsafe member name {:?}", name),
        }
    }
    if relative.as_os_str().is_empty() {
        invalid_data!("empty member name {:?}", name);
    }
    Ok(relative)
}
