use std::{
    env,
    fs::{self, File},
    io::{BufReader, Read, Seek},
    path::{Path, PathBuf},
};

use log::debug;

use crate::appstream::AppStore;
use crate::attach::attach_blobs;
use crate::cancel::{self, Cancellable};
use crate::error::{IngestError, Result};
use crate::extract::CabExtractor;
use crate::scan::scan_metainfo;
use crate::scratch::{ScratchDir, DEFAULT_PREFIX};
use crate::stream::BufferedStream;

/// Options for ingesting cabinets.
///
/// The default creates scratch directories named `appstream-glib-XXXXXX`
/// under the platform temporary directory.
#[derive(Clone, Debug)]
pub struct Ingester {
    temp_root: PathBuf,
    scratch_prefix: String,
}

impl Default for Ingester {
    fn default() -> Self {
        Ingester {
            temp_root: env::temp_dir(),
            scratch_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Ingester {
    /// Same as [`Ingester::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory scratch directories are created in.
    pub fn temp_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_root = path.into();
        self
    }

    /// Sets the name prefix of scratch directories.
    pub fn scratch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.scratch_prefix = prefix.into();
        self
    }

    /// Ingests a cabinet read from a possibly non-seekable input.
    ///
    /// The input is consumed and closed.  The whole stream is buffered in
    /// memory first; its length becomes the download size.
    pub fn ingest_reader<S, R>(
        &self,
        store: &mut S,
        input: R,
        cancel: Option<&Cancellable>,
    ) -> Result<()>
    where
        S: AppStore + ?Sized,
        R: Read,
    {
        let buffered = BufferedStream::read_from(input, cancel)?;
        let size = buffered.size();
        debug!("buffered {} bytes of cabinet input", size);
        self.ingest_stream(store, buffered.into_seekable(), size, cancel)
    }

    /// Ingests a cabinet from an open file descriptor, taking ownership of
    /// it.
    #[cfg(unix)]
    pub fn ingest_fd<S>(
        &self,
        store: &mut S,
        fd: std::os::fd::OwnedFd,
        cancel: Option<&Cancellable>,
    ) -> Result<()>
    where
        S: AppStore + ?Sized,
    {
        self.ingest_reader(store, File::from(fd), cancel)
    }

    /// Ingests a cabinet file.  The store's origin is set to the file's
    /// basename.
    pub fn ingest_file<S>(
        &self,
        store: &mut S,
        path: &Path,
        cancel: Option<&Cancellable>,
    ) -> Result<()>
    where
        S: AppStore + ?Sized,
    {
        cancel::check(cancel)?;
        let metadata = fs::metadata(path).map_err(|e| {
            IngestError::io(format!("Failed to get info for {}", path.display()), e)
        })?;
        cancel::check(cancel)?;
        let file = File::open(path).map_err(|e| {
            IngestError::io(format!("Failed to open {}", path.display()), e)
        })?;
        if let Some(origin) = path.file_name() {
            store.set_origin(&origin.to_string_lossy());
        }
        self.ingest_stream(store, BufReader::new(file), metadata.len(), cancel)
    }

    /// Runs the pipeline on a seekable cabinet: load, extract into a scratch
    /// directory, scan for metainfo, attach blobs and publish.
    ///
    /// `size` is the cabinet size in bytes, or 0 when unknown.  Nothing is
    /// published unless every step before publication succeeds, and the
    /// scratch directory is gone by the time this returns.
    pub fn ingest_stream<S, R>(
        &self,
        store: &mut S,
        blob: R,
        size: u64,
        cancel: Option<&Cancellable>,
    ) -> Result<()>
    where
        S: AppStore + ?Sized,
        R: Read + Seek,
    {
        let mut extractor = CabExtractor::load(blob)?;
        cancel::check(cancel)?;

        let mut scratch = ScratchDir::create_in(&self.temp_root, &self.scratch_prefix)?;
        let dir = scratch.path().to_path_buf();
        let members = extractor.extract_to(&dir, |_, relative| scratch.track(relative))?;

        let mut apps = scan_metainfo(&dir, &members, size)?;
        attach_blobs(&mut apps, &dir)?;

        for app in apps {
            debug!("adding {} to store", app.id());
            store.add_app(app);
        }
        scratch.close();
        Ok(())
    }
}

/// Ingests a cabinet from a reader with the default options.
pub fn ingest_reader<S, R>(
    store: &mut S,
    input: R,
    cancel: Option<&Cancellable>,
) -> Result<()>
where
    S: AppStore + ?Sized,
    R: Read,
{
    Ingester::default().ingest_reader(store, input, cancel)
}

/// Ingests a cabinet from an open file descriptor with the default options.
#[cfg(unix)]
pub fn ingest_fd<S>(
    store: &mut S,
    fd: std::os::fd::OwnedFd,
    cancel: Option<&Cancellable>,
) -> Result<()>
where
    S: AppStore + ?Sized,
{
    Ingester::default().ingest_fd(store, fd, cancel)
}

/// Ingests a cabinet file with the default options.
pub fn ingest_file<S>(store: &mut S, path: &Path, cancel: Option<&Cancellable>) -> Result<()>
where
    S: AppStore + ?Sized,
{
    Ingester::default().ingest_file(store, path, cancel)
}
