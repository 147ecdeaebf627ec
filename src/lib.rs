//! Ingests firmware [cabinet](https://en.wikipedia.org/wiki/Cabinet_(file_format))
//! (CAB) archives into an AppStream component store.
//!
//! A firmware cabinet carries one or more `*.metainfo.xml` documents next to
//! the payloads they describe.  Ingesting it extracts every member into a
//! private scratch directory, parses the metainfo documents, attaches each
//! release's firmware file (and its detached `.asc` signature, if present)
//! and publishes the resulting components:
//!
//! ```no_run
//! use appstream_cab::{appstream::Store, ingest_file};
//! use std::path::Path;
//!
//! let mut store = Store::new();
//! ingest_file(&mut store, Path::new("firmware.cab"), None)?;
//! for app in store.apps() {
//!     println!("{} ({} releases)", app.id(), app.releases().len());
//! }
//! # Ok::<(), appstream_cab::IngestError>(())
//! ```
//!
//! The scratch directory is removed before any ingest call returns, whether
//! it succeeded or not.

#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod appstream;
mod attach;
mod cabinet;
mod cancel;
mod checksum;
mod consts;
mod ctype;
mod error;
mod extract;
mod file;
mod folder;
mod ingest;
mod mszip;
mod scan;
mod scratch;
mod stream;

pub use crate::attach::{attach_blobs, attach_release_blobs, SIGNATURE_SUFFIX};
pub use crate::cabinet::Cabinet;
pub use crate::cancel::Cancellable;
pub use crate::error::{IngestError, Result};
pub use crate::extract::CabExtractor;
pub use crate::file::FileEntry;
#[cfg(unix)]
pub use crate::ingest::ingest_fd;
pub use crate::ingest::{ingest_file, ingest_reader, Ingester};
pub use crate::scan::{scan_metainfo, LEGACY_FIRMWARE_FILENAME};
pub use crate::scratch::{ScratchDir, DEFAULT_PREFIX};
pub use crate::stream::{BufferedStream, CHUNK_SIZE};
