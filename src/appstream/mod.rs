//! The AppStream side of ingestion: components, releases and the store they
//! are published into.

mod app;
mod release;
mod store;

pub use self::app::{guess_source_kind, App, ParseError, SourceKind};
pub use self::release::{Release, SizeKind};
pub use self::store::{AppStore, Store};
