//! Components and the metainfo parser.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::release::{Release, SizeKind};

/// Error parsing a metainfo document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document could not be read.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed or does not have the expected shape.
    #[error("XML error: {0}")]
    Xml(#[from] serde_xml_rs::Error),

    /// The component has no `<id>` element.
    #[error("component has no <id>")]
    MissingId,
}

/// How a file should be interpreted, judged from its name.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SourceKind {
    /// An AppStream metainfo document.
    Metainfo,
    /// A Windows driver installation descriptor.
    Inf,
    /// Anything else.
    Unknown,
}

/// Classifies a file name.
///
/// Only the final component matters; `\` and `/` both separate components.
pub fn guess_source_kind(name: &str) -> SourceKind {
    let basename = name.rsplit(|c| c == '\\' || c == '/').next().unwrap_or(name);
    if basename.ends_with(".metainfo.xml") || basename.ends_with(".metainfo.xml.in") {
        SourceKind::Metainfo
    } else if basename.len() > 4
        && basename.is_char_boundary(basename.len() - 4)
        && basename[basename.len() - 4..].eq_ignore_ascii_case(".inf")
    {
        SourceKind::Inf
    } else {
        SourceKind::Unknown
    }
}

/// A software component and its releases.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct App {
    id: String,
    kind: Option<String>,
    name: Option<String>,
    summary: Option<String>,
    releases: Vec<Release>,
}

impl App {
    /// Creates a component with no metadata and no releases.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    /// Parse a metainfo document from a file.
    pub fn parse_file(path: &Path) -> Result<Self, ParseError> {
        Self::from_reader(File::open(path)?)
    }

    /// Parse a metainfo document from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, ParseError> {
        let mut de = serde_xml_rs::Deserializer::new_from_reader(reader)
            .non_contiguous_seq_elements(true);

        Self::try_from(ComponentXml::deserialize(&mut de)?)
    }

    /// Parse a metainfo document from a string.
    pub fn from_xml(s: &str) -> Result<Self, ParseError> {
        Self::from_reader(s.as_bytes())
    }

    /// The component identifier, e.g. `com.example.Device.firmware`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The component type, e.g. `firmware`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The untranslated component name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The untranslated one-line summary.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Releases in declaration order.
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Releases in declaration order, mutably.
    pub fn releases_mut(&mut self) -> &mut [Release] {
        &mut self.releases
    }

    /// Appends a release.
    pub fn add_release(&mut self, release: Release) {
        self.releases.push(release);
    }

    /// The primary release, which is the first one declared.
    pub fn default_release(&self) -> Option<&Release> {
        self.releases.first()
    }

    /// Mutable access to the default release.
    pub fn default_release_mut(&mut self) -> Option<&mut Release> {
        self.releases.first_mut()
    }
}

#[derive(Debug, Deserialize)]
struct ComponentXml {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "name", default)]
    names: Vec<TextXml>,
    #[serde(rename = "summary", default)]
    summaries: Vec<TextXml>,
    #[serde(default)]
    releases: Option<ReleasesXml>,
}

/// A translatable element; untranslated when `lang` is absent.
#[derive(Debug, Deserialize)]
struct TextXml {
    #[serde(default)]
    lang: Option<String>,
    #[serde(rename = "$value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ReleasesXml {
    #[serde(rename = "release", default)]
    releases: Vec<ReleaseXml>,
}

#[derive(Debug, Deserialize)]
struct ReleaseXml {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    timestamp: Option<u64>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(rename = "location", default)]
    locations: Vec<String>,
    #[serde(rename = "checksum", default)]
    checksums: Vec<ChecksumXml>,
    #[serde(rename = "size", default)]
    sizes: Vec<SizeXml>,
}

#[derive(Debug, Deserialize)]
struct ChecksumXml {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SizeXml {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "$value")]
    value: u64,
}

fn untranslated(texts: Vec<TextXml>) -> Option<String> {
    let mut fallback = None;
    for text in texts {
        if text.lang.is_none() {
            return Some(text.value);
        }
        fallback.get_or_insert(text.value);
    }
    fallback
}

impl TryFrom<ComponentXml> for App {
    type Error = ParseError;

    fn try_from(v: ComponentXml) -> Result<Self, Self::Error> {
        let id = match v.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => return Err(ParseError::MissingId),
        };
        let releases = v
            .releases
            .map(|releases| releases.releases)
            .unwrap_or_default()
            .into_iter()
            .map(Release::from)
            .collect();

        Ok(App {
            id,
            kind: v.kind,
            name: untranslated(v.names),
            summary: untranslated(v.summaries),
            releases,
        })
    }
}

impl From<ReleaseXml> for Release {
    fn from(v: ReleaseXml) -> Self {
        let mut release = Release::new();
        if let Some(version) = v.version {
            release.set_version(version);
        }
        if let Some(timestamp) = v.timestamp {
            release.set_timestamp(timestamp);
        }
        if let Some(urgency) = v.urgency {
            release.set_urgency(urgency);
        }
        for location in v.locations {
            release.add_location(location.trim());
        }

        // The payload is named by the content checksum, falling back to any
        // checksum that carries a file name.
        let filename = v
            .checksums
            .iter()
            .find(|c| c.target.as_deref() == Some("content") && c.filename.is_some())
            .or_else(|| v.checksums.iter().find(|c| c.filename.is_some()))
            .and_then(|c| c.filename.clone());
        if let Some(filename) = filename {
            release.set_filename(filename);
        }

        for size in v.sizes {
            match size.kind.as_str() {
                "installed" => release.set_size(SizeKind::Installed, size.value),
                "download" => release.set_size(SizeKind::Download, size.value),
                _ => {}
            }
        }

        release
    }
}
