use std::collections::BTreeMap;

/// Which size of a release is meant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SizeKind {
    /// Size of the payload once installed.
    Installed,
    /// Size of the artifact that has to be downloaded.
    Download,
}

/// One versioned release of a component.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Release {
    version: Option<String>,
    timestamp: Option<u64>,
    urgency: Option<String>,
    locations: Vec<String>,
    filename: Option<String>,
    size_installed: u64,
    size_download: u64,
    blobs: BTreeMap<String, Vec<u8>>,
}

impl Release {
    /// Creates an empty release.
    pub fn new() -> Self {
        Self::default()
    }

    /// The version string.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Sets the version string.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    /// Release date as seconds since the Unix epoch.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Sets the release date.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = Some(timestamp);
    }

    /// Update urgency, e.g. `high`.
    pub fn urgency(&self) -> Option<&str> {
        self.urgency.as_deref()
    }

    /// Sets the update urgency.
    pub fn set_urgency(&mut self, urgency: impl Into<String>) {
        self.urgency = Some(urgency.into());
    }

    /// Download locations, in document order.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Appends a download location.
    pub fn add_location(&mut self, location: impl Into<String>) {
        self.locations.push(location.into());
    }

    /// The firmware payload file name.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Sets the firmware payload file name.
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
    }

    /// Returns the size of the given kind, or 0 when unknown.
    pub fn size(&self, kind: SizeKind) -> u64 {
        match kind {
            SizeKind::Installed => self.size_installed,
            SizeKind::Download => self.size_download,
        }
    }

    /// Sets the size of the given kind.
    pub fn set_size(&mut self, kind: SizeKind, size: u64) {
        match kind {
            SizeKind::Installed => self.size_installed = size,
            SizeKind::Download => self.size_download = size,
        }
    }

    /// Attaches `data` under `key`, replacing any earlier blob with that key.
    pub fn set_blob(&mut self, key: impl Into<String>, data: Vec<u8>) {
        self.blobs.insert(key.into(), data);
    }

    /// Returns the blob attached under `key`.
    pub fn blob(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    /// All attached blobs, ordered by key.
    pub fn blobs(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.blobs.iter().map(|(key, data)| (key.as_str(), data.as_slice()))
    }
}
