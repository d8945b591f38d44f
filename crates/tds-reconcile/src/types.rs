use std::fmt;
use std::path::PathBuf;

/// A base name that matched the wire format `^\d{14}(\.[0-9A-Fa-f]{32})?$`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedName {
    /// `<tds>.<md5>`; digest kept exactly as written (either hex case).
    Full { timestamp: String, digest: String },
    /// Bare `<tds>` from before digests were part of the name.
    Legacy { timestamp: String },
}

impl ParsedName {
    pub fn timestamp(&self) -> &str {
        match self {
            ParsedName::Full { timestamp, .. } | ParsedName::Legacy { timestamp } => timestamp,
        }
    }

    /// Digest portion as written; empty for the legacy form.
    pub fn digest(&self) -> &str {
        match self {
            ParsedName::Full { digest, .. } => digest,
            ParsedName::Legacy { .. } => "",
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, ParsedName::Legacy { .. })
    }
}

/// Reported when a file's digest portion was rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameNotice {
    pub timestamp_code: String,
    /// Empty when the file was in legacy form.
    pub old_digest: String,
    pub new_digest: String,
}

/// `<tds>: <old> -> <new>`, the one line written to stdout per rename.
impl fmt::Display for RenameNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.timestamp_code, self.old_digest, self.new_digest
        )
    }
}

/// Successful reconciliation of one path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub dir: PathBuf,
    /// Canonical base name the file now carries.
    pub name: String,
    pub timestamp_code: String,
    pub digest: String,
    pub rename: Option<RenameNotice>,
    /// A byte-identical file already held the canonical name and was removed.
    pub duplicate_removed: bool,
}

impl Reconciled {
    pub fn renamed(&self) -> bool {
        self.rename.is_some()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}

/// Knobs for [`crate::Reconciler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Warn when more than one file in the directory starts with the same TDS.
    pub warn_shared_timestamp: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            warn_shared_timestamp: true,
        }
    }
}
