use std::fmt;
use std::io;
use std::path::PathBuf;

use tds_stamp::StampError;

/// Why one path could not be reconciled. Never fatal to the rest of a batch.
#[derive(Debug)]
pub enum RetagError {
    /// The path's directory component does not exist.
    NoSuchDirectory { path: String, dir: PathBuf },
    /// The base name is not a regular file in its directory.
    NoSuchFile {
        path: String,
        dir: PathBuf,
        base: String,
    },
    /// Neither `<tds>.<md5>` nor legacy `<tds>`.
    UnrecognizedFilenameForm { dir: PathBuf, base: String },
    /// The file (or an existing file at the canonical name) could not be read.
    DigestComputationError {
        dir: PathBuf,
        file: String,
        source: io::Error,
    },
    /// A file with different content already holds the canonical name.
    NameCollision {
        dir: PathBuf,
        base: String,
        proposed: String,
    },
    /// The OS rename (or removal of the verified duplicate ahead of it) failed.
    RenameFailed {
        dir: PathBuf,
        from: String,
        to: String,
        source: io::Error,
    },
    /// The TDS is not a real local instant, or mtime/atime could not be set.
    TimestampApplyFailed {
        dir: PathBuf,
        file: String,
        timestamp_code: String,
        source: StampError,
    },
}

impl RetagError {
    /// Stable tag for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            RetagError::NoSuchDirectory { .. } => "NO_SUCH_DIRECTORY",
            RetagError::NoSuchFile { .. } => "NO_SUCH_FILE",
            RetagError::UnrecognizedFilenameForm { .. } => "UNRECOGNIZED_FILENAME_FORM",
            RetagError::DigestComputationError { .. } => "DIGEST_COMPUTATION_ERROR",
            RetagError::NameCollision { .. } => "NAME_COLLISION",
            RetagError::RenameFailed { .. } => "RENAME_FAILED",
            RetagError::TimestampApplyFailed { .. } => "TIMESTAMP_APPLY_FAILED",
        }
    }
}

impl fmt::Display for RetagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetagError::NoSuchDirectory { path, dir } => {
                write!(f, "no dir '{}' for file '{path}'", dir.display())
            }
            RetagError::NoSuchFile { path, dir, base } => write!(
                f,
                "no file '{base}' for file '{path}' in dir '{}'",
                dir.display()
            ),
            RetagError::UnrecognizedFilenameForm { dir, base } => write!(
                f,
                "filename '{base}' in dir '{}' not in tds.md5 (or even in old tds) form",
                dir.display()
            ),
            RetagError::DigestComputationError { dir, file, source } => write!(
                f,
                "can't compute digest of '{file}' in '{}': {source}",
                dir.display()
            ),
            RetagError::NameCollision {
                dir,
                base,
                proposed,
            } => write!(
                f,
                "{base} collides with mistagged {proposed} in '{}'",
                dir.display()
            ),
            RetagError::RenameFailed {
                dir,
                from,
                to,
                source,
            } => write!(
                f,
                "can't rename '{from}' as '{to}' in '{}': {source}",
                dir.display()
            ),
            RetagError::TimestampApplyFailed {
                dir,
                file,
                timestamp_code,
                source,
            } => write!(
                f,
                "can't apply timestamp {timestamp_code} to '{file}' in '{}': {source}",
                dir.display()
            ),
        }
    }
}

impl std::error::Error for RetagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetagError::DigestComputationError { source, .. } => Some(source),
            RetagError::RenameFailed { source, .. } => Some(source),
            RetagError::TimestampApplyFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
