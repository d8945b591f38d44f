use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::{
    canonical_name, parse_name, split_path, ReconcileOptions, Reconciled, RenameNotice, RetagError,
};

/// Reconciles one managed file at a time.
///
/// Holds no state between calls beyond its options; each `process` call is
/// independent and resolves everything against the path's own directory.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    opts: ReconcileOptions,
}

impl Reconciler {
    pub fn new(opts: ReconcileOptions) -> Self {
        Self { opts }
    }

    /// Verify or repair the name and timestamps of the file at `path`.
    ///
    /// Side effects, at most one each: rename into the canonical name, removal
    /// of a byte-identical file already holding that name, mtime/atime update.
    pub fn process(&self, path: impl AsRef<Path>) -> Result<Reconciled, RetagError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        // 1. Directory resolution.
        let (dir, base_os) = split_path(path);
        if !dir.is_dir() {
            return Err(RetagError::NoSuchDirectory { path: shown, dir });
        }

        // 2. The base must be a regular file inside `dir`.
        let base_os = base_os.unwrap_or_default();
        let base = base_os.to_string_lossy().into_owned();
        let source = dir.join(&base_os);
        if base_os.is_empty() || !source.is_file() {
            return Err(RetagError::NoSuchFile {
                path: shown,
                dir,
                base,
            });
        }

        // 3. Filename form.
        let parsed = match base_os.to_str().and_then(parse_name) {
            Some(p) => p,
            None => return Err(RetagError::UnrecognizedFilenameForm { dir, base }),
        };
        let tds = parsed.timestamp().to_string();

        // 4. Several names sharing one TDS is suspicious, not fatal.
        if self.opts.warn_shared_timestamp {
            match count_prefixed(&dir, &tds) {
                Ok(n) if n > 1 => warn!(
                    dir = %dir.display(),
                    timestamp_code = %tds,
                    count = n,
                    "multiple files with the same timestamp code"
                ),
                Ok(_) => {}
                Err(e) => debug!(dir = %dir.display(), "can't list directory: {e}"),
            }
        }

        // 5. Content digest.
        let digest = tds_digest::digest_of(&source).map_err(|source| {
            RetagError::DigestComputationError {
                dir: dir.clone(),
                file: base.clone(),
                source,
            }
        })?;
        debug!(file = %source.display(), %digest, "digest computed");

        // 6. What the file should be called.
        let proposed = canonical_name(&tds, &digest);

        // 7. Rename (with duplicate / collision handling) when the name is off.
        let mut duplicate_removed = false;
        let rename = if base == proposed {
            debug!(file = %source.display(), "already canonical");
            None
        } else {
            let target = dir.join(&proposed);
            let linked = is_same_file(&source, &target);
            // One file spelled two ways on a case-insensitive filesystem.
            let case_alias = linked && base.eq_ignore_ascii_case(&proposed);
            if target.is_file() && !case_alias {
                // A hard link to the source holds the same bytes.
                if !linked {
                    let existing = tds_digest::digest_of(&target).map_err(|source| {
                        RetagError::DigestComputationError {
                            dir: dir.clone(),
                            file: proposed.clone(),
                            source,
                        }
                    })?;

                    if existing != digest {
                        return Err(RetagError::NameCollision {
                            dir,
                            base,
                            proposed,
                        });
                    }
                }

                warn!(
                    dir = %dir.display(),
                    "{} has duplicate ({}) = deleting",
                    base,
                    proposed
                );
                fs::remove_file(&target).map_err(|source| RetagError::RenameFailed {
                    dir: dir.clone(),
                    from: base.clone(),
                    to: proposed.clone(),
                    source,
                })?;
                duplicate_removed = true;
            }

            fs::rename(&source, &target).map_err(|source| RetagError::RenameFailed {
                dir: dir.clone(),
                from: base.clone(),
                to: proposed.clone(),
                source,
            })?;

            Some(RenameNotice {
                timestamp_code: tds.clone(),
                old_digest: parsed.digest().to_string(),
                new_digest: digest.clone(),
            })
        };

        // 8. Timestamps follow the TDS whether or not a rename happened.
        let target = dir.join(&proposed);
        let instant = tds_stamp::touch_with_code(&target, &tds).map_err(|source| {
            RetagError::TimestampApplyFailed {
                dir: dir.clone(),
                file: proposed.clone(),
                timestamp_code: tds.clone(),
                source,
            }
        })?;
        debug!(file = %target.display(), %instant, "timestamp applied");

        Ok(Reconciled {
            dir,
            name: proposed,
            timestamp_code: tds,
            digest,
            rename,
            duplicate_removed,
        })
    }
}

/// Number of regular files in `dir` whose name starts with `prefix`.
fn count_prefixed(dir: &Path, prefix: &str) -> io::Result<usize> {
    let mut n = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file()
            && entry.file_name().to_string_lossy().starts_with(prefix)
        {
            n += 1;
        }
    }
    Ok(n)
}

/// True when both paths reach the same file: a hard link, or a case-only
/// rename on a case-insensitive filesystem.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    let lower = |p: &Path| -> Option<String> {
        fs::canonicalize(p)
            .ok()
            .map(|c| c.to_string_lossy().to_lowercase())
    };
    match (lower(a), lower(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
