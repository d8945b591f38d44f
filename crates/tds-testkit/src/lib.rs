//! Fixture helpers for filesystem scenario tests.
//!
//! [`ManagedDir`] owns a temporary directory and knows how to lay down files in
//! `<tds>` / `<tds>.<md5>` form and read back what the reconciler did to them.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tempfile::TempDir;

pub struct ManagedDir {
    tmp: TempDir,
}

impl ManagedDir {
    pub fn new() -> Result<Self> {
        let tmp = tempfile::tempdir().context("create temp dir")?;
        Ok(Self { tmp })
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Create `name` with `bytes` and return its full path.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let p = self.join(name);
        fs::write(&p, bytes).with_context(|| format!("write fixture {}", p.display()))?;
        Ok(p)
    }

    /// Create a subdirectory and return its full path.
    pub fn subdir(&self, name: &str) -> Result<PathBuf> {
        let p = self.join(name);
        fs::create_dir_all(&p).with_context(|| format!("mkdir {}", p.display()))?;
        Ok(p)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let p = self.join(name);
        fs::read(&p).with_context(|| format!("read {}", p.display()))
    }

    /// Sorted entry names, for before/after snapshots.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.path()).context("read_dir")? {
            out.push(entry?.file_name().to_string_lossy().into_owned());
        }
        out.sort();
        Ok(out)
    }

    pub fn mtime(&self, name: &str) -> Result<SystemTime> {
        mtime(&self.join(name))
    }

    /// Force `name`'s mtime/atime to an arbitrary TDS (to prove it gets reset).
    pub fn backdate(&self, name: &str, code: &str) -> Result<()> {
        tds_stamp::touch_with_code(&self.join(name), code)
            .map(|_| ())
            .with_context(|| format!("backdate {name} to {code}"))
    }
}

pub fn mtime(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("mtime of {}", path.display()))
}

/// The instant a TDS names, as the OS reports file times.
pub fn expected_time(code: &str) -> Result<SystemTime> {
    let instant = tds_stamp::parse_timestamp_code(code).with_context(|| format!("parse {code}"))?;
    Ok(SystemTime::from(instant))
}

/// The name a file with `tds` and `content` must end up carrying.
pub fn canonical(tds: &str, content: &[u8]) -> String {
    format!("{}.{}", tds, tds_digest::digest_bytes(content))
}

/// Lowercase hex MD5 of `content`.
pub fn digest(content: &[u8]) -> String {
    tds_digest::digest_bytes(content)
}

/// In-memory sink for `tracing` output, so scenarios can assert on warnings.
///
/// ```ignore
/// let logs = LogCapture::default();
/// tracing::subscriber::with_default(logs.subscriber(), || reconciler.process(&p));
/// assert!(logs.text().contains("..."));
/// ```
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// A plain-text fmt subscriber (debug and up) writing into this capture.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish()
    }

    pub fn text(&self) -> String {
        self.buf
            .lock()
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::other("log capture poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
