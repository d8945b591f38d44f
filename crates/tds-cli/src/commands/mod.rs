//! Command handler modules for tds-retag.
//!
//! `main.rs` owns argument parsing and process setup; the batch loop lives in
//! [`retag`].

pub mod retag;

use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

use tds_config::RetagConfig;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Whether paths should be read from stdin instead of the argument list.
///
/// Explicit `--stdin` wins; with no path arguments, piped stdin is used.
pub fn use_stdin(flag: bool, arg_count: usize) -> bool {
    flag || (arg_count == 0 && !io::stdin().is_terminal())
}

/// Collect normalized paths from `reader`, one per line, skipping blanks.
///
/// Lines are raw bytes: a line that is not UTF-8 still becomes a path and
/// succeeds or fails on its own.
pub fn read_path_lines<R: BufRead>(reader: R, cfg: &RetagConfig) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for line in reader.split(b'\n') {
        let line = os_from_bytes(line?);
        if let Some(p) = normalize_os(&line, cfg) {
            out.push(p);
        }
    }
    Ok(out)
}

/// Normalize paths given as arguments, skipping blanks.
pub fn normalize_args(args: &[OsString], cfg: &RetagConfig) -> Vec<PathBuf> {
    args.iter().filter_map(|a| normalize_os(a, cfg)).collect()
}

fn normalize_os(raw: &OsStr, cfg: &RetagConfig) -> Option<PathBuf> {
    match raw.to_str() {
        Some(s) => cfg.normalize_input(s).map(PathBuf::from),
        None => normalize_non_utf8(raw, cfg),
    }
}

#[cfg(unix)]
fn normalize_non_utf8(raw: &OsStr, cfg: &RetagConfig) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;

    let bytes = raw.as_bytes();
    let bytes = if cfg.input.strip_whitespace {
        bytes.trim_ascii()
    } else {
        bytes.strip_suffix(b"\r").unwrap_or(bytes)
    };
    (!bytes.is_empty()).then(|| PathBuf::from(OsStr::from_bytes(bytes)))
}

// Not UTF-8 and not a Unix byte path: pass it through as-is.
#[cfg(not(unix))]
fn normalize_non_utf8(raw: &OsStr, _cfg: &RetagConfig) -> Option<PathBuf> {
    (!raw.is_empty()).then(|| PathBuf::from(raw))
}

#[cfg(unix)]
fn os_from_bytes(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn os_from_bytes(bytes: Vec<u8>) -> OsString {
    match String::from_utf8(bytes) {
        Ok(s) => s.into(),
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_lines_are_trimmed_and_blanks_dropped() {
        let input = "  a/20200101000000  \n\n\t\nb/20200101000001\r\n";
        let got = read_path_lines(input.as_bytes(), &RetagConfig::default()).unwrap();
        assert_eq!(
            got,
            vec![
                PathBuf::from("a/20200101000000"),
                PathBuf::from("b/20200101000001")
            ]
        );
    }

    #[test]
    fn args_are_trimmed() {
        let args = vec![OsString::from(" x "), OsString::from("")];
        assert_eq!(
            normalize_args(&args, &RetagConfig::default()),
            vec![PathBuf::from("x")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn undecodable_line_is_kept_as_its_own_path() {
        use std::os::unix::ffi::OsStrExt;

        let input: &[u8] = b" \xff \n20200101000000\n";
        let got = read_path_lines(input, &RetagConfig::default()).unwrap();
        assert_eq!(
            got,
            vec![
                PathBuf::from(OsStr::from_bytes(b"\xff")),
                PathBuf::from("20200101000000")
            ]
        );
    }
}
