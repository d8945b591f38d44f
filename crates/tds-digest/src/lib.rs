//! tds-digest
//!
//! Content digest for managed files: MD5 over the full file bytes, rendered as
//! 32 lowercase hex characters. Depends on content only (never on the name or
//! metadata).

use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Length of a hex-rendered digest.
pub const DIGEST_HEX_LEN: usize = 32;

const READ_CHUNK: usize = 64 * 1024;

/// Stream the file at `path` through MD5.
pub fn digest_of(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    digest_reader(BufReader::new(file))
}

/// Digest everything readable from `reader`.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Digest an in-memory buffer.
pub fn digest_bytes(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        // RFC 1321 test suite.
        assert_eq!(digest_bytes(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest_bytes(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            digest_bytes(b"message digest"),
            "f96b697d7cb7938d525a2f31aaf161d0"
        );
    }

    #[test]
    fn reader_matches_bytes_across_chunk_boundary() {
        let data: Vec<u8> = (0..(READ_CHUNK * 2 + 17)).map(|i| (i % 251) as u8).collect();
        let streamed = digest_reader(&data[..]).unwrap();
        assert_eq!(streamed, digest_bytes(&data));
        assert_eq!(streamed.len(), DIGEST_HEX_LEN);
        assert!(streamed.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
}
