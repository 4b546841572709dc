//! Content digests for cached files

use crate::error::{KolosalError, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Files are hashed in chunks of this many bytes
const CHUNK_SIZE: usize = 1 << 20;

/// Digest algorithm of an expected content hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Infer the algorithm from the length of a hex digest
    pub fn from_hex_digest(digest: &str) -> Result<Self> {
        if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KolosalError::InvalidArgument(format!(
                "content hash is not hex encoded: {}",
                digest
            )));
        }
        match digest.len() {
            40 => Ok(HashAlgorithm::Sha1),
            64 => Ok(HashAlgorithm::Sha256),
            n => Err(KolosalError::InvalidArgument(format!(
                "content hash has {} hex chars, expected 40 (SHA-1) or 64 (SHA-256)",
                n
            ))),
        }
    }
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

/// Hex digest of a file
pub fn file_digest(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let file = File::open(path)?;
    match algorithm {
        HashAlgorithm::Sha1 => digest_reader::<Sha1, _>(file),
        HashAlgorithm::Sha256 => digest_reader::<Sha256, _>(file),
    }
}

/// Hex digest of an in-memory buffer
pub fn bytes_digest(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha1 => format!("{:x}", Sha1::digest(data)),
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
    }
}

/// Whether the file at `path` has the expected digest.
///
/// Returns `Ok(false)` for a missing file.
pub fn matches_digest(path: &Path, expected: &str) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    let algorithm = HashAlgorithm::from_hex_digest(expected)?;
    let actual = file_digest(path, algorithm)?;
    Ok(actual.eq_ignore_ascii_case(expected))
}
