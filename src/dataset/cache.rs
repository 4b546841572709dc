//! Local download cache for registered datasets

use super::archive::{extract_archive, ArchiveFormat};
use super::checksum::{bytes_digest, matches_digest, HashAlgorithm};
use super::hub::{DataHub, DatasetEntry};
use crate::error::{KolosalError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default cache directory, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = "../data";

/// Resolves dataset names to verified local files
#[derive(Debug, Clone)]
pub struct DatasetCache {
    hub: DataHub,
    cache_dir: PathBuf,
    timeout: Duration,
    max_attempts: usize,
    retry_delay: Duration,
}

impl DatasetCache {
    /// Create a cache over `hub` storing files under `cache_dir`
    pub fn new(hub: DataHub, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            hub,
            cache_dir: cache_dir.into(),
            timeout: Duration::from_secs(60),
            max_attempts: 1,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow up to `attempts` downloads on transport or HTTP failures
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Pause between download attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn hub(&self) -> &DataHub {
        &self.hub
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Deterministic location of a dataset inside the cache
    pub fn cache_path(&self, name: &str) -> Result<PathBuf> {
        let entry = self.hub.get(name)?;
        Ok(self.cache_dir.join(entry.file_name()))
    }

    /// Return a verified local copy of `name`, downloading it on a cache miss
    /// or when the cached copy fails its checksum.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let entry = self.hub.get(name)?;
        let path = self.cache_dir.join(entry.file_name());

        if matches_digest(&path, &entry.content_hash)? {
            debug!(name = %name, path = %path.display(), "Cache hit");
            return Ok(path);
        }

        if path.exists() {
            warn!(name = %name, path = %path.display(), "Cached file failed checksum, downloading again");
        }

        fs::create_dir_all(&self.cache_dir)?;
        let algorithm = HashAlgorithm::from_hex_digest(&entry.content_hash)?;

        let start = Instant::now();
        let bytes = self.download(entry)?;
        let actual = bytes_digest(&bytes, algorithm);

        if !actual.eq_ignore_ascii_case(&entry.content_hash) {
            warn!(name = %name, expected = %entry.content_hash, actual = %actual, "Downloaded content failed checksum");
            if path.exists() {
                fs::remove_file(&path)?;
            }
            return Err(KolosalError::Integrity {
                name: name.to_string(),
                expected: entry.content_hash.clone(),
                actual,
            });
        }

        let partial = path.with_extension("part");
        fs::write(&partial, &bytes)?;
        fs::rename(&partial, &path)?;

        info!(
            name = %name,
            path = %path.display(),
            size_bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Downloaded dataset"
        );

        Ok(path)
    }

    /// Resolve an archive and unpack it into a per-dataset directory
    pub fn extract(&self, name: &str) -> Result<PathBuf> {
        let entry = self.hub.get(name)?;
        let file_name = entry.file_name();
        let (format, stem) = ArchiveFormat::detect(&file_name)?;
        let dest = self.cache_dir.join(stem);

        let archive = self.resolve(name)?;
        extract_archive(&archive, format, &dest)?;

        info!(name = %name, dir = %dest.display(), archive = ?format, "Extracted dataset");
        Ok(dest)
    }

    /// Resolve every registered dataset
    pub fn resolve_all(&self) -> Result<Vec<PathBuf>> {
        self.hub.names().into_iter().map(|name| self.resolve(name)).collect()
    }

    fn download(&self, entry: &DatasetEntry) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let mut attempt = 1;
        loop {
            info!(url = %entry.url, attempt, "Downloading dataset");
            let result = client
                .get(&entry.url)
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.bytes());

            match result {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(e) if attempt < self.max_attempts => {
                    warn!(url = %entry.url, attempt, error = %e, "Download failed, retrying");
                    attempt += 1;
                    thread::sleep(self.retry_delay);
                }
                Err(e) => {
                    return Err(KolosalError::Download(format!("{}: {}", entry.url, e)));
                }
            }
        }
    }
}
