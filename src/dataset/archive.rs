//! Archive extraction (zip, tar, gzip-compressed tar)

use crate::error::{KolosalError, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Archive formats understood by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Detect the format from a file name, returning the name without its
    /// archive extension alongside it.
    pub fn detect(file_name: &str) -> Result<(Self, &str)> {
        let lower = file_name.to_ascii_lowercase();
        let suffixes: [(&str, ArchiveFormat); 5] = [
            (".tar.gz", ArchiveFormat::TarGz),
            (".tgz", ArchiveFormat::TarGz),
            (".gz", ArchiveFormat::TarGz),
            (".tar", ArchiveFormat::Tar),
            (".zip", ArchiveFormat::Zip),
        ];

        for (suffix, format) in suffixes {
            if lower.ends_with(suffix) && lower.len() > suffix.len() {
                let stem = &file_name[..file_name.len() - suffix.len()];
                return Ok((format, stem));
            }
        }

        Err(KolosalError::UnsupportedFormat(file_name.to_string()))
    }
}

/// Unpack `archive` into `dest`, creating it if needed
pub fn extract_archive(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dest)?;
    let reader = BufReader::new(File::open(archive)?);

    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(reader)?;
            zip.extract(dest)?;
        }
        ArchiveFormat::Tar => {
            tar::Archive::new(reader).unpack(dest)?;
        }
        ArchiveFormat::TarGz => {
            tar::Archive::new(GzDecoder::new(reader)).unpack(dest)?;
        }
    }

    Ok(dest.to_path_buf())
}
