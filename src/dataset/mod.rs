//! Remote dataset registry, download cache and archive extraction
//!
//! A [`DataHub`] maps logical names to a source URL and the expected content
//! digest. [`DatasetCache`] resolves those names to verified files under a
//! local cache directory, downloading only on a miss or a checksum failure.

mod archive;
mod cache;
pub mod checksum;
mod hub;

pub use archive::{extract_archive, ArchiveFormat};
pub use cache::{DatasetCache, DEFAULT_CACHE_DIR};
pub use checksum::HashAlgorithm;
pub use hub::{DataHub, DatasetEntry, DATA_URL, KAGGLE_HOUSE_TEST, KAGGLE_HOUSE_TRAIN};
