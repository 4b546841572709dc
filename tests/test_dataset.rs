//! Integration test: dataset cache against a local HTTP server

use kolosal_house_prices::dataset::checksum::{bytes_digest, HashAlgorithm};
use kolosal_house_prices::dataset::{DataHub, DatasetCache, DatasetEntry};
use kolosal_house_prices::KolosalError;
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Serve fixed bodies by path; unknown paths get a 404. Returns the base URL
/// and a request counter.
fn serve(routes: Vec<(&'static str, Vec<u8>)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let Ok(read_half) = stream.try_clone() else { continue };
            let mut reader = BufReader::new(read_half);

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(n) if n > 2 => continue,
                    _ => break,
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);

            let path = request_line.split_whitespace().nth(1).unwrap_or("/");
            match routes.iter().find(|(route, _)| *route == path) {
                Some((_, body)) => {
                    let _ = write!(
                        stream,
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(body);
                }
                None => {
                    let _ = stream.write_all(
                        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    );
                }
            }
            let _ = stream.flush();
        }
    });

    (format!("http://{}", addr), hits)
}

fn csv_body() -> Vec<u8> {
    b"Id,LotArea,SalePrice\n1,8450,208500\n2,9600,181500\n".to_vec()
}

#[test]
fn test_download_then_cache_hit() {
    let body = csv_body();
    let (base, hits) = serve(vec![("/train.csv", body.clone())]);
    let dir = tempfile::tempdir().unwrap();

    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "train",
        format!("{}/train.csv", base),
        bytes_digest(&body, HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path().join("nested").join("data"));

    let path = cache.resolve("train").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let again = cache.resolve("train").unwrap();
    assert_eq!(again, path);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "verified copy must not be fetched again");
}

#[test]
fn test_corrupted_copy_is_downloaded_again() {
    let body = csv_body();
    let (base, hits) = serve(vec![("/train.csv", body.clone())]);
    let dir = tempfile::tempdir().unwrap();

    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "train",
        format!("{}/train.csv", base),
        bytes_digest(&body, HashAlgorithm::Sha256),
    ));
    let cache = DatasetCache::new(hub, dir.path());

    let path = cache.resolve("train").unwrap();
    std::fs::write(&path, b"corrupted").unwrap();

    let path = cache.resolve("train").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_integrity_failure_leaves_no_file() {
    let (base, _) = serve(vec![("/train.csv", csv_body())]);
    let dir = tempfile::tempdir().unwrap();

    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "train",
        format!("{}/train.csv", base),
        bytes_digest(b"something else", HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path());

    let err = cache.resolve("train").unwrap_err();
    match err {
        KolosalError::Integrity { name, expected, actual } => {
            assert_eq!(name, "train");
            assert_ne!(expected, actual);
        }
        other => panic!("expected integrity error, got {:?}", other),
    }
    assert!(!cache.cache_path("train").unwrap().exists());
}

#[test]
fn test_http_error_is_download_error() {
    let (base, hits) = serve(vec![]);
    let dir = tempfile::tempdir().unwrap();

    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "gone",
        format!("{}/gone.csv", base),
        bytes_digest(b"", HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path());

    assert!(matches!(cache.resolve("gone"), Err(KolosalError::Download(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_opt_in_retries() {
    let (base, hits) = serve(vec![]);
    let dir = tempfile::tempdir().unwrap();

    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "gone",
        format!("{}/gone.csv", base),
        bytes_digest(b"", HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path())
        .with_max_attempts(3)
        .with_retry_delay(Duration::from_millis(10));

    assert!(matches!(cache.resolve("gone"), Err(KolosalError::Download(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_resolve_all() {
    let a = b"a\n1\n".to_vec();
    let b = b"b\n2\n".to_vec();
    let (base, _) = serve(vec![("/a.csv", a.clone()), ("/b.csv", b.clone())]);
    let dir = tempfile::tempdir().unwrap();

    let hub = DataHub::new()
        .with_entry(DatasetEntry::new("a", format!("{}/a.csv", base), bytes_digest(&a, HashAlgorithm::Sha1)))
        .with_entry(DatasetEntry::new("b", format!("{}/b.csv", base), bytes_digest(&b, HashAlgorithm::Sha1)));
    let cache = DatasetCache::new(hub, dir.path());

    let paths = cache.resolve_all().unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.is_file()));
}

#[test]
fn test_extract_zip() {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("houses.csv", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"Id,SalePrice\n1,100\n").unwrap();
    let archive = writer.finish().unwrap().into_inner();

    let (base, _) = serve(vec![("/bundle.zip", archive.clone())]);
    let dir = tempfile::tempdir().unwrap();
    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "bundle",
        format!("{}/bundle.zip", base),
        bytes_digest(&archive, HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path());

    let out = cache.extract("bundle").unwrap();
    assert_eq!(out, dir.path().join("bundle"));
    let content = std::fs::read_to_string(out.join("houses.csv")).unwrap();
    assert!(content.starts_with("Id,SalePrice"));
}

#[test]
fn test_extract_tar_gz() {
    let data = b"hello archive";
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, "inner/notes.txt", &data[..]).unwrap();
    let archive = builder.into_inner().unwrap().finish().unwrap();

    let (base, _) = serve(vec![("/bundle.tar.gz", archive.clone())]);
    let dir = tempfile::tempdir().unwrap();
    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "bundle",
        format!("{}/bundle.tar.gz", base),
        bytes_digest(&archive, HashAlgorithm::Sha256),
    ));
    let cache = DatasetCache::new(hub, dir.path());

    let out = cache.extract("bundle").unwrap();
    assert_eq!(out, dir.path().join("bundle"));
    assert_eq!(std::fs::read(out.join("inner").join("notes.txt")).unwrap(), data);
}

#[test]
fn test_extract_plain_tar() {
    let data = b"Id,SalePrice\n1,100\n";
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, "houses.csv", &data[..]).unwrap();
    let archive = builder.into_inner().unwrap();

    let (base, _) = serve(vec![("/bundle.tar", archive.clone())]);
    let dir = tempfile::tempdir().unwrap();
    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "bundle",
        format!("{}/bundle.tar", base),
        bytes_digest(&archive, HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path());

    let out = cache.extract("bundle").unwrap();
    assert_eq!(out, dir.path().join("bundle"));
    assert_eq!(std::fs::read(out.join("houses.csv")).unwrap(), data);
}

#[test]
fn test_extract_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let hub = DataHub::new().with_entry(DatasetEntry::new(
        "plain",
        "http://127.0.0.1:9/plain.csv",
        bytes_digest(b"", HashAlgorithm::Sha1),
    ));
    let cache = DatasetCache::new(hub, dir.path());
    assert!(matches!(
        cache.extract("plain"),
        Err(KolosalError::UnsupportedFormat(_))
    ));
}
