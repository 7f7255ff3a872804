//! Downloading and unpacking export bundles.

use crate::{MetadataError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retrieves a bundle from a URL into a directory.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Downloads `url` and extracts it under `destination`, returning the
    /// files written.
    async fn fetch(&self, url: &str, destination: &Path, clean: bool) -> Result<Vec<PathBuf>>;
}

/// Fetches bundles over HTTP.
pub struct HttpArchiveFetcher {
    client: Client,
}

impl HttpArchiveFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetadataError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch(&self, url: &str, destination: &Path, clean: bool) -> Result<Vec<PathBuf>> {
        debug!("Downloading bundle: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::Transport(format!("Bundle download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Transport(format!(
                "Bundle download failed with status {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MetadataError::Transport(format!("Failed to read bundle: {}", e)))?;
        info!(bytes = bytes.len(), "downloaded bundle");

        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || extract_archive(&bytes, &destination, clean))
            .await
            .map_err(|e| MetadataError::Archive(format!("Extraction task failed: {}", e)))?
    }
}

/// Extracts a zip archive under `destination`.
///
/// With `clean` the destination is removed and recreated first. Entry paths
/// that would escape the destination are skipped. A regular file standing
/// where a directory or the entry itself must go is removed.
pub fn extract_archive(bytes: &[u8], destination: &Path, clean: bool) -> Result<Vec<PathBuf>> {
    if destination.exists() && !destination.is_dir() {
        return Err(MetadataError::invalid_input(
            "destination",
            format!("{} is not a directory", destination.display()),
        ));
    }

    if clean && destination.exists() {
        debug!("Cleaning {}", destination.display());
        fs::remove_dir_all(destination)?;
    }
    fs::create_dir_all(destination)?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut written = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let outpath = destination.join(&relative);

        clear_file_ancestors(destination, &relative)?;

        if entry.is_dir() {
            remove_if_file(&outpath)?;
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        remove_if_file(&outpath)?;

        let mut outfile = File::create(&outpath)?;
        io::copy(&mut entry, &mut outfile)?;
        written.push(outpath);
    }

    info!(
        files = written.len(),
        "extracted bundle into {}",
        destination.display()
    );
    Ok(written)
}

/// Removes regular files occupying any directory the entry needs.
fn clear_file_ancestors(destination: &Path, relative: &Path) -> io::Result<()> {
    let mut current = destination.to_path_buf();
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        remove_if_file(&current)?;
    }
    Ok(())
}

fn remove_if_file(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => {
            debug!("Removing colliding file {}", path.display());
            fs::remove_file(path)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };
    use zip::write::SimpleFileOptions;

    fn bundle(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extracts_nested_entries() {
        let temp = TempDir::new().unwrap();
        let bytes = bundle(&[
            ("en.lproj/Localizable.strings", "\"a\" = \"b\";"),
            ("de.lproj/Localizable.strings", "\"a\" = \"c\";"),
        ]);

        let written = extract_archive(&bytes, temp.path(), false).unwrap();
        assert_eq!(written.len(), 2);
        let contents =
            fs::read_to_string(temp.path().join("de.lproj/Localizable.strings")).unwrap();
        assert_eq!(contents, "\"a\" = \"c\";");
    }

    #[test]
    fn test_clean_extraction_over_colliding_file() {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("res");
        fs::create_dir_all(&destination).unwrap();
        // a stray file where a directory has to go
        fs::write(destination.join("values-de"), "stray").unwrap();
        fs::write(destination.join("old.txt"), "old").unwrap();

        let bytes = bundle(&[("values-de/strings.xml", "<resources/>")]);
        extract_archive(&bytes, &destination, true).unwrap();

        assert!(destination.join("values-de").is_dir());
        assert_eq!(
            fs::read_to_string(destination.join("values-de/strings.xml")).unwrap(),
            "<resources/>"
        );
        assert!(!destination.join("old.txt").exists());
    }

    #[test]
    fn test_colliding_file_removed_without_clean() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("values-fr"), "stray").unwrap();
        fs::write(temp.path().join("keep.txt"), "keep").unwrap();

        let bytes = bundle(&[("values-fr/strings.xml", "<resources/>")]);
        extract_archive(&bytes, temp.path(), false).unwrap();

        assert!(temp.path().join("values-fr/strings.xml").is_file());
        assert!(temp.path().join("keep.txt").exists());
    }

    #[test]
    fn test_existing_entry_file_is_replaced() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("en.lproj")).unwrap();
        fs::write(temp.path().join("en.lproj/Localizable.strings"), "old").unwrap();

        let bytes = bundle(&[("en.lproj/Localizable.strings", "new")]);
        extract_archive(&bytes, temp.path(), false).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("en.lproj/Localizable.strings")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_destination_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bundle");
        fs::write(&file, "not a dir").unwrap();

        let err = extract_archive(&bundle(&[("a.txt", "a")]), &file, true).unwrap_err();
        assert!(matches!(err, MetadataError::Config(_)));
        assert!(file.is_file());
    }

    #[test]
    fn test_invalid_archive_is_archive_error() {
        let temp = TempDir::new().unwrap();
        let err = extract_archive(b"not a zip", temp.path(), false).unwrap_err();
        assert!(matches!(err, MetadataError::Archive(_)));
    }

    #[tokio::test]
    async fn test_http_fetcher_downloads_and_extracts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bundle.zip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(bundle(&[("values/strings.xml", "<resources/>")])),
            )
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let fetcher = HttpArchiveFetcher::new(Duration::from_secs(5)).unwrap();
        let written = fetcher
            .fetch(&format!("{}/bundle.zip", server.uri()), temp.path(), true)
            .await
            .unwrap();
        assert_eq!(written, vec![temp.path().join("values/strings.xml")]);
    }

    #[tokio::test]
    async fn test_http_fetcher_surfaces_extraction_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("bundle");
        let fetcher = HttpArchiveFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/bundle.zip", server.uri()), &destination, true)
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Archive(_)));
        assert!(destination.is_dir());
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let fetcher = HttpArchiveFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/bundle.zip", server.uri()), temp.path(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Transport(_)));
    }
}
