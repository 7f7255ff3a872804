//! Translation bundles: exporting them from the project and uploading
//! Android string resources to it.

use super::{SyncContext, SyncReport, UploadedFile};
use crate::client::{ExportRequest, FileUpload};
use crate::export::AsyncExportPoller;
use crate::{MetadataError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Language whose strings live in the unqualified `values` directory.
const DEFAULT_RESOURCE_LANGUAGE: &str = "en";
const STRINGS_FILE: &str = "strings.xml";

pub(super) async fn download(
    context: &SyncContext,
    request: &ExportRequest,
    destination: &Path,
    clean: bool,
) -> Result<SyncReport> {
    if destination.exists() && !destination.is_dir() {
        return Err(MetadataError::invalid_input(
            "destination",
            format!("{} is not a directory", destination.display()),
        ));
    }

    let poller = AsyncExportPoller::new(context.client(), context.poll_config());
    let url = poller.run(request).await?.into_result()?;
    let files = context.fetcher.fetch(&url, destination, clean).await?;

    Ok(SyncReport::Downloaded {
        url,
        destination: destination.to_path_buf(),
        files,
    })
}

/// Resource file holding a language's strings.
pub(super) fn strings_path(resources_dir: &Path, language: &str) -> PathBuf {
    let directory = if language == DEFAULT_RESOURCE_LANGUAGE {
        "values".to_string()
    } else {
        format!("values-{}", language)
    };
    resources_dir.join(directory).join(STRINGS_FILE)
}

pub(super) async fn upload_strings(
    context: &SyncContext,
    languages: &[String],
    resources_dir: &Path,
) -> Result<SyncReport> {
    if languages.is_empty() {
        return Err(MetadataError::invalid_input(
            "languages",
            "at least one language is required",
        ));
    }
    locsync_core::config::validation::validate_list("languages", languages)?;

    let mut uploads = Vec::with_capacity(languages.len());
    for language in languages {
        let path = strings_path(resources_dir, language);
        let contents = fs::read(&path).await?;

        let upload = FileUpload {
            filename: STRINGS_FILE.to_string(),
            data: BASE64.encode(contents),
            lang_iso: language.clone(),
            convert_placeholders: true,
            slashn_to_linebreak: true,
        };
        let process_id = context.client().upload_file(&upload).await?;
        info!(
            language = %language,
            process_id = process_id.as_deref().unwrap_or("-"),
            "uploaded localization file"
        );

        uploads.push(UploadedFile {
            language: language.clone(),
            path,
            process_id,
        });
    }

    Ok(SyncReport::Uploaded { uploads })
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_context;
    use super::super::SyncAction;
    use super::*;
    use crate::JobFailure;
    use serde_json::{json, Value};
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn bundle_bytes() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("values-de/strings.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<resources/>").unwrap();
        writer.finish().unwrap().into_inner()
    }

    async fn mount_export(server: &MockServer, status: &str, url: Option<String>) {
        Mock::given(method("POST"))
            .and(path("/projects/p1/files/async-download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"process_id": "e1"})))
            .mount(server)
            .await;
        let details = match url {
            Some(url) => json!({"download_url": url}),
            None => json!({}),
        };
        Mock::given(method("GET"))
            .and(path("/projects/p1/processes/e1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "process": {"process_id": "e1", "status": status, "message": "", "details": details}
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_strings_path() {
        let base = Path::new("app/src/main/res");
        assert_eq!(strings_path(base, "en"), base.join("values/strings.xml"));
        assert_eq!(strings_path(base, "de"), base.join("values-de/strings.xml"));
    }

    #[tokio::test]
    async fn test_download_polls_and_extracts() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start().await;
        mount_export(&server, "finished", Some(format!("{}/files/bundle.zip", server.uri()))).await;
        Mock::given(method("GET"))
            .and(path("/files/bundle.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bundle_bytes()))
            .expect(1)
            .mount(&server)
            .await;

        let destination = temp.path().join("res");
        let context = test_context(&server, &temp);
        let report = context
            .run(SyncAction::DownloadBundle {
                request: ExportRequest::android_xml(),
                destination: destination.clone(),
                clean: true,
            })
            .await
            .unwrap();

        match report {
            SyncReport::Downloaded { files, .. } => {
                assert_eq!(files, vec![destination.join("values-de/strings.xml")])
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_timeout_fetches_nothing() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start().await;
        mount_export(&server, "running", None).await;

        let context = test_context(&server, &temp);
        let err = context
            .run(SyncAction::DownloadBundle {
                request: ExportRequest::ios_strings(),
                destination: temp.path().join("out"),
                clean: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MetadataError::Job(JobFailure::TimedOut { attempts: 3, .. })
        ));
        assert!(!temp.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_download_rejects_file_destination() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("out");
        std::fs::write(&file, "x").unwrap();
        let server = MockServer::start().await;

        let context = test_context(&server, &temp);
        let err = context
            .run(SyncAction::DownloadBundle {
                request: ExportRequest::ios_strings(),
                destination: file,
                clean: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Config(_)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_upload_strings_encodes_files() {
        let temp = TempDir::new().unwrap();
        let res = temp.path().join("res");
        std::fs::create_dir_all(res.join("values")).unwrap();
        std::fs::create_dir_all(res.join("values-fr")).unwrap();
        std::fs::write(res.join("values/strings.xml"), "<resources>en</resources>").unwrap();
        std::fs::write(res.join("values-fr/strings.xml"), "<resources>fr</resources>").unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/files/upload"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "project_id": "p1",
                "process": {"process_id": "u1", "status": "queued"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let context = test_context(&server, &temp);
        let report = context
            .run(SyncAction::UploadStrings {
                languages: vec!["en".to_string(), "fr".to_string()],
                resources_dir: res.clone(),
            })
            .await
            .unwrap();

        match report {
            SyncReport::Uploaded { uploads } => {
                assert_eq!(uploads.len(), 2);
                assert_eq!(uploads[1].path, res.join("values-fr/strings.xml"));
                assert_eq!(uploads[0].process_id.as_deref(), Some("u1"));
            }
            other => panic!("unexpected report: {:?}", other),
        }

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[1].body).unwrap();
        assert_eq!(body["lang_iso"], "fr");
        assert_eq!(body["filename"], "strings.xml");
        assert_eq!(
            BASE64.decode(body["data"].as_str().unwrap()).unwrap(),
            b"<resources>fr</resources>"
        );
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start().await;
        let context = test_context(&server, &temp);

        let err = context
            .run(SyncAction::UploadStrings {
                languages: vec!["de".to_string()],
                resources_dir: temp.path().join("res"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Io(_)));
    }
}
