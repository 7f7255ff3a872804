//! Client for the Lokalise API v2.
//!
//! [`RemoteMetadataClient`] is the seam the reconciler, the export poller and
//! the sync actions talk to; [`LokaliseClient`] implements it over HTTP.
//!
//! Every response body must be a JSON object. Anything else is a transport
//! error regardless of status code. An object carrying an `error` member, or
//! any non-2xx status, is an API error surfaced with its code and message.

mod types;

pub use types::{
    CreateKeysResponse, CreateLanguagesResponse, ExportRequest, FileUpload, ItemError, KeyName,
    KeyUpdate, ListKeysResponse, NewKey, ProcessDetails, ProcessInfo, ProcessResponse, RemoteKey,
    RemoteTranslation, StartExportResponse, TranslationUpdate, UploadResponse,
};

use crate::export::AsyncJob;
use crate::{MetadataError, Result};
use async_trait::async_trait;
use locsync_core::{ApiConfig, ApiCredentials};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Header carrying the API token.
pub const API_TOKEN_HEADER: &str = "X-Api-Token";

/// Page size used for key listings.
const KEY_LIST_LIMIT: u32 = 5000;

/// Remote operations used by locsync.
#[async_trait]
pub trait RemoteMetadataClient: Send + Sync {
    /// Creates keys in bulk. Per-key failures are reported, not raised.
    async fn create_keys(&self, keys: &[NewKey]) -> Result<CreateKeysResponse>;

    /// Lists keys filtered by name.
    async fn list_keys(&self, names: &[String], include_translations: bool)
        -> Result<Vec<RemoteKey>>;

    /// Sets translations on existing keys in bulk.
    async fn update_keys(&self, updates: &[KeyUpdate]) -> Result<()>;

    /// Adds languages (service form) to the project.
    async fn create_languages(&self, codes: &[String]) -> Result<CreateLanguagesResponse>;

    /// Starts an asynchronous export and returns its process id.
    async fn start_export(&self, request: &ExportRequest) -> Result<String>;

    /// Reads the current state of a process.
    async fn process(&self, process_id: &str) -> Result<AsyncJob>;

    /// Uploads a translation file; returns the queued process id if any.
    async fn upload_file(&self, upload: &FileUpload) -> Result<Option<String>>;
}

/// HTTP client bound to one project.
pub struct LokaliseClient {
    client: Client,
    base_url: String,
    credentials: ApiCredentials,
}

impl LokaliseClient {
    /// Creates a client for the given project.
    pub fn new(credentials: ApiCredentials, api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(api.timeout())
            .build()
            .map_err(|e| MetadataError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Project the client is bound to.
    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}{}",
            self.base_url, self.credentials.project_id, path
        )
    }

    /// Sends a request and returns the response body as a JSON object.
    async fn send(&self, request: RequestBuilder) -> Result<Map<String, Value>> {
        let response = request
            .header(API_TOKEN_HEADER, &self.credentials.api_token)
            .send()
            .await
            .map_err(|e| MetadataError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::Transport(format!("Failed to read response: {}", e)))?;

        let object = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(object)) => object,
            _ => {
                return Err(MetadataError::Transport(format!(
                    "Bad response ({}): {}",
                    status,
                    truncate_body(&body)
                )))
            }
        };

        if let Some(error) = object.get("error") {
            return Err(api_error(error, status.as_u16()));
        }

        if !status.is_success() {
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| truncate_body(&body));
            return Err(MetadataError::Api {
                code: i64::from(status.as_u16()),
                message,
            });
        }

        Ok(object)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        debug!("API GET request: {}", url);
        let object = self.send(self.client.get(&url).query(query)).await?;
        decode(object)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!("API POST request: {}", url);
        let object = self.send(self.client.post(&url).json(body)).await?;
        decode(object)
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!("API PUT request: {}", url);
        let object = self.send(self.client.put(&url).json(body)).await?;
        decode(object)
    }
}

fn decode<T: DeserializeOwned>(object: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(object))
        .map_err(|e| MetadataError::Serialization(format!("Unexpected response shape: {}", e)))
}

fn api_error(error: &Value, status: u16) -> MetadataError {
    let code = error
        .get("code")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| i64::from(status));
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    MetadataError::Api { code, message }
}

fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() > LIMIT {
        format!("{}...", body.chars().take(LIMIT).collect::<String>())
    } else {
        body.to_string()
    }
}

#[derive(Serialize)]
struct KeysBody<'a, T> {
    keys: &'a [T],
}

#[derive(Serialize)]
struct LanguagesBody {
    languages: Vec<NewLanguage>,
}

#[derive(Serialize)]
struct NewLanguage {
    lang_iso: String,
}

#[async_trait]
impl RemoteMetadataClient for LokaliseClient {
    async fn create_keys(&self, keys: &[NewKey]) -> Result<CreateKeysResponse> {
        let response: CreateKeysResponse = self.post("/keys", &KeysBody { keys }).await?;
        for error in &response.errors {
            warn!(code = ?error.code, "key not created: {}", error.message);
        }
        Ok(response)
    }

    async fn list_keys(
        &self,
        names: &[String],
        include_translations: bool,
    ) -> Result<Vec<RemoteKey>> {
        let query = [
            ("filter_keys", names.join(",")),
            (
                "include_translations",
                if include_translations { "1" } else { "0" }.to_string(),
            ),
            ("limit", KEY_LIST_LIMIT.to_string()),
        ];
        let response: ListKeysResponse = self.get("/keys", &query).await?;
        Ok(response.keys)
    }

    async fn update_keys(&self, updates: &[KeyUpdate]) -> Result<()> {
        let _: Value = self.put("/keys", &KeysBody { keys: updates }).await?;
        Ok(())
    }

    async fn create_languages(&self, codes: &[String]) -> Result<CreateLanguagesResponse> {
        let body = LanguagesBody {
            languages: codes
                .iter()
                .map(|code| NewLanguage {
                    lang_iso: code.clone(),
                })
                .collect(),
        };
        self.post("/languages", &body).await
    }

    async fn start_export(&self, request: &ExportRequest) -> Result<String> {
        let response: StartExportResponse = self.post("/files/async-download", request).await?;
        response
            .process_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MetadataError::Start("response has no process_id".to_string()))
    }

    async fn process(&self, process_id: &str) -> Result<AsyncJob> {
        let response: ProcessResponse = self
            .get(&format!("/processes/{}", process_id), &[])
            .await?;
        Ok(AsyncJob::from(response.process))
    }

    async fn upload_file(&self, upload: &FileUpload) -> Result<Option<String>> {
        let response: UploadResponse = self.post("/files/upload", upload).await?;
        Ok(response.process.map(|p| p.process_id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Platform;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    pub(crate) fn test_client(server: &MockServer) -> LokaliseClient {
        let credentials = ApiCredentials {
            api_token: "test-token".to_string(),
            project_id: "p1".to_string(),
        };
        let api = ApiConfig {
            base_url: server.uri(),
            timeout_secs: 5,
        };
        LokaliseClient::new(credentials, &api).unwrap()
    }

    #[tokio::test]
    async fn test_create_keys_tolerates_item_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/keys"))
            .and(header(API_TOKEN_HEADER, "test-token"))
            .and(body_json(json!({
                "keys": [{"key_name": "a.b", "platforms": ["other"]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "project_id": "p1",
                "keys": [],
                "errors": [{"message": "This key name is already taken", "code": 400, "key_name": {"other": "a.b"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .create_keys(&[NewKey::new("a.b", Platform::Other)])
            .await
            .unwrap();
        assert_eq!(response.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_list_keys_sends_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/keys"))
            .and(query_param("filter_keys", "a.b,c.d"))
            .and(query_param("include_translations", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [
                    {"key_id": 1, "key_name": {"other": "a.b"}, "translations": [{"language_iso": "en", "translation": "Hi"}]},
                    {"key_id": 2, "key_name": "c.d"}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let keys = client
            .list_keys(&["a.b".to_string(), "c.d".to_string()], true)
            .await
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].translations[0].translation.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_error_object_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/keys"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid `X-Api-Token` header", "code": 401}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.list_keys(&[], false).await.unwrap_err();
        match err {
            MetadataError::Api { code, message } => {
                assert_eq!(code, 401);
                assert_eq!(message, "Invalid `X-Api-Token` header");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_object_with_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "Not allowed", "code": 403}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.create_languages(&["de".to_string()]).await.unwrap_err();
        assert!(matches!(err, MetadataError::Api { code: 403, .. }));
    }

    #[tokio::test]
    async fn test_non_object_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/projects/p1/keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/keys"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.update_keys(&[]).await.unwrap_err();
        assert!(matches!(err, MetadataError::Transport(_)));

        let err = client.list_keys(&[], false).await.unwrap_err();
        assert!(matches!(err, MetadataError::Transport(_)));
    }

    #[tokio::test]
    async fn test_start_export_requires_process_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/files/async-download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"project_id": "p1"})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .start_export(&ExportRequest::ios_strings())
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Start(_)));
    }

    #[tokio::test]
    async fn test_upload_file_returns_process_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/files/upload"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "project_id": "p1",
                "process": {"process_id": "u1", "type": "file-import", "status": "queued", "message": ""}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let upload = FileUpload {
            filename: "strings.xml".to_string(),
            data: "PHJlc291cmNlcy8+".to_string(),
            lang_iso: "en".to_string(),
            convert_placeholders: true,
            slashn_to_linebreak: true,
        };
        let process_id = client.upload_file(&upload).await.unwrap();
        assert_eq!(process_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
