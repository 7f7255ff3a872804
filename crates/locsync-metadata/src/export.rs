//! Asynchronous export tracking.
//!
//! An export is started with one call and then polled until the service
//! reports a terminal status or the attempt budget runs out:
//!
//! ```text
//! Started ──▶ Polling ──▶ Finished
//!                │ ▲ ──▶ Failed
//!                └─┘ ──▶ Cancelled
//!                    ──▶ TimedOut
//! ```
//!
//! `TimedOut` means the client stopped waiting, not that the job failed.

use crate::client::{ExportRequest, ProcessInfo, RemoteMetadataClient};
use crate::{JobFailure, MetadataError, Result};
use locsync_core::ExportConfig;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Status of a server-side job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Maps a status string from the service. Intermediate and unknown
    /// statuses count as running.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "queued" => JobStatus::Queued,
            "finished" => JobStatus::Finished,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Running,
        }
    }

    /// Whether the job will not change any more.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A server-side job as seen by one status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncJob {
    pub id: String,
    pub status: JobStatus,
    /// Only meaningful when the status is finished.
    pub result_url: Option<String>,
    pub message: Option<String>,
}

impl From<ProcessInfo> for AsyncJob {
    fn from(process: ProcessInfo) -> Self {
        Self {
            id: process.process_id,
            status: JobStatus::from_wire(&process.status),
            result_url: process
                .details
                .and_then(|d| d.download_url)
                .filter(|url| !url.is_empty()),
            message: process.message.filter(|m| !m.is_empty()),
        }
    }
}

/// Attempt budget and spacing for status reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Status reads before giving up (at least one).
    pub max_attempts: u32,
    /// Wait before every read except the first.
    pub delay: Duration,
}

impl PollConfig {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl From<&ExportConfig> for PollConfig {
    fn from(config: &ExportConfig) -> Self {
        Self::new(config.max_attempts, config.delay())
    }
}

/// State of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Started { process_id: String },
    Polling { process_id: String, attempts: u32 },
    Finished { process_id: String, url: String },
    Failed { process_id: String, message: String },
    Cancelled { process_id: String, message: String },
    TimedOut { process_id: String, attempts: u32 },
}

impl ExportState {
    /// Process the state refers to.
    pub fn process_id(&self) -> &str {
        match self {
            ExportState::Started { process_id }
            | ExportState::Polling { process_id, .. }
            | ExportState::Finished { process_id, .. }
            | ExportState::Failed { process_id, .. }
            | ExportState::Cancelled { process_id, .. }
            | ExportState::TimedOut { process_id, .. } => process_id,
        }
    }

    /// Whether no further reads will happen.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ExportState::Started { .. } | ExportState::Polling { .. }
        )
    }

    /// Applies one status read. Terminal states are returned unchanged.
    pub fn advance(self, job: &AsyncJob, max_attempts: u32) -> ExportState {
        let (process_id, attempts) = match self {
            ExportState::Started { process_id } => (process_id, 1),
            ExportState::Polling {
                process_id,
                attempts,
            } => (process_id, attempts + 1),
            terminal => return terminal,
        };

        let message = || job.message.clone().unwrap_or_default();

        match job.status {
            JobStatus::Finished => match &job.result_url {
                Some(url) => ExportState::Finished {
                    process_id,
                    url: url.clone(),
                },
                None => ExportState::TimedOut {
                    process_id,
                    attempts,
                },
            },
            JobStatus::Failed => ExportState::Failed {
                process_id,
                message: message(),
            },
            JobStatus::Cancelled => ExportState::Cancelled {
                process_id,
                message: message(),
            },
            JobStatus::Queued | JobStatus::Running if attempts >= max_attempts => {
                ExportState::TimedOut {
                    process_id,
                    attempts,
                }
            }
            JobStatus::Queued | JobStatus::Running => ExportState::Polling {
                process_id,
                attempts,
            },
        }
    }

    /// The bundle URL, or the reason there is none.
    pub fn into_result(self) -> Result<String> {
        match self {
            ExportState::Finished { url, .. } => Ok(url),
            ExportState::Failed {
                process_id,
                message,
            } => Err(MetadataError::Job(JobFailure::Failed {
                process_id,
                message,
            })),
            ExportState::Cancelled {
                process_id,
                message,
            } => Err(MetadataError::Job(JobFailure::Cancelled {
                process_id,
                message,
            })),
            ExportState::TimedOut {
                process_id,
                attempts,
            } => Err(MetadataError::Job(JobFailure::TimedOut {
                process_id,
                attempts,
            })),
            ExportState::Started { process_id } | ExportState::Polling { process_id, .. } => {
                Err(MetadataError::Job(JobFailure::TimedOut {
                    process_id,
                    attempts: 0,
                }))
            }
        }
    }
}

/// Starts exports and waits for them.
pub struct AsyncExportPoller<'a, C: RemoteMetadataClient + ?Sized> {
    client: &'a C,
    config: PollConfig,
}

impl<'a, C: RemoteMetadataClient + ?Sized> AsyncExportPoller<'a, C> {
    pub fn new(client: &'a C, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Starts an export and polls it to a terminal state.
    pub async fn run(&self, request: &ExportRequest) -> Result<ExportState> {
        info!(format = %request.format, "starting export");
        let process_id = self.client.start_export(request).await?;
        debug!(process_id = %process_id, "export started");
        self.wait(process_id).await
    }

    /// Polls an already started process to a terminal state.
    pub async fn wait(&self, process_id: String) -> Result<ExportState> {
        let mut state = ExportState::Started { process_id };
        let mut reads = 0u32;

        while !state.is_terminal() {
            if reads > 0 && !self.config.delay.is_zero() {
                sleep(self.config.delay).await;
            }
            let job = self.client.process(state.process_id()).await?;
            reads += 1;
            debug!(
                process_id = %job.id,
                status = %job.status,
                attempt = reads,
                max_attempts = self.config.max_attempts,
                "export status"
            );
            state = state.advance(&job, self.config.max_attempts);
        }

        match &state {
            ExportState::Finished { process_id, .. } => {
                info!(process_id = %process_id, attempts = reads, "export finished")
            }
            ExportState::TimedOut { process_id, .. } => {
                warn!(process_id = %process_id, attempts = reads, "gave up waiting for export")
            }
            other => warn!(process_id = %other.process_id(), "export did not complete: {:?}", other),
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use crate::client::{CreateKeysResponse, CreateLanguagesResponse, FileUpload, KeyUpdate, NewKey, RemoteKey};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::time::Instant;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn job(status: JobStatus, url: Option<&str>) -> AsyncJob {
        AsyncJob {
            id: "p".to_string(),
            status,
            result_url: url.map(str::to_string),
            message: Some("details".to_string()),
        }
    }

    fn process_body(status: &str, url: Option<&str>) -> serde_json::Value {
        let details = match url {
            Some(url) => json!({"download_url": url}),
            None => json!({}),
        };
        json!({
            "project_id": "p1",
            "process": {"process_id": "x1", "type": "async-export", "status": status, "message": "", "details": details}
        })
    }

    async fn mount_start(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/projects/p1/files/async-download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"process_id": "x1"})),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(JobStatus::from_wire("pre_processing"), JobStatus::Running);
        assert_eq!(JobStatus::from_wire("post_processing"), JobStatus::Running);
        assert_eq!(JobStatus::from_wire("queued"), JobStatus::Queued);
        assert!(JobStatus::from_wire("cancelled").is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }

    #[test]
    fn test_advance_transitions() {
        let started = ExportState::Started {
            process_id: "p".to_string(),
        };
        let polling = started.clone().advance(&job(JobStatus::Running, None), 3);
        assert_eq!(
            polling,
            ExportState::Polling {
                process_id: "p".to_string(),
                attempts: 1
            }
        );

        let finished = polling
            .clone()
            .advance(&job(JobStatus::Finished, Some("https://x/b.zip")), 3);
        assert!(matches!(finished, ExportState::Finished { ref url, .. } if url == "https://x/b.zip"));

        let failed = polling.clone().advance(&job(JobStatus::Failed, None), 3);
        assert!(matches!(failed, ExportState::Failed { ref message, .. } if message == "details"));

        let cancelled = polling.advance(&job(JobStatus::Cancelled, None), 3);
        assert!(matches!(cancelled, ExportState::Cancelled { .. }));
    }

    #[test]
    fn test_finished_without_url_times_out() {
        let started = ExportState::Started {
            process_id: "p".to_string(),
        };
        let state = started.advance(&job(JobStatus::Finished, None), 3);
        assert!(matches!(state, ExportState::TimedOut { attempts: 1, .. }));
    }

    #[test]
    fn test_terminal_states_do_not_advance() {
        let failed = ExportState::Failed {
            process_id: "p".to_string(),
            message: "m".to_string(),
        };
        let next = failed.clone().advance(&job(JobStatus::Finished, Some("u")), 3);
        assert_eq!(next, failed);
    }

    #[test]
    fn test_into_result_distinguishes_timeout() {
        let timed_out = ExportState::TimedOut {
            process_id: "p".to_string(),
            attempts: 3,
        };
        match timed_out.into_result() {
            Err(MetadataError::Job(JobFailure::TimedOut { attempts, .. })) => assert_eq!(attempts, 3),
            other => panic!("unexpected: {:?}", other),
        }

        let cancelled = ExportState::Cancelled {
            process_id: "p".to_string(),
            message: "by user".to_string(),
        };
        assert!(matches!(
            cancelled.into_result(),
            Err(MetadataError::Job(JobFailure::Cancelled { .. }))
        ));
    }

    /// Reports a running export and records when each status read happens.
    #[derive(Default)]
    struct RunningExport {
        reads: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl RemoteMetadataClient for RunningExport {
        async fn create_keys(&self, _keys: &[NewKey]) -> Result<CreateKeysResponse> {
            unimplemented!()
        }

        async fn list_keys(&self, _names: &[String], _include_translations: bool) -> Result<Vec<RemoteKey>> {
            unimplemented!()
        }

        async fn update_keys(&self, _updates: &[KeyUpdate]) -> Result<()> {
            unimplemented!()
        }

        async fn create_languages(&self, _codes: &[String]) -> Result<CreateLanguagesResponse> {
            unimplemented!()
        }

        async fn start_export(&self, _request: &ExportRequest) -> Result<String> {
            Ok("x1".to_string())
        }

        async fn process(&self, process_id: &str) -> Result<AsyncJob> {
            self.reads.lock().unwrap().push(Instant::now());
            Ok(AsyncJob {
                id: process_id.to_string(),
                status: JobStatus::Running,
                result_url: None,
                message: None,
            })
        }

        async fn upload_file(&self, _upload: &FileUpload) -> Result<Option<String>> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_between_reads_only() {
        let client = RunningExport::default();
        let poller = AsyncExportPoller::new(&client, PollConfig::new(3, Duration::from_secs(2)));

        let started = Instant::now();
        let state = poller.run(&ExportRequest::ios_strings()).await.unwrap();
        assert!(matches!(state, ExportState::TimedOut { attempts: 3, .. }));

        let offsets: Vec<Duration> = client
            .reads
            .lock()
            .unwrap()
            .iter()
            .map(|read| read.duration_since(started))
            .collect();
        assert_eq!(
            offsets,
            vec![Duration::ZERO, Duration::from_secs(2), Duration::from_secs(4)]
        );
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_times_out_after_exact_attempt_budget() {
        let server = MockServer::start().await;
        mount_start(&server).await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/processes/x1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(process_body("running", None)))
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let poller = AsyncExportPoller::new(&client, PollConfig::new(3, Duration::ZERO));
        let state = poller.run(&ExportRequest::ios_strings()).await.unwrap();

        assert_eq!(
            state,
            ExportState::TimedOut {
                process_id: "x1".to_string(),
                attempts: 3
            }
        );
    }

    #[tokio::test]
    async fn test_stops_on_first_finished_read() {
        let server = MockServer::start().await;
        mount_start(&server).await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/processes/x1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(process_body(
                "finished",
                Some("https://s3.example.com/bundle.zip"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let poller = AsyncExportPoller::new(&client, PollConfig::new(5, Duration::ZERO));
        let state = poller.run(&ExportRequest::android_xml()).await.unwrap();

        assert_eq!(
            state.into_result().unwrap(),
            "https://s3.example.com/bundle.zip"
        );
    }

    #[tokio::test]
    async fn test_failed_job_stops_polling() {
        let server = MockServer::start().await;
        mount_start(&server).await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/processes/x1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(process_body("failed", None)))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let poller = AsyncExportPoller::new(&client, PollConfig::new(5, Duration::ZERO));
        let state = poller.run(&ExportRequest::ios_strings()).await.unwrap();
        assert!(matches!(state, ExportState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_status_read_error_is_fatal() {
        let server = MockServer::start().await;
        mount_start(&server).await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/processes/x1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "Not found", "code": 404}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let poller = AsyncExportPoller::new(&client, PollConfig::new(5, Duration::ZERO));
        let err = poller.run(&ExportRequest::ios_strings()).await.unwrap_err();
        assert!(matches!(err, MetadataError::Api { code: 404, .. }));
    }
}
