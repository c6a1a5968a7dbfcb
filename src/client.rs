use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::KieConfig;
use crate::error::{KieError, Result};
use crate::types::{GeneratedImage, GenerationRequest, TaskState, TaskStatus};

/// Response envelope wrapped around every KIE.ai API payload.
///
/// `code == 200` signals acceptance; any other value means the request was
/// rejected and `msg` carries the reason.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskData {
    #[serde(default)]
    task_id: Option<String>,
}

/// Async client for the KIE.ai image generation API.
///
/// Generation is task-based: [`create_task`](KieClient::create_task) submits
/// a job and returns an opaque id, [`wait_for_completion`](KieClient::wait_for_completion)
/// polls the query endpoint until the task reaches a terminal state, and
/// [`download`](KieClient::download) fetches the resulting artifact. The
/// [`generate`](KieClient::generate) method runs the whole sequence.
///
/// The client is cheap to clone; concurrent calls share only the immutable
/// config and reqwest's connection pool.
///
/// # Example
/// ```no_run
/// use kie_image_rs::{GenerationRequest, KieClient, KieConfig};
///
/// # async fn example() -> kie_image_rs::Result<()> {
/// let client = KieClient::new(KieConfig::new("kie-api-key"))?;
/// let image = client.generate(&GenerationRequest::new("a cat in space")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KieClient {
    http: Client,
    config: KieConfig,
    cancellation: Option<Arc<AtomicBool>>,
}

impl KieClient {
    /// Create a client from a config. Fails fast if the config carries no
    /// usable credential.
    pub fn new(config: KieConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: Client::new(),
            config,
            cancellation: None,
        })
    }

    /// Use a custom `reqwest::Client` (for connection pooling, timeouts, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Set a cancellation flag checked on every poll iteration. Setting the
    /// flag aborts [`wait_for_completion`](KieClient::wait_for_completion)
    /// with [`KieError::Cancelled`] without waiting for the deadline.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(cancel);
        self
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &KieConfig {
        &self.config
    }

    fn check_cancelled(&self) -> Result<()> {
        if let Some(ref cancel) = self.cancellation {
            if cancel.load(Ordering::Relaxed) {
                return Err(KieError::Cancelled);
            }
        }
        Ok(())
    }

    // ── Health ──────────────────────────────────────────────────────

    /// Check whether the KIE.ai API is reachable.
    ///
    /// Sends a minimal create-task probe. Both 200 and 400 count as
    /// reachable; 400 means the endpoint answered and rejected the probe
    /// payload. Transport failures log a warning and report `false`.
    pub async fn health(&self) -> bool {
        let body = serde_json::json!({
            "model": "google/nano-banana",
            "input": {
                "prompt": "test",
                "output_format": "png",
                "image_size": "auto",
            }
        });

        let sent = self
            .http
            .post(self.config.create_task_url())
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .json(&body)
            .send()
            .await;

        match sent {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let reachable = status == 200 || status == 400;
                if !reachable {
                    warn!(status, "KIE.ai endpoint returned unexpected status");
                }
                reachable
            }
            Err(e) => {
                warn!(error = %e, "KIE.ai endpoint probe failed");
                false
            }
        }
    }

    // ── Task creation ───────────────────────────────────────────────

    /// Submit a generation task. Returns the opaque task id assigned by
    /// the service.
    ///
    /// Pre-flight checks run before any network call: an empty prompt is
    /// rejected with [`KieError::InvalidRequest`], and an edit-model
    /// request with [`KieError::Unsupported`] (the API has no editing
    /// capability, so the request would be doomed). Other field values
    /// pass through verbatim; the remote rejects invalid combinations.
    pub async fn create_task(&self, request: &GenerationRequest) -> Result<String> {
        if request.prompt.trim().is_empty() {
            return Err(KieError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }
        if request.model.is_edit() {
            return Err(KieError::Unsupported(
                "the KIE.ai API only supports text-to-image generation".to_string(),
            ));
        }

        let body = serde_json::json!({
            "model": request.model.as_str(),
            "input": {
                "prompt": request.prompt,
                "output_format": request.output_format.as_str(),
                "image_size": request.image_size.as_str(),
            }
        });

        let resp = self
            .http
            .post(self.config.create_task_url())
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .map_err(|e| KieError::Network {
                context: format!(
                    "Cannot reach KIE.ai at {} \u{2014} is the endpoint correct?",
                    self.config.base_url
                ),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(KieError::Http {
                stage: "create task",
                status,
                body: body_text,
            });
        }

        let text = resp.text().await.map_err(|e| KieError::Network {
            context: "Failed to read create-task response".to_string(),
            source: e,
        })?;
        let envelope: Envelope<CreateTaskData> = serde_json::from_str(&text)
            .map_err(|e| KieError::Protocol(format!("undecodable create-task response: {}", e)))?;

        if envelope.code != 200 {
            return Err(KieError::Api(
                envelope.msg.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let task_id = envelope
            .data
            .and_then(|d| d.task_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                KieError::Protocol("create-task response missing taskId".to_string())
            })?;

        info!(task_id = %task_id, "created KIE.ai task");
        Ok(task_id)
    }

    // ── Status query ────────────────────────────────────────────────

    /// Fetch a fresh status snapshot for a task.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let resp = self
            .http
            .get(self.config.query_task_url())
            .query(&[("taskId", task_id)])
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| KieError::Network {
                context: format!("Failed to query task {} status", task_id),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(KieError::Http {
                stage: "query task",
                status,
                body: body_text,
            });
        }

        let text = resp.text().await.map_err(|e| KieError::Network {
            context: "Failed to read task status response".to_string(),
            source: e,
        })?;
        let envelope: Envelope<TaskStatus> = serde_json::from_str(&text)
            .map_err(|e| KieError::Protocol(format!("undecodable task status response: {}", e)))?;

        if envelope.code != 200 {
            return Err(KieError::Api(
                envelope.msg.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let status = envelope.data.ok_or_else(|| {
            KieError::Protocol("task status response missing data".to_string())
        })?;

        debug!(task_id = %task_id, state = %status.state, "task status");
        Ok(status)
    }

    // ── Completion waiting ──────────────────────────────────────────

    /// Poll the query endpoint until the task reaches a terminal state,
    /// using the config's deadline and poll interval.
    pub async fn wait_for_completion(&self, task_id: &str) -> Result<TaskStatus> {
        self.wait_for_completion_with(task_id, self.config.max_wait, self.config.poll_interval)
            .await
    }

    /// Poll the query endpoint with an explicit deadline and poll interval.
    ///
    /// A task is assumed pending immediately after submission, so the first
    /// query happens right away. A `Failed` snapshot aborts immediately
    /// with [`KieError::TaskFailed`]; query failures propagate as-is rather
    /// than being swallowed by the loop. Reaching the deadline while still
    /// pending yields [`KieError::Timeout`].
    pub async fn wait_for_completion_with(
        &self,
        task_id: &str,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Result<TaskStatus> {
        let start = tokio::time::Instant::now();
        let mut last_state = TaskState::Pending;

        while start.elapsed() < max_wait {
            self.check_cancelled()?;

            let status = self.task_status(task_id).await?;
            last_state = status.task_state();

            match last_state {
                TaskState::Succeeded => {
                    info!(task_id = %task_id, "task completed");
                    return Ok(status);
                }
                TaskState::Failed => {
                    let message = status
                        .fail_msg
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return Err(KieError::TaskFailed {
                        task_id: task_id.to_string(),
                        message,
                    });
                }
                TaskState::Pending => {
                    if status.state != "waiting" {
                        warn!(task_id = %task_id, state = %status.state, "unrecognized task state, still polling");
                    }
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }

        Err(KieError::Timeout {
            task_id: task_id.to_string(),
            waited: start.elapsed(),
            last_state,
        })
    }

    // ── Artifact download ───────────────────────────────────────────

    /// Download a result artifact by its locator URL. Returns raw bytes;
    /// no content-type validation is performed.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| KieError::Network {
                context: format!("Failed to fetch artifact from {}", url),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(KieError::Http {
                stage: "download",
                status: resp.status().as_u16(),
                body: format!("Failed to fetch artifact from {}", url),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| KieError::Network {
            context: "Failed to read artifact bytes".to_string(),
            source: e,
        })?;

        info!(bytes = bytes.len(), "downloaded artifact");
        Ok(bytes.to_vec())
    }

    // ── Generation ──────────────────────────────────────────────────

    /// Generate an image: submit the task, poll until terminal, resolve
    /// the result locators, and download the first one.
    ///
    /// Stages run with no retries; the first failure short-circuits the
    /// call and is returned as-is.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let task_id = self.create_task(request).await?;
        let status = self.wait_for_completion(&task_id).await?;
        let urls = status.result_urls()?;

        let url = urls.into_iter().next().ok_or_else(|| {
            KieError::Protocol("no result locators in result document".to_string())
        })?;
        let bytes = self.download(&url).await?;

        Ok(GeneratedImage { bytes, url })
    }

    /// Generate an image from a bare prompt using the config's default
    /// output format and size.
    pub async fn generate_prompt(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = GenerationRequest::new(prompt)
            .output_format(self.config.default_output_format)
            .image_size(self.config.default_image_size);
        self.generate(&request).await
    }

    /// Edit an existing image. **Always fails**: the KIE.ai API has no
    /// image-editing capability, so this returns
    /// [`KieError::Unsupported`] immediately without touching the network.
    /// It exists to give callers who expect editing a discoverable, typed
    /// failure instead of silent misbehavior.
    pub async fn edit_image(&self, _request: &GenerationRequest) -> Result<GeneratedImage> {
        Err(KieError::Unsupported(
            "the KIE.ai API only supports text-to-image generation; use generate instead"
                .to_string(),
        ))
    }
}

// ── Default client ──────────────────────────────────────────────────

static DEFAULT_CLIENT: OnceLock<KieClient> = OnceLock::new();

/// Get or lazily create the process-wide default client.
///
/// The first call constructs the client from `config`; later calls return
/// the existing instance and ignore their argument. Construct [`KieClient`]
/// values directly when distinct configurations are needed.
pub fn default_client(config: KieConfig) -> Result<&'static KieClient> {
    if let Some(client) = DEFAULT_CLIENT.get() {
        return Ok(client);
    }
    let client = KieClient::new(config)?;
    Ok(DEFAULT_CLIENT.get_or_init(|| client))
}
