use std::time::Duration;

use thiserror::Error;

use crate::types::TaskState;

/// Errors returned by KIE.ai operations.
#[derive(Error, Debug)]
pub enum KieError {
    /// The client configuration was unusable (e.g. missing API key).
    /// Raised before any network call.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The request failed local pre-flight validation. Raised before any
    /// network call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// KIE.ai returned a non-success HTTP status.
    #[error("KIE.ai returned HTTP {status} during {stage}: {body}")]
    Http {
        stage: &'static str,
        status: u16,
        body: String,
    },

    /// The HTTP exchange succeeded but the response envelope carried a
    /// non-200 embedded code — KIE.ai rejected the request itself.
    #[error("KIE.ai API error: {0}")]
    Api(String),

    /// The response was well-formed HTTP but its payload violated the
    /// expected schema (missing fields, malformed nested JSON, empty
    /// result list).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The remote service reported the task as failed.
    #[error("Task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// The deadline passed while the task was still in a non-terminal state.
    #[error("Task {task_id} timed out after {waited:?} (last state: {last_state})")]
    Timeout {
        task_id: String,
        waited: Duration,
        last_state: TaskState,
    },

    /// Image editing was requested. The KIE.ai API only supports
    /// text-to-image generation.
    #[error("Image editing is not supported: {0}")]
    Unsupported(String),

    /// Cancellation was requested while waiting for a task.
    #[error("Generation was cancelled")]
    Cancelled,

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, KieError>;
