use std::time::Duration;

use crate::error::{KieError, Result};
use crate::types::{ImageSize, OutputFormat};

/// Default base endpoint of the KIE.ai API.
pub const DEFAULT_BASE_URL: &str = "https://api.kie.ai/api/v1";

/// Configuration for a [`KieClient`](crate::KieClient).
///
/// Only the API key is required; everything else has working defaults.
/// Construct as many configs with distinct credentials as needed — the
/// process-wide default client (see
/// [`default_client`](crate::default_client)) is a convenience, not a
/// requirement.
///
/// The crate never reads environment variables; the embedding application
/// resolves credentials and passes them in here explicitly.
#[derive(Debug, Clone)]
pub struct KieConfig {
    /// KIE.ai API key, sent as a bearer token on every API call.
    pub api_key: String,

    /// Base API endpoint. Trailing slashes are normalized away.
    pub base_url: String,

    /// Path of the task-creation endpoint.
    pub create_task_path: String,

    /// Path of the task-query endpoint.
    pub query_task_path: String,

    /// Output format used when a request does not specify one.
    pub default_output_format: OutputFormat,

    /// Image size used when a request does not specify one.
    pub default_image_size: ImageSize,

    /// Deadline for [`wait_for_completion`](crate::KieClient::wait_for_completion).
    pub max_wait: Duration,

    /// Delay between consecutive status queries while polling.
    pub poll_interval: Duration,
}

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

impl KieConfig {
    /// Create a config with the given API key and defaults for everything
    /// else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            create_task_path: "/jobs/createTask".to_string(),
            query_task_path: "/jobs/recordInfo".to_string(),
            default_output_format: OutputFormat::Png,
            default_image_size: ImageSize::Auto,
            max_wait: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }

    /// Point the client at a different base endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize(base_url.into());
        self
    }

    /// Set the default output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.default_output_format = format;
        self
    }

    /// Set the default image size.
    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.default_image_size = size;
        self
    }

    /// Set the polling deadline.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Set the delay between status queries.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(KieError::Config("API key must not be empty".to_string()));
        }
        Ok(())
    }

    pub(crate) fn create_task_url(&self) -> String {
        format!("{}{}", self.base_url, self.create_task_path)
    }

    pub(crate) fn query_task_url(&self) -> String {
        format!("{}{}", self.base_url, self.query_task_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service() {
        let config = KieConfig::new("key");
        assert_eq!(config.base_url, "https://api.kie.ai/api/v1");
        assert_eq!(config.create_task_path, "/jobs/createTask");
        assert_eq!(config.query_task_path, "/jobs/recordInfo");
        assert_eq!(config.default_output_format, OutputFormat::Png);
        assert_eq!(config.default_image_size, ImageSize::Auto);
        assert_eq!(config.max_wait, Duration::from_secs(120));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn base_url_is_normalized() {
        let config = KieConfig::new("key").with_base_url("http://localhost:9000///");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(
            config.create_task_url(),
            "http://localhost:9000/jobs/createTask"
        );
        assert_eq!(
            config.query_task_url(),
            "http://localhost:9000/jobs/recordInfo"
        );
    }

    #[test]
    fn empty_api_key_fails_validation() {
        assert!(KieConfig::new("").validate().is_err());
        assert!(KieConfig::new("   ").validate().is_err());
        assert!(KieConfig::new("key").validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let config = KieConfig::new("key")
            .with_output_format(OutputFormat::Jpeg)
            .with_image_size(ImageSize::Square)
            .with_max_wait(Duration::from_secs(30))
            .with_poll_interval(Duration::from_millis(500));
        assert_eq!(config.default_output_format, OutputFormat::Jpeg);
        assert_eq!(config.default_image_size, ImageSize::Square);
        assert_eq!(config.max_wait, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }
}
