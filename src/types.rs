use serde::Deserialize;

use crate::error::{KieError, Result};
use crate::resolve;

/// Generation model offered by the KIE.ai API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    /// Text-to-image generation ("google/nano-banana").
    #[default]
    NanoBanana,
    /// Image editing ("google/nano-banana-edit"). Accepted by the request
    /// builder but always rejected at submission — the API has no editing
    /// capability.
    NanoBananaEdit,
}

impl Model {
    /// The model identifier sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::NanoBanana => "google/nano-banana",
            Model::NanoBananaEdit => "google/nano-banana-edit",
        }
    }

    /// Whether this is the (unsupported) editing model.
    pub fn is_edit(&self) -> bool {
        matches!(self, Model::NanoBananaEdit)
    }
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// The format label sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

/// Output aspect-ratio descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    /// Let the service pick ("auto").
    #[default]
    Auto,
    /// 1:1
    Square,
    /// 3:4
    Portrait3x4,
    /// 9:16
    Portrait9x16,
    /// 4:3
    Landscape4x3,
    /// 16:9
    Landscape16x9,
}

impl ImageSize {
    /// The size label sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Auto => "auto",
            ImageSize::Square => "1:1",
            ImageSize::Portrait3x4 => "3:4",
            ImageSize::Portrait9x16 => "9:16",
            ImageSize::Landscape4x3 => "4:3",
            ImageSize::Landscape16x9 => "16:9",
        }
    }
}

/// Description of one generation job. Immutable once built.
///
/// # Example
/// ```
/// use kie_image_rs::{GenerationRequest, ImageSize, OutputFormat};
///
/// let request = GenerationRequest::new("a cat in space")
///     .output_format(OutputFormat::Jpeg)
///     .image_size(ImageSize::Landscape16x9);
///
/// assert_eq!(request.prompt, "a cat in space");
/// ```
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: Model,
    pub output_format: OutputFormat,
    pub image_size: ImageSize,
    /// Reference image URLs. Only meaningful for the editing model, which
    /// is rejected at submission.
    pub reference_images: Vec<String>,
}

impl GenerationRequest {
    /// Create a request with a prompt and defaults for everything else
    /// (text-to-image model, PNG output, auto size).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: Model::default(),
            output_format: OutputFormat::default(),
            image_size: ImageSize::default(),
            reference_images: Vec::new(),
        }
    }

    /// Set the model.
    pub fn model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Set the output format.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the output size descriptor.
    pub fn image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }

    /// Add a reference image URL.
    pub fn reference_image(mut self, url: impl Into<String>) -> Self {
        self.reference_images.push(url.into());
        self
    }
}

/// Locally-classified lifecycle state of a remote task.
///
/// The remote reports free-form state labels. Only the literal labels
/// `"success"` and `"fail"` are terminal; every other label (including
/// `"waiting"` and anything this crate has never seen) classifies as
/// [`Pending`], so new remote vocabulary keeps the poll loop going instead
/// of erroring. The trade-off: a future terminal label unknown to this
/// mapping would poll until the deadline rather than stop early.
///
/// [`Pending`]: TaskState::Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The task has not reached a terminal state.
    Pending,
    /// The task finished and produced a result document.
    Succeeded,
    /// The task finished and the remote reported a failure message.
    Failed,
}

impl TaskState {
    /// Classify a raw remote state label.
    pub fn from_remote(label: &str) -> Self {
        match label {
            "success" => TaskState::Succeeded,
            "fail" => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }

    /// Whether polling stops at this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Snapshot of a task as reported by the query endpoint.
///
/// Each query produces a fresh snapshot; snapshots are never patched in
/// place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskStatus {
    /// Raw state label exactly as reported by the remote service.
    pub state: String,
    /// JSON-encoded result document, present once the task succeeded.
    pub result_json: Option<String>,
    /// Failure message, present once the task failed.
    pub fail_msg: Option<String>,
}

impl TaskStatus {
    /// Classify the raw remote label into the closed local state machine.
    pub fn task_state(&self) -> TaskState {
        TaskState::from_remote(&self.state)
    }

    /// Parse the nested result document into its ordered locator URLs.
    ///
    /// Fails with a protocol error if the document is absent, malformed,
    /// or carries no locators.
    pub fn result_urls(&self) -> Result<Vec<String>> {
        let doc = self.result_json.as_deref().ok_or_else(|| {
            KieError::Protocol("query response carried no result document".to_string())
        })?;
        resolve::result_urls(doc)
    }
}

/// A downloaded generation artifact.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Raw image bytes exactly as served by the result locator.
    pub bytes: Vec<u8>,
    /// The locator URL the bytes were downloaded from.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_wire_labels() {
        assert_eq!(Model::NanoBanana.as_str(), "google/nano-banana");
        assert_eq!(Model::NanoBananaEdit.as_str(), "google/nano-banana-edit");
        assert!(!Model::NanoBanana.is_edit());
        assert!(Model::NanoBananaEdit.is_edit());
    }

    #[test]
    fn format_and_size_wire_labels() {
        assert_eq!(OutputFormat::Png.as_str(), "png");
        assert_eq!(OutputFormat::Jpeg.as_str(), "jpeg");
        assert_eq!(ImageSize::Auto.as_str(), "auto");
        assert_eq!(ImageSize::Square.as_str(), "1:1");
        assert_eq!(ImageSize::Portrait3x4.as_str(), "3:4");
        assert_eq!(ImageSize::Portrait9x16.as_str(), "9:16");
        assert_eq!(ImageSize::Landscape4x3.as_str(), "4:3");
        assert_eq!(ImageSize::Landscape16x9.as_str(), "16:9");
    }

    #[test]
    fn request_builder_defaults() {
        let request = GenerationRequest::new("a sunset");
        assert_eq!(request.prompt, "a sunset");
        assert_eq!(request.model, Model::NanoBanana);
        assert_eq!(request.output_format, OutputFormat::Png);
        assert_eq!(request.image_size, ImageSize::Auto);
        assert!(request.reference_images.is_empty());
    }

    #[test]
    fn request_builder_overrides() {
        let request = GenerationRequest::new("edit this")
            .model(Model::NanoBananaEdit)
            .output_format(OutputFormat::Jpeg)
            .image_size(ImageSize::Portrait9x16)
            .reference_image("http://example.com/a.png")
            .reference_image("http://example.com/b.png");
        assert_eq!(request.model, Model::NanoBananaEdit);
        assert_eq!(request.output_format, OutputFormat::Jpeg);
        assert_eq!(request.image_size, ImageSize::Portrait9x16);
        assert_eq!(request.reference_images.len(), 2);
    }

    #[test]
    fn state_terminal_labels() {
        assert_eq!(TaskState::from_remote("success"), TaskState::Succeeded);
        assert_eq!(TaskState::from_remote("fail"), TaskState::Failed);
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
    }

    #[test]
    fn state_everything_else_is_pending() {
        for label in [
            "waiting",
            "queuing",
            "generating",
            "SUCCESS",
            "Fail",
            "succeeded",
            "failed",
            "",
            "done",
        ] {
            assert_eq!(TaskState::from_remote(label), TaskState::Pending, "{label:?}");
        }
    }

    #[test]
    fn state_random_labels_are_pending() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..200 {
            let len = rng.random_range(1..16);
            let label: String = (0..len)
                .map(|_| rng.random_range(b'a'..=b'z') as char)
                .collect();
            if label == "success" || label == "fail" {
                continue;
            }
            assert_eq!(TaskState::from_remote(&label), TaskState::Pending, "{label:?}");
        }
    }

    #[test]
    fn status_deserializes_wire_names() {
        let status: TaskStatus = serde_json::from_str(
            r#"{"state":"success","resultJson":"{\"resultUrls\":[\"http://x/img.png\"]}"}"#,
        )
        .unwrap();
        assert_eq!(status.task_state(), TaskState::Succeeded);
        assert_eq!(
            status.result_urls().unwrap(),
            vec!["http://x/img.png".to_string()]
        );
    }

    #[test]
    fn status_tolerates_missing_fields() {
        let status: TaskStatus = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(status.task_state(), TaskState::Pending);
        assert!(status.fail_msg.is_none());
        assert!(status.result_urls().is_err());
    }

    #[test]
    fn status_carries_failure_message() {
        let status: TaskStatus =
            serde_json::from_str(r#"{"state":"fail","failMsg":"quota exceeded"}"#).unwrap();
        assert_eq!(status.task_state(), TaskState::Failed);
        assert_eq!(status.fail_msg.as_deref(), Some("quota exceeded"));
    }
}
