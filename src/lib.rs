//! # kie-image-rs
//!
//! Async Rust client for the [KIE.ai](https://kie.ai) image generation API
//! (Google "Nano Banana" models) — task submission, status polling, and
//! artifact download.
//!
//! Generation is asynchronous on the KIE.ai side: creating a task returns
//! an opaque id, the service processes it out-of-band, and the client polls
//! the query endpoint until the task reaches a terminal state before
//! downloading the resulting image. [`KieClient::generate`] runs the whole
//! sequence; the individual stages are exposed for callers that need finer
//! control.
//!
//! Image editing is not supported by the backing service —
//! [`KieClient::edit_image`] exists only to fail with a typed
//! [`KieError::Unsupported`] error.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kie_image_rs::{GenerationRequest, ImageSize, KieClient, KieConfig, OutputFormat};
//!
//! # async fn example() -> kie_image_rs::Result<()> {
//! let client = KieClient::new(KieConfig::new("kie-api-key"))?;
//!
//! let request = GenerationRequest::new("a sunset over mountains")
//!     .output_format(OutputFormat::Png)
//!     .image_size(ImageSize::Landscape16x9);
//!
//! let image = client.generate(&request).await?;
//! std::fs::write("sunset.png", &image.bytes).unwrap();
//! println!("Downloaded from {}", image.url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod resolve;
pub mod types;

pub use client::{default_client, KieClient};
pub use config::KieConfig;
pub use error::{KieError, Result};
pub use types::{
    GeneratedImage, GenerationRequest, ImageSize, Model, OutputFormat, TaskState, TaskStatus,
};
