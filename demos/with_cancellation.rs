//! Cancel a generation while it is still polling.
//!
//! Expects a KIE.ai API key as the first argument. Submits a task, then
//! flips the cancellation flag from a second task after a few seconds —
//! the poll loop notices on its next iteration and returns `Cancelled`
//! without waiting for the full deadline.
//!
//! ```sh
//! cargo run --example with_cancellation -- <api-key>
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kie_image_rs::{GenerationRequest, KieClient, KieConfig, KieError};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::args()
        .nth(1)
        .ok_or("usage: with_cancellation <api-key>")?;

    let cancel = Arc::new(AtomicBool::new(false));
    let client = KieClient::new(KieConfig::new(api_key))?.with_cancellation(cancel.clone());

    let flag = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        println!("Requesting cancellation...");
        flag.store(true, Ordering::Relaxed);
    });

    let request = GenerationRequest::new("an extremely detailed city skyline at night");
    match client.generate(&request).await {
        Ok(image) => println!("Finished before cancellation: {} bytes", image.bytes.len()),
        Err(KieError::Cancelled) => println!("Generation was cancelled"),
        Err(e) => eprintln!("Generation failed: {}", e),
    }

    Ok(())
}
