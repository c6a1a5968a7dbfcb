//! Generate a single image from a text prompt.
//!
//! Expects a KIE.ai API key as the first argument.
//!
//! ```sh
//! cargo run --example simple_generation -- <api-key>
//! ```

use kie_image_rs::{GenerationRequest, ImageSize, KieClient, KieConfig, OutputFormat};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::args()
        .nth(1)
        .ok_or("usage: simple_generation <api-key>")?;

    let client = KieClient::new(KieConfig::new(api_key))?;

    // Check connection
    if !client.health().await {
        eprintln!("KIE.ai is not responding");
        return Ok(());
    }
    println!("KIE.ai is online");

    let request = GenerationRequest::new("a beautiful sunset over mountains")
        .output_format(OutputFormat::Png)
        .image_size(ImageSize::Landscape16x9);

    let image = client.generate(&request).await?;
    println!("Downloaded {} bytes from {}", image.bytes.len(), image.url);

    std::fs::write("sunset.png", &image.bytes)?;
    println!("Saved: sunset.png");

    Ok(())
}
