//! Restyle a photo with the first built-in style preset.
//!
//! Run with: `cargo run --example fuse_style -- <photo.jpg>`
//!
//! Requires `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) environment variable.

use stylefuse::{Gallery, GeminiService, HttpImageSource, Orchestrator};

#[tokio::main]
async fn main() -> stylefuse::Result<()> {
    let subject = std::env::args()
        .nth(1)
        .expect("Usage: fuse_style <photo.jpg>");

    let (orchestrator, mut session) = Orchestrator::start(
        GeminiService::builder().build(),
        HttpImageSource::new(),
        Gallery::builtin(),
    );

    orchestrator.load_subject(&mut session, &subject).await?;
    orchestrator.toggle_reference(&mut session, 0).await?;
    orchestrator.submit(&mut session).await?;

    let path = session.export(".")?;
    println!("Fused image saved to {}", path.display());

    Ok(())
}
