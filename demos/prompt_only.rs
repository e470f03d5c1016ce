//! Restyle a photo from a text prompt alone, no reference image.
//!
//! Run with: `cargo run --example prompt_only -- <photo.jpg> "as a stained glass window"`
//!
//! Requires `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) environment variable.

use stylefuse::{Gallery, GeminiModel, GeminiService, HttpImageSource, Orchestrator};

#[tokio::main]
async fn main() -> stylefuse::Result<()> {
    let mut args = std::env::args().skip(1);
    let subject = args.next().expect("Usage: prompt_only <photo.jpg> <prompt>");
    let prompt = args.next().unwrap_or_else(|| "as a watercolor painting".into());

    let service = GeminiService::builder()
        .model(GeminiModel::NanoBananaPro)
        .build();
    let (orchestrator, mut session) =
        Orchestrator::start(service, HttpImageSource::new(), Gallery::builtin());

    orchestrator.load_subject(&mut session, &subject).await?;
    session.set_prompt(prompt);

    if let Err(e) = orchestrator.submit(&mut session).await {
        eprintln!("{}", session.view().error().unwrap_or("generation failed"));
        return Err(e);
    }

    let path = session.export(".")?;
    println!("Saved {}", path.display());
    Ok(())
}
