//! CLI for stylefuse - restyle a photo with Gemini.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stylefuse::{
    FusionService, Gallery, GeminiModel, GeminiService, HttpImageSource, Orchestrator,
    ReferenceToggle, DOWNLOAD_FILE_NAME,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stylefuse")]
#[command(about = "Fuse a photo with a style reference image via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a restyled image from a subject photo
    Fuse(FuseArgs),

    /// List the style presets
    Styles(GalleryArgs),

    /// Check that the API key and model are usable
    Check(ServiceArgs),
}

#[derive(Args)]
struct FuseArgs {
    /// The subject photo
    subject: PathBuf,

    /// Style preset name (see `stylefuse styles`)
    #[arg(short, long, conflicts_with = "style_index")]
    style: Option<String>,

    /// Style preset position in the gallery
    #[arg(long)]
    style_index: Option<usize>,

    /// Free-text instruction
    #[arg(short, long, default_value = "")]
    prompt: String,

    /// Directory the result is written to (as fused-image.png)
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    gallery: GalleryArgs,

    #[command(flatten)]
    service: ServiceArgs,
}

#[derive(Args)]
struct GalleryArgs {
    /// JSON file replacing the built-in style presets
    #[arg(long, env = "STYLEFUSE_GALLERY")]
    gallery: Option<PathBuf>,
}

impl GalleryArgs {
    fn load(&self) -> anyhow::Result<Gallery> {
        match &self.gallery {
            Some(path) => Gallery::load(path)
                .with_context(|| format!("loading gallery from {}", path.display())),
            None => Ok(Gallery::builtin()),
        }
    }
}

#[derive(Args)]
struct ServiceArgs {
    /// Model: nano-banana, nano-banana-pro, or a raw Gemini model id
    #[arg(short, long, env = "STYLEFUSE_MODEL")]
    model: Option<String>,

    /// API key (defaults to GEMINI_API_KEY, then GOOGLE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "STYLEFUSE_BASE_URL")]
    base_url: Option<String>,
}

impl ServiceArgs {
    fn build(&self) -> stylefuse::Result<GeminiService> {
        let mut builder = GeminiService::builder();
        if let Some(ref model) = self.model {
            builder = match model.as_str() {
                "nano-banana" => builder.model(GeminiModel::NanoBanana),
                "nano-banana-pro" => builder.model(GeminiModel::NanoBananaPro),
                id => builder.model_id(id),
            };
        }
        if let Some(ref key) = self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(ref url) = self.base_url {
            builder = builder.base_url(url);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fuse(args) => fuse(args, cli.json).await,
        Commands::Styles(args) => list_styles(args, cli.json),
        Commands::Check(args) => check(args, cli.json).await,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "stylefuse=debug"
    } else {
        "stylefuse=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn fuse(args: FuseArgs, json_output: bool) -> anyhow::Result<()> {
    let gallery = args.gallery.load()?;
    let (orchestrator, mut session) =
        Orchestrator::start(args.service.build(), HttpImageSource::new(), gallery);

    if let Some(reason) = session.setup_error() {
        anyhow::bail!("cannot generate: {reason}");
    }

    orchestrator
        .load_subject(&mut session, &args.subject)
        .await
        .with_context(|| format!("reading {}", args.subject.display()))?;

    let index = match (&args.style, args.style_index) {
        (Some(name), _) => Some(
            orchestrator
                .gallery()
                .position(name)
                .with_context(|| format!("unknown style '{name}', see `stylefuse styles`"))?,
        ),
        (None, index) => index,
    };
    if let Some(index) = index {
        let toggle = orchestrator.toggle_reference(&mut session, index).await?;
        if let (ReferenceToggle::Selected(i), Some(preset)) =
            (toggle, orchestrator.gallery().get(index))
        {
            tracing::info!(index = i, style = %preset.name, "style selected");
        }
    }

    session.set_prompt(args.prompt);

    if let Err(e) = orchestrator.submit(&mut session).await {
        if e.is_validation() {
            anyhow::bail!("{e}");
        }
        let message = session
            .view()
            .error()
            .map(str::to_string)
            .unwrap_or_else(|| e.to_string());
        anyhow::bail!(message);
    }

    let path = session.export(&args.output_dir)?;
    let image = session
        .view()
        .image()
        .context("generated image missing after successful submit")?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
            "text": image.metadata.text,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated image: {} ({} bytes)",
            path.display(),
            image.size()
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
        if let Some(ref text) = image.metadata.text {
            println!("Model says: {}", text);
        }
    }

    Ok(())
}

fn list_styles(args: GalleryArgs, json_output: bool) -> anyhow::Result<()> {
    let gallery = args.load()?;

    if json_output {
        let presets: Vec<_> = gallery.iter().collect();
        println!("{}", serde_json::to_string_pretty(&presets)?);
    } else {
        println!("Style presets:\n");
        for (i, preset) in gallery.iter().enumerate() {
            println!("  [{}] {} - {}", i, preset.name, preset.label);
        }
        println!("\nResults are saved as {}", DOWNLOAD_FILE_NAME);
    }

    Ok(())
}

async fn check(args: ServiceArgs, json_output: bool) -> anyhow::Result<()> {
    let service = args.build()?;
    let result = service.health_check().await;

    if json_output {
        let report = serde_json::json!({
            "model": service.model(),
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if result.is_ok() {
        println!("✓ {} is reachable", service.model());
    }

    result.with_context(|| format!("health check for {} failed", service.model()))
}
