//! CLI for pixsynth - image synthesis from reference images and a prompt.

use clap::{Args, Parser, Subcommand, ValueEnum};
use pixsynth::{Session, SynthModel, SynthesisClient};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixsynth")]
#[command(about = "Send reference images and a prompt to a generation endpoint")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize an image and/or text from reference images and a prompt
    Generate(GenerateArgs),

    /// List available model variants
    Models,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt sent with the images
    prompt: String,

    /// Reference image file (repeat for several, order preserved)
    #[arg(short, long = "image", required = true)]
    images: Vec<PathBuf>,

    /// Where to save the generated image, if one comes back
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model variant to use
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
}

impl From<ModelArg> for SynthModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => SynthModel::FlashImage,
            ModelArg::Pro => SynthModel::ProImage,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await?,
        Commands::Models => list_models(cli.json)?,
    }

    Ok(())
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    if args.prompt.trim().is_empty() {
        anyhow::bail!("prompt must not be blank");
    }

    let client = SynthesisClient::builder().model(args.model.into()).build()?;
    let mut session = Session::new(client);
    session.tray_mut().add(args.images);

    let result = session.submit(&args.prompt).await?;

    let saved = match (&args.output, result.image_bytes()?) {
        (Some(path), Some(bytes)) => {
            std::fs::write(path, &bytes)?;
            Some(path.display().to_string())
        }
        _ => None,
    };

    if json_output {
        let report = serde_json::json!({
            "success": true,
            "has_image": result.image_data_url.is_some(),
            "text": result.text,
            "output": saved,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(text) = &result.text {
            println!("{text}");
        }
        match (saved, result.image_data_url.is_some()) {
            (Some(path), _) => println!("Generated image saved to {path}"),
            (None, true) => println!("Generated an image (pass --output to save it)"),
            (None, false) => {}
        }
    }

    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    let models = [
        ("flash", SynthModel::FlashImage, "fast, economical"),
        ("pro", SynthModel::ProImage, "highest quality"),
    ];

    if json_output {
        let report: Vec<_> = models
            .iter()
            .map(|(name, model, note)| {
                serde_json::json!({
                    "name": name,
                    "model_id": model.as_str(),
                    "note": note,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Available models:\n");
        for (name, model, note) in models {
            println!("  {} -> {} ({})", name, model.as_str(), note);
        }
        println!("\nAPI key: GOOGLE_API_KEY");
    }

    Ok(())
}
