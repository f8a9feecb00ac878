use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Parser, Subcommand};
use prayas_core::study::{self, MentorMode};
use prayas_core::{Attachment, Gateway, GatewayConfig, GenerationRequest};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "prayas")]
#[command(version)]
#[command(about = "Prayas: AI study companion from the terminal")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Override the provider (openai, gemini, groq)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a one-shot generation request
    Ask {
        /// The prompt to send
        prompt: String,

        /// System instruction framing the task
        #[arg(short, long, default_value = "You are a helpful study assistant.")]
        system: String,

        /// Sampling temperature
        #[arg(short, long, default_value_t = 0.5)]
        temperature: f32,

        /// Image to attach (Gemini only)
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Talk to the mentor
    Mentor {
        /// Your question or message
        message: String,

        /// strategy, motivation or counselling
        #[arg(short, long, default_value = "strategy")]
        mode: String,
    },

    /// Get today's affirmation
    Affirmation,

    /// Evaluate a written answer
    Evaluate {
        /// Answer text
        #[arg(short, long)]
        answer: Option<String>,

        /// Photo of the handwritten answer (Gemini only)
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config, cli.provider.as_deref()),
        Commands::Ask {
            ref prompt,
            ref system,
            temperature,
            ref image,
        } => {
            let mut request = GenerationRequest::new(system.as_str(), prompt.as_str())
                .with_temperature(temperature);
            if let Some(path) = image {
                request = request.with_attachment(load_image(path).await?);
            }
            run(&cli, &request, "Assistant").await
        }
        Commands::Mentor {
            ref message,
            ref mode,
        } => {
            let mode = MentorMode::from_name(mode);
            debug!("Mentor mode: {}", mode);
            let request = study::mentor_request(message, mode)?;
            run(&cli, &request, "Mentor").await
        }
        Commands::Affirmation => run(&cli, &study::affirmation_request(), "Affirmation").await,
        Commands::Evaluate {
            ref answer,
            ref image,
        } => {
            let attachment = match image {
                Some(path) => Some(load_image(path).await?),
                None => None,
            };
            let request = study::evaluation_request(answer.as_deref(), attachment)?;
            run(&cli, &request, "AI evaluator").await
        }
    }
}

/// Resolve configuration for this invocation and print the generated text
async fn run(cli: &Cli, request: &GenerationRequest, feature: &str) -> Result<()> {
    let config = config::resolve(&cli.config, cli.provider.as_deref())?;
    let gateway = Gateway::new().context("Failed to initialize HTTP client")?;

    match gateway.generate(&config, request).await {
        Ok(text) if text.is_empty() => {
            warn!("{} returned no content", config.active_provider);
            Ok(())
        }
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            let message = study::user_message(&e, feature);
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config::default_config_path();
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        info!("Created default config at {}", config_path.display());
    }

    println!("Prayas initialized at {}", config_dir.display());
    println!(
        "Edit {} or export AI_PROVIDER and the provider's API key.",
        config_path.display()
    );
    Ok(())
}

fn cmd_config(custom_path: &Option<PathBuf>, provider: Option<&str>) -> Result<()> {
    let config = config::resolve(custom_path, provider)?;
    print_config(&config);
    Ok(())
}

fn print_config(config: &GatewayConfig) {
    println!("Active provider: {}", config.active_provider);
    for kind in [
        prayas_core::ProviderKind::OpenAi,
        prayas_core::ProviderKind::Gemini,
        prayas_core::ProviderKind::Groq,
    ] {
        let settings = config.settings(kind);
        let key = settings
            .api_key()
            .map(prayas_core::config::mask_secret)
            .unwrap_or_else(|| "(not set)".to_string());
        println!(
            "  {:<7} model={} base_url={} api_key={}",
            kind.as_str(),
            settings.model,
            settings.base_url,
            key
        );
    }
}

/// Read an image file and encode it for inline upload
async fn load_image(path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(Attachment::new(BASE64.encode(bytes), mime_type_for(path)))
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
