//! docsift command-line front end.
//!
//! ```text
//! docsift extract report.pdf --format json
//! docsift extract book.xlsx --config policy.yaml --max-images 0
//! docsift config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docsift::{Analyzer, Document, Extraction, Options, TracingLogger};
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docsift", version, about = "Extract text and images from documents under a bounded policy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text and images from one document
    Extract {
        /// Path to the document
        path: PathBuf,

        /// Policy file (.toml, .yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of images to return
        #[arg(long)]
        max_images: Option<i64>,

        /// Minimum image size in bytes
        #[arg(long)]
        min_image_size: Option<i64>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the effective policy after validation
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "docsift=debug" } else { "docsift=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Extract {
            path,
            config,
            max_images,
            min_image_size,
            format,
        } => {
            let mut options = load_options(config.as_deref())?;
            apply_overrides(&mut options, max_images, min_image_size);
            let extraction = extract(&path, &options)?;
            println!("{}", render(&extraction, format)?);
        }
        Commands::Config { config } => {
            let options = load_options(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&options.validate())?);
        }
    }

    Ok(())
}

/// `--config` if given, else a discovered `docsift.toml`, else defaults.
fn load_options(config: Option<&Path>) -> Result<Options> {
    if let Some(path) = config {
        return Options::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let discovered = Options::discover().context("Failed to discover docsift.toml")?;
    if discovered.is_some() {
        tracing::debug!("Using discovered docsift.toml");
    }
    Ok(discovered.unwrap_or_default())
}

fn apply_overrides(options: &mut Options, max_images: Option<i64>, min_image_size: Option<i64>) {
    if let Some(max_images) = max_images {
        options.max_image_count = max_images;
    }
    if let Some(min_image_size) = min_image_size {
        options.image_min_size = min_image_size;
    }
}

fn extract(path: &Path, options: &Options) -> Result<Extraction> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let size = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();

    let mut document = Document::new(path.to_string_lossy(), size, file);
    let analyzer = Analyzer::new(options).with_logger(Arc::new(TracingLogger));
    analyzer
        .analyze(Some(&mut document))
        .with_context(|| format!("Failed to extract {}", path.display()))
}

fn render(extraction: &Extraction, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(extraction.text.clone()),
        OutputFormat::Json => {
            let images: Vec<_> = extraction
                .images
                .iter()
                .map(|image| {
                    json!({
                        "path": image.path(),
                        "format": image.format(),
                        "size": image.len(),
                    })
                })
                .collect();
            let summary = json!({
                "text": extraction.text,
                "images": images,
            });
            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}
