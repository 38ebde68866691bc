use clap::{Parser, Subcommand};
use image::ImageReader;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use digrec::preprocess::{self, PreprocessOptions};
use digrec::{Classification, ClassifierRegistry, DigrecConfig};

#[derive(Parser)]
#[command(name = "digrec")]
#[command(about = "Recognize handwritten digits from images")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE", env = "DIGREC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize the digit in each image
    Recognize {
        /// Images with dark ink on a light background
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        /// Classifier to use (see `digrec list`)
        #[arg(short, long)]
        classifier: Option<String>,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,

        /// Skip the blur applied before cropping
        #[arg(long)]
        no_blur: bool,
    },
    /// List available classifiers
    List,
}

#[derive(Serialize)]
struct ImageResult<'a> {
    image: String,
    classifier: &'a str,
    #[serde(flatten)]
    classification: &'a Classification,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = DigrecConfig::resolve(args.config.as_deref())?;
    let registry = ClassifierRegistry::with_builtin(&config)?;

    match args.command {
        Command::List => {
            for name in registry.names() {
                let marker = if name == config.recognition.default_classifier {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}", name, marker);
            }
        }
        Command::Recognize {
            images,
            classifier,
            json,
            no_blur,
        } => {
            let name = classifier.unwrap_or_else(|| config.recognition.default_classifier.clone());
            let classifier = registry.get(&name)?;
            let options = PreprocessOptions {
                blur_sigma: if no_blur {
                    None
                } else {
                    PreprocessOptions::default().blur_sigma
                },
                ..PreprocessOptions::default()
            };
            info!(classifier = %name, images = images.len(), "recognizing");

            for path in &images {
                let img = ImageReader::open(path)?
                    .decode()
                    .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?;
                debug!(image = %path.display(), width = img.width(), height = img.height(), "image loaded");

                let pixels = preprocess::image_to_pixels(&img, config.pixels, &options)?;
                let classification = classifier.recognize(&pixels)?;

                if json {
                    let line = ImageResult {
                        image: path.display().to_string(),
                        classifier: classifier.name(),
                        classification: &classification,
                    };
                    println!("{}", serde_json::to_string(&line)?);
                } else {
                    match classification.confidence() {
                        Some(confidence) => println!(
                            "{}: {} (confidence: {:.2})",
                            path.display(),
                            classification.label(),
                            confidence
                        ),
                        None => println!("{}: {}", path.display(), classification.label()),
                    }
                }
            }
        }
    }

    Ok(())
}
