use anyhow::{Context, Result};
use clap::Parser;
use hmmseg_core::{train_file, Config, HmmModel, Segmenter};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Segment Chinese text with a trained HMM.
///
/// Text comes from the positional arguments, or from stdin one line at a
/// time when none are given.
#[derive(Parser)]
struct Args {
    /// Text to segment
    text: Vec<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trained model (overrides config `model_path`)
    #[arg(long, conflicts_with = "corpus")]
    model: Option<PathBuf>,

    /// Retrain from this corpus instead of loading a model file
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Boundary marker inserted after each word
    #[arg(long)]
    marker: Option<String>,

    /// Emission probability for characters unseen in training
    #[arg(long)]
    unknown_emission: Option<f64>,
}

/// Explicit `--corpus` retrains; otherwise the model file is loaded, falling
/// back to the configured corpus when no model file exists yet.
fn load_model(args: &Args, cfg: &Config) -> Result<HmmModel> {
    let retrain_from = args.corpus.as_ref().or_else(|| {
        cfg.corpus
            .as_ref()
            .filter(|_| args.model.is_none() && !cfg.model_path.exists())
    });
    if let Some(corpus) = retrain_from {
        let (model, stats) =
            train_file(corpus).with_context(|| format!("train from {}", corpus.display()))?;
        info!(sentences = stats.sentences, "model trained from corpus");
        return Ok(model);
    }
    let path = args.model.as_ref().unwrap_or(&cfg.model_path);
    HmmModel::load_bincode(path).with_context(|| format!("load model {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(marker) = &args.marker {
        cfg.boundary_marker = marker.clone();
    }
    if let Some(p) = args.unknown_emission {
        cfg.unknown_emission = p;
    }

    let model = load_model(&args, &cfg)?;
    let segmenter = Segmenter::from_config(&model, &cfg);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.text.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            writeln!(out, "{}", segmenter.segment(line.trim()))?;
        }
    } else {
        for text in &args.text {
            writeln!(out, "{}", segmenter.segment(text))?;
        }
    }
    Ok(())
}
