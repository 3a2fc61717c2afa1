use anyhow::{bail, Context, Result};
use clap::Parser;
use hmmseg_core::{train_file, Config, HmmModel, State, TrainingStats};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Train a BMES segmentation model from a pre-segmented corpus.
#[derive(Parser)]
struct Args {
    /// Corpus file, one space-segmented sentence per line (overrides config)
    corpus: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output model path (overrides config `model_path`)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the transition matrix and the first emission columns
    #[arg(long)]
    print: bool,

    /// Print a JSON summary of the trained model
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ModelSummary<'a> {
    lines: usize,
    sentences: usize,
    skipped_blank: usize,
    skipped_emissions: usize,
    vocab_size: usize,
    initial: &'a [f64],
    transition: &'a [[f64; 4]],
    /// first few characters with their per-state emission probabilities
    emission_preview: Vec<(char, [f64; 4])>,
}

const PREVIEW_COLUMNS: usize = 4;

fn print_matrix(title: &str, header: &[String], rows: &[Vec<f64>]) {
    println!("{title}");
    println!("\t{}", header.join("\t\t\t"));
    for (state, row) in State::ALL.iter().zip(rows) {
        let cells: Vec<String> = row.iter().map(|p| format!("{p:.12}")).collect();
        println!("{state}\t{}", cells.join("\t\t"));
    }
}

fn print_model(model: &HmmModel) {
    let states: Vec<String> = State::ALL.iter().map(|s| s.to_string()).collect();
    let transition: Vec<Vec<f64>> = model.transition().iter().map(|r| r.to_vec()).collect();
    print_matrix("transition matrix:", &states, &transition);

    let cols = model.vocabulary().len().min(PREVIEW_COLUMNS);
    let chars: Vec<String> = model.vocabulary().chars()[..cols]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let emission: Vec<Vec<f64>> = model.emission().iter().map(|r| r[..cols].to_vec()).collect();
    print_matrix("emission matrix (first columns):", &chars, &emission);
}

fn summarize<'a>(model: &'a HmmModel, stats: &TrainingStats) -> ModelSummary<'a> {
    let vocab = model.vocabulary();
    let emission_preview = vocab
        .chars()
        .iter()
        .take(PREVIEW_COLUMNS)
        .map(|&ch| {
            let probs = State::ALL.map(|s| model.emission_prob(s, ch).unwrap_or(0.0));
            (ch, probs)
        })
        .collect();
    ModelSummary {
        lines: stats.lines,
        sentences: stats.sentences,
        skipped_blank: stats.skipped_blank,
        skipped_emissions: stats.skipped_emissions,
        vocab_size: vocab.len(),
        initial: model.initial(),
        transition: model.transition(),
        emission_preview,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => Config::default(),
    };

    let Some(corpus) = args.corpus.or(cfg.corpus) else {
        bail!("no corpus given: pass a path or set `corpus` in the config file");
    };
    let output = args.output.unwrap_or(cfg.model_path);

    let (model, stats) =
        train_file(&corpus).with_context(|| format!("train from {}", corpus.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    model
        .save_bincode(&output)
        .with_context(|| format!("write model {}", output.display()))?;
    info!(
        model = %output.display(),
        vocab_size = model.vocabulary().len(),
        sentences = stats.sentences,
        "model written"
    );

    if args.print {
        print_model(&model);
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summarize(&model, &stats))?);
    }
    Ok(())
}
