//! Training pipeline: vocabulary pass, tagging and counting pass, one
//! normalization step.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::counts::Counts;
use crate::error::Result;
use crate::model::{HmmModel, INITIAL_DISTRIBUTION};
use crate::tagger::tag;
use crate::vocab::Vocabulary;

/// Per-run bookkeeping for skipped and counted lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingStats {
    /// Lines read from the corpus.
    pub lines: usize,
    /// Lines that produced a tagged sentence.
    pub sentences: usize,
    /// Blank or punctuation-only lines.
    pub skipped_blank: usize,
    /// Sentences whose emission contribution was dropped.
    pub skipped_emissions: usize,
    /// Characters with no vocabulary id while counting emissions.
    pub unknown_chars: usize,
}

impl TrainingStats {
    /// Fold another shard's statistics into this one.
    pub fn absorb(&mut self, other: &TrainingStats) {
        self.lines += other.lines;
        self.sentences += other.sentences;
        self.skipped_blank += other.skipped_blank;
        self.skipped_emissions += other.skipped_emissions;
        self.unknown_chars += other.unknown_chars;
    }
}

/// Tag and count one slice of the corpus against a fixed vocabulary.
///
/// Shards counted this way can be combined with [`Counts::merge`] before
/// calling [`finish`].
pub fn count_shard<S: AsRef<str>>(lines: &[S], vocab: &Vocabulary) -> (Counts, TrainingStats) {
    let mut counts = Counts::new(vocab.len());
    let mut stats = TrainingStats::default();
    for (lineno, line) in lines.iter().enumerate() {
        stats.lines += 1;
        let Some(sentence) = tag(line.as_ref()) else {
            debug!(lineno, "blank line skipped");
            stats.skipped_blank += 1;
            continue;
        };
        stats.sentences += 1;
        let observed = counts.observe(&sentence, vocab);
        if !observed.emissions {
            stats.skipped_emissions += 1;
        }
        stats.unknown_chars += observed.unknown_chars;
    }
    (counts, stats)
}

/// Normalize finished counts into a model.
pub fn finish(counts: &Counts, vocab: Vocabulary) -> Result<HmmModel> {
    let (transition, emission) = counts.normalize();
    HmmModel::assemble(INITIAL_DISTRIBUTION.to_vec(), transition, emission, vocab)
}

/// Train from in-memory corpus lines.
pub fn train<S: AsRef<str>>(lines: &[S]) -> Result<(HmmModel, TrainingStats)> {
    let vocab = Vocabulary::build(lines);
    let (counts, stats) = count_shard(lines, &vocab);
    info!(
        lines = stats.lines,
        sentences = stats.sentences,
        skipped_blank = stats.skipped_blank,
        skipped_emissions = stats.skipped_emissions,
        vocab_size = vocab.len(),
        "training finished"
    );
    let model = finish(&counts, vocab)?;
    Ok((model, stats))
}

/// Train from a reader yielding one sentence per line.
///
/// Any read error aborts training; no partial model is produced.
pub fn train_reader<R: BufRead>(reader: R) -> Result<(HmmModel, TrainingStats)> {
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    train(&lines)
}

/// Train from a UTF-8 corpus file.
pub fn train_file<P: AsRef<Path>>(path: P) -> Result<(HmmModel, TrainingStats)> {
    let path = path.as_ref();
    info!(corpus = %path.display(), "reading corpus");
    let file = File::open(path)?;
    train_reader(BufReader::new(file))
}
