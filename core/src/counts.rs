//! Raw state and emission counts gathered from tagged sentences.
//!
//! Counts are kept as integers until a single normalization step. Shards
//! trained independently against the same vocabulary combine by
//! element-wise addition with [`Counts::merge`]; merging normalized
//! probabilities instead would weight shards incorrectly.
use tracing::debug;

use crate::error::{HmmError, Result};
use crate::state::STATE_COUNT;
use crate::tagger::TaggedSentence;
use crate::vocab::Vocabulary;

/// What a single [`Counts::observe`] call recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observed {
    /// Emission counts were added (false when characters and labels were
    /// mis-aligned).
    pub emissions: bool,
    /// Characters skipped because the vocabulary has no id for them.
    pub unknown_chars: usize,
}

/// Unigram, transition and emission counts over the four states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts {
    /// unigram[s]: positions tagged s, sentence-final positions included
    unigram: [u64; STATE_COUNT],
    /// transition[i][j]: i immediately followed by j inside one sentence
    transition: [[u64; STATE_COUNT]; STATE_COUNT],
    /// sentence_final[s]: sentences whose last position is tagged s
    sentence_final: [u64; STATE_COUNT],
    /// emission[s][c]: character id c tagged s
    emission: [Vec<u64>; STATE_COUNT],
    sentences: u64,
}

impl Counts {
    /// Empty counts for a vocabulary of `vocab_size` characters.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            unigram: [0; STATE_COUNT],
            transition: [[0; STATE_COUNT]; STATE_COUNT],
            sentence_final: [0; STATE_COUNT],
            emission: std::array::from_fn(|_| vec![0; vocab_size]),
            sentences: 0,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.emission[0].len()
    }

    pub fn unigram(&self) -> &[u64; STATE_COUNT] {
        &self.unigram
    }

    pub fn transition(&self) -> &[[u64; STATE_COUNT]; STATE_COUNT] {
        &self.transition
    }

    pub fn sentence_final(&self) -> &[u64; STATE_COUNT] {
        &self.sentence_final
    }

    pub fn emission(&self) -> &[Vec<u64>; STATE_COUNT] {
        &self.emission
    }

    /// Number of sentences observed.
    pub fn sentences(&self) -> u64 {
        self.sentences
    }

    /// Add one tagged sentence.
    ///
    /// State counts are always taken. Emission counts are skipped for the
    /// whole sentence when characters and labels are mis-aligned, and per
    /// character when the vocabulary has no id for it.
    pub fn observe(&mut self, sentence: &TaggedSentence, vocab: &Vocabulary) -> Observed {
        let labels = sentence.labels();
        let Some(last) = labels.last() else {
            return Observed::default();
        };

        for st in labels {
            self.unigram[st.index()] += 1;
        }
        for pair in labels.windows(2) {
            self.transition[pair[0].index()][pair[1].index()] += 1;
        }
        self.sentence_final[last.index()] += 1;
        self.sentences += 1;

        let mut observed = Observed::default();
        if !sentence.is_aligned() {
            debug!(
                chars = sentence.chars().len(),
                labels = labels.len(),
                "mis-aligned sentence, emissions skipped"
            );
            return observed;
        }
        observed.emissions = true;
        for (ch, st) in sentence.pairs() {
            match vocab.id(ch) {
                Some(id) if (id as usize) < self.vocab_size() => {
                    self.emission[st.index()][id as usize] += 1;
                }
                _ => {
                    debug!(?ch, "character outside vocabulary, emission skipped");
                    observed.unknown_chars += 1;
                }
            }
        }
        observed
    }

    /// Add another shard's counts element-wise.
    pub fn merge(&mut self, other: &Counts) -> Result<()> {
        if other.vocab_size() != self.vocab_size() {
            return Err(HmmError::VocabularyMismatch {
                expected: self.vocab_size(),
                found: other.vocab_size(),
            });
        }
        for i in 0..STATE_COUNT {
            self.unigram[i] += other.unigram[i];
            self.sentence_final[i] += other.sentence_final[i];
            for j in 0..STATE_COUNT {
                self.transition[i][j] += other.transition[i][j];
            }
            for (mine, theirs) in self.emission[i].iter_mut().zip(&other.emission[i]) {
                *mine += *theirs;
            }
        }
        self.sentences += other.sentences;
        Ok(())
    }

    /// Divide every count by its row's unigram count.
    ///
    /// Returns `(transition, emission)` as a 4x4 and a 4xV matrix. A state
    /// that was never observed gets an all-zero row. Transition rows sum to
    /// `(unigram - sentence_final) / unigram`, below 1 whenever the state
    /// ends some sentence.
    pub fn normalize(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let transition = (0..STATE_COUNT)
            .map(|i| {
                self.transition[i]
                    .iter()
                    .map(|&c| ratio(c, self.unigram[i]))
                    .collect()
            })
            .collect();
        let emission = (0..STATE_COUNT)
            .map(|i| {
                self.emission[i]
                    .iter()
                    .map(|&c| ratio(c, self.unigram[i]))
                    .collect()
            })
            .collect();
        (transition, emission)
    }
}

fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use crate::tagger::tag;

    #[test]
    fn counts_follow_tagged_sentence() {
        let vocab = Vocabulary::build(["也 没有"]);
        let mut counts = Counts::new(vocab.len());
        let obs = counts.observe(&tag("也 没有").unwrap(), &vocab);
        assert!(obs.emissions);
        assert_eq!(obs.unknown_chars, 0);

        // S B E
        assert_eq!(counts.unigram(), &[1, 0, 1, 1]);
        assert_eq!(counts.transition()[State::S.index()][State::B.index()], 1);
        assert_eq!(counts.transition()[State::B.index()][State::E.index()], 1);
        assert_eq!(counts.transition().iter().flatten().sum::<u64>(), 2);
        assert_eq!(counts.sentence_final(), &[0, 0, 1, 0]);
        assert_eq!(counts.emission()[State::S.index()][vocab.id('也').unwrap() as usize], 1);
        assert_eq!(counts.emission()[State::E.index()][vocab.id('有').unwrap() as usize], 1);
    }

    #[test]
    fn misaligned_sentence_keeps_state_counts_only() {
        let vocab = Vocabulary::build(["一点"]);
        let mut counts = Counts::new(vocab.len());
        let bad = TaggedSentence::new(vec!['一'], vec![State::B, State::E]);
        let obs = counts.observe(&bad, &vocab);
        assert!(!obs.emissions);
        assert_eq!(counts.unigram(), &[1, 0, 1, 0]);
        assert!(counts.emission().iter().flatten().all(|&c| c == 0));
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let vocab = Vocabulary::build(["一"]);
        let mut counts = Counts::new(vocab.len());
        let obs = counts.observe(&tag("一 攀").unwrap(), &vocab);
        assert_eq!(obs.unknown_chars, 1);
        assert_eq!(counts.emission()[State::S.index()][0], 1);
    }

    #[test]
    fn zero_unigram_rows_normalize_to_zero() {
        let vocab = Vocabulary::build(["攀"]);
        let mut counts = Counts::new(vocab.len());
        counts.observe(&tag("攀").unwrap(), &vocab);
        let (a, b) = counts.normalize();
        // only S was ever observed; every other row is zero, never NaN
        for s in [State::B, State::M, State::E] {
            assert!(a[s.index()].iter().all(|&p| p == 0.0));
            assert!(b[s.index()].iter().all(|&p| p == 0.0));
        }
        assert_eq!(b[State::S.index()][0], 1.0);
        assert_eq!(a[State::S.index()].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn merge_rejects_different_vocabulary_sizes() {
        let mut a = Counts::new(3);
        let b = Counts::new(4);
        assert!(matches!(
            a.merge(&b),
            Err(HmmError::VocabularyMismatch { expected: 3, found: 4 })
        ));
    }
}
