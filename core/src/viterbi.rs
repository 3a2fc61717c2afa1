//! Viterbi decoding over the BMES states.
//!
//! Scores are accumulated as natural logarithms so long inputs do not
//! underflow:
//!
//! ```text
//! delta[0][s] = ln Pi[s] + ln B[s][o_0]
//! delta[t][s] = max_p(delta[t-1][p] + ln A[p][s]) + ln B[s][o_t]
//! ```
//!
//! Zero probabilities become `-inf` and simply lose every comparison. All
//! argmax steps keep the lowest state index on ties.
use tracing::debug;

use crate::config::Config;
use crate::model::HmmModel;
use crate::state::{State, STATE_COUNT};

/// Emission probability used for every state when a character was never
/// seen in training.
pub const DEFAULT_UNKNOWN_EMISSION: f64 = 1e-8;

/// Marker inserted after each word-final character.
pub const DEFAULT_BOUNDARY: &str = "/";

/// Decoder bound to one model.
///
/// Holds only derived, read-only tables, so one instance can serve any
/// number of independent inputs.
#[derive(Debug, Clone)]
pub struct Segmenter<'m> {
    model: &'m HmmModel,
    log_initial: [f64; STATE_COUNT],
    log_transition: [[f64; STATE_COUNT]; STATE_COUNT],
    log_unknown: f64,
    boundary: String,
}

impl<'m> Segmenter<'m> {
    pub fn new(model: &'m HmmModel) -> Self {
        let log_initial = model.initial().map(f64::ln);
        let log_transition = model.transition().map(|row| row.map(f64::ln));
        Self {
            model,
            log_initial,
            log_transition,
            log_unknown: DEFAULT_UNKNOWN_EMISSION.ln(),
            boundary: DEFAULT_BOUNDARY.to_string(),
        }
    }

    /// Decoder using the fallback emission and boundary marker from `config`.
    pub fn from_config(model: &'m HmmModel, config: &Config) -> Self {
        Self::new(model)
            .with_unknown_emission(config.unknown_emission)
            .with_boundary(config.boundary_marker.clone())
    }

    /// Set the fallback emission probability for unseen characters.
    ///
    /// Values outside (0, 1] are clamped into range; NaN falls back to
    /// [`DEFAULT_UNKNOWN_EMISSION`].
    pub fn with_unknown_emission(mut self, prob: f64) -> Self {
        let prob = if prob.is_nan() {
            DEFAULT_UNKNOWN_EMISSION
        } else {
            prob.clamp(f64::MIN_POSITIVE, 1.0)
        };
        self.log_unknown = prob.ln();
        self
    }

    pub fn with_boundary(mut self, marker: impl Into<String>) -> Self {
        self.boundary = marker.into();
        self
    }

    pub fn model(&self) -> &HmmModel {
        self.model
    }

    /// ln B[s][ch] for every state; the fallback value for unseen characters.
    fn log_emissions(&self, ch: char) -> [f64; STATE_COUNT] {
        match self.model.vocabulary().id(ch) {
            Some(id) => {
                let id = id as usize;
                std::array::from_fn(|s| self.model.emission()[s][id].ln())
            }
            None => {
                debug!(?ch, "unknown character, using fallback emission");
                [self.log_unknown; STATE_COUNT]
            }
        }
    }

    /// Most likely state path for `text`, one state per character.
    pub fn decode(&self, text: &str) -> Vec<State> {
        let obs: Vec<char> = text.chars().collect();
        let Some(&first) = obs.first() else {
            return Vec::new();
        };

        let mut back: Vec<[usize; STATE_COUNT]> = Vec::with_capacity(obs.len());
        let emit = self.log_emissions(first);
        let mut delta: [f64; STATE_COUNT] = std::array::from_fn(|s| self.log_initial[s] + emit[s]);
        back.push([0; STATE_COUNT]);

        for &ch in &obs[1..] {
            let emit = self.log_emissions(ch);
            let mut next = [f64::NEG_INFINITY; STATE_COUNT];
            let mut ptr = [0usize; STATE_COUNT];
            for s in 0..STATE_COUNT {
                let mut best_prev = 0;
                let mut best = delta[0] + self.log_transition[0][s];
                for p in 1..STATE_COUNT {
                    let score = delta[p] + self.log_transition[p][s];
                    if score > best {
                        best = score;
                        best_prev = p;
                    }
                }
                next[s] = best + emit[s];
                ptr[s] = best_prev;
            }
            delta = next;
            back.push(ptr);
        }

        let mut state = argmax(&delta);
        let mut path = vec![State::B; obs.len()];
        for t in (0..obs.len()).rev() {
            path[t] = State::ALL[state];
            state = back[t][state];
        }
        path
    }

    /// `text` with the boundary marker after every E or S character.
    pub fn segment(&self, text: &str) -> String {
        let path = self.decode(text);
        let mut out = String::with_capacity(text.len() + path.len() * self.boundary.len());
        for (ch, st) in text.chars().zip(path) {
            out.push(ch);
            if st.is_word_end() {
                out.push_str(&self.boundary);
            }
        }
        out
    }

    /// Split `text` into words along the decoded boundaries.
    pub fn cut(&self, text: &str) -> Vec<String> {
        let path = self.decode(text);
        let mut words = Vec::new();
        let mut current = String::new();
        for (ch, st) in text.chars().zip(path) {
            current.push(ch);
            if st.is_word_end() {
                words.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }
}

/// Index of the largest score, lowest index on ties.
fn argmax(scores: &[f64; STATE_COUNT]) -> usize {
    let mut best = 0;
    for s in 1..STATE_COUNT {
        if scores[s] > scores[best] {
            best = s;
        }
    }
    best
}

/// Decode with default options.
pub fn decode(model: &HmmModel, text: &str) -> Vec<State> {
    Segmenter::new(model).decode(text)
}

/// Segment with default options and `/` as boundary marker.
pub fn segment(model: &HmmModel, text: &str) -> String {
    Segmenter::new(model).segment(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::INITIAL_DISTRIBUTION;
    use crate::vocab::Vocabulary;

    /// Two characters: 甲 always begins a word, 乙 always ends one.
    fn toy_model() -> HmmModel {
        let vocab = Vocabulary::build(["甲乙"]);
        let transition = vec![
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.5, 0.0, 0.0, 0.5],
            vec![0.5, 0.0, 0.0, 0.5],
        ];
        let emission = vec![
            vec![1.0, 0.0],
            vec![0.5, 0.5],
            vec![0.0, 1.0],
            vec![0.5, 0.5],
        ];
        HmmModel::assemble(INITIAL_DISTRIBUTION.to_vec(), transition, emission, vocab)
            .expect("toy model")
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        let model = toy_model();
        assert!(decode(&model, "").is_empty());
        assert_eq!(segment(&model, ""), "");
    }

    #[test]
    fn decodes_known_words() {
        let model = toy_model();
        assert_eq!(decode(&model, "甲乙甲乙"), vec![State::B, State::E, State::B, State::E]);
        assert_eq!(segment(&model, "甲乙甲乙"), "甲乙/甲乙/");
        assert_eq!(Segmenter::new(&model).cut("甲乙甲乙"), vec!["甲乙", "甲乙"]);
    }

    #[test]
    fn single_character_picks_best_initial_state() {
        let model = toy_model();
        // Pi*B: B=0.5, M=0, E=0, S=0.25
        assert_eq!(decode(&model, "甲"), vec![State::B]);
        // Pi*B: B=0, M=0, E=0, S=0.25
        assert_eq!(decode(&model, "乙"), vec![State::S]);
    }

    #[test]
    fn ties_resolve_to_lowest_state() {
        let model = toy_model();
        // unknown character: B and S tie at 0.5 * fallback
        assert_eq!(decode(&model, "丙"), vec![State::B]);
    }

    #[test]
    fn unknown_characters_do_not_fail() {
        let model = toy_model();
        let path = decode(&model, "甲丙乙");
        assert_eq!(path.len(), 3);
        assert_eq!(segment(&model, "甲丙乙").chars().filter(|&c| c != '/').count(), 3);
    }

    #[test]
    fn custom_boundary_marker() {
        let model = toy_model();
        let seg = Segmenter::new(&model).with_boundary(" | ");
        assert_eq!(seg.segment("甲乙"), "甲乙 | ");
    }

    #[test]
    fn long_input_does_not_underflow() {
        let model = toy_model();
        let text = "甲乙".repeat(2000);
        let path = decode(&model, &text);
        assert_eq!(path.len(), 4000);
        assert!(path
            .chunks(2)
            .all(|pair| pair == [State::B, State::E]));
    }

    #[test]
    fn fallback_emission_is_clamped() {
        let model = toy_model();
        let seg = Segmenter::new(&model).with_unknown_emission(0.0);
        assert!(seg.log_unknown.is_finite());
        let seg = Segmenter::new(&model).with_unknown_emission(f64::NAN);
        assert_eq!(seg.log_unknown, DEFAULT_UNKNOWN_EMISSION.ln());
    }
}
