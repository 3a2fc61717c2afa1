//! hmmseg-core
//!
//! Character-based hidden Markov model for Chinese word segmentation.
//!
//! Training reads a pre-segmented corpus (one sentence per line, words
//! separated by spaces), tags every character with one of the BMES states,
//! counts state transitions and character emissions, and normalizes the
//! counts into probability matrices. Decoding runs Viterbi over new text and
//! inserts a boundary marker after every word-final character.
//!
//! Public API:
//! - `Vocabulary` - dense character ids in first-seen order
//! - `tag` / `TaggedSentence` - BMES encoder for segmented sentences
//! - `Counts` / `trainer` - count accumulation, shard merging, normalization
//! - `HmmModel` - immutable initial/transition/emission bundle
//! - `Segmenter` - log-space Viterbi decoder and renderer
//! - `Config` - corpus location and decoding options

pub mod error;
pub use error::{HmmError, Result};

pub mod state;
pub use state::{State, STATE_COUNT};

pub mod vocab;
pub use vocab::Vocabulary;

pub mod tagger;
pub use tagger::{tag, Rule, TaggedSentence, TaggerState};

pub mod counts;
pub use counts::{Counts, Observed};

pub mod trainer;
pub use trainer::{count_shard, finish, train, train_file, train_reader, TrainingStats};

pub mod model;
pub use model::{HmmModel, INITIAL_DISTRIBUTION};

pub mod viterbi;
pub use viterbi::{decode, segment, Segmenter};

pub mod config;
pub use config::Config;

/// Character classification helpers shared by the vocabulary builder and
/// the tagger.
pub mod utils {
    use once_cell::sync::Lazy;
    use regex::Regex;

    // Unicode punctuation category plus ASCII punctuation symbols.
    static PUNCT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[\p{P}[:punct:]]").expect("valid punctuation class"));
    static PUNCT_OR_SPACE_RUN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[\p{P}[:punct:]\s]+").expect("valid separator class"));

    /// True for characters in the Unicode punctuation category (`\p{P}`) and
    /// for every ASCII punctuation symbol.
    ///
    /// ASCII symbols such as `+` or `$` count as punctuation here even though
    /// Unicode files them under other categories.
    pub fn is_punctuation(ch: char) -> bool {
        let mut buf = [0u8; 4];
        PUNCT.is_match(ch.encode_utf8(&mut buf))
    }

    /// Remove punctuation and whitespace entirely, keeping only content
    /// characters.
    pub fn strip_content(s: &str) -> String {
        PUNCT_OR_SPACE_RUN.replace_all(s, "").into_owned()
    }

    /// Replace each punctuation character with a space and collapse every
    /// whitespace run into a single ASCII space.
    ///
    /// Leading and trailing whitespace is kept (collapsed), not trimmed.
    pub fn punctuation_to_spaces(s: &str) -> String {
        PUNCT_OR_SPACE_RUN.replace_all(s, " ").into_owned()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ascii_and_cjk_punctuation() {
            for ch in ['!', ',', '.', '$', '+', '、', '，', '。', '《', '》', '「', '」', '：', '？', '—', '…', '·'] {
                assert!(is_punctuation(ch), "{ch:?} should be punctuation");
            }
            for ch in ['a', '5', ' ', '一', '攀', '〇', '々'] {
                assert!(!is_punctuation(ch), "{ch:?} should not be punctuation");
            }
        }

        #[test]
        fn bracket_and_math_punctuation_outside_cjk_blocks() {
            for ch in ['\u{2329}', '\u{232A}', '\u{2308}', '\u{2768}', '\u{27E8}', '\u{27E9}', '\u{2983}', '\u{29FC}', '\u{2E52}'] {
                assert!(is_punctuation(ch), "{ch:?} should be punctuation");
            }
            // modifier letter, not punctuation
            assert!(!is_punctuation('\u{2E2F}'));
        }

        #[test]
        fn angle_brackets_are_spaced_out() {
            assert_eq!(strip_content("\u{2329}一点\u{232A} 外语"), "一点外语");
            assert_eq!(punctuation_to_spaces("\u{2329}一点\u{232A}外语"), " 一点 外语");
        }

        #[test]
        fn strip_content_drops_spaces_and_punctuation() {
            assert_eq!(strip_content(" 一点 外语 、 知识 ， "), "一点外语知识");
            assert_eq!(strip_content("，。 、"), "");
        }

        #[test]
        fn punctuation_collapses_to_single_spaces() {
            assert_eq!(punctuation_to_spaces("知识 、 数理化"), "知识 数理化");
            assert_eq!(punctuation_to_spaces("也  没有\t还"), "也 没有 还");
            assert_eq!(punctuation_to_spaces("，还"), " 还");
        }
    }
}
