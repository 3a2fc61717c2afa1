//! BMES encoder for pre-segmented sentences.
//!
//! A segmented line such as `一点 外语 知识` is normalized (punctuation
//! becomes a space, whitespace runs collapse to one space, the line is
//! padded with a space on either side) and then scanned left to right by a
//! small finite-state machine. The machine tracks how many spaces have been
//! seen since the current word opened and how long that word is, and writes
//! one state per content character into an output buffer:
//!
//! ```text
//!  " 一点 外语 知识 "  ->  B E B E B E
//! ```
use crate::state::{label_string, State};
use crate::utils::punctuation_to_spaces;

/// One transition of the encoder, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Last position of the padded line: close the final word.
    EndOfInput,
    /// A space; counted, nothing emitted.
    Whitespace,
    /// First character of the first word.
    OpenWord,
    /// First character after a boundary when the previous word had two or
    /// more characters: previous tag becomes E.
    CloseLongWord,
    /// First character after a boundary when the previous word was a
    /// single character: previous tag becomes S.
    CloseSingleWord,
    /// Any further character of the current word.
    ContinueWord,
}

/// Scanner registers for the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaggerState {
    /// Spaces seen since the current word was opened.
    pub space_count: u32,
    /// Characters in the currently open word.
    pub word_length: u32,
}

impl TaggerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the first rule that matches `ch` in the current registers.
    ///
    /// After normalization a content character is always preceded by one or
    /// two counted spaces, so anything not caught by the boundary rules is an
    /// interior character.
    pub fn classify(&self, ch: char, at_end: bool) -> Rule {
        if at_end {
            Rule::EndOfInput
        } else if ch.is_whitespace() {
            Rule::Whitespace
        } else if self.space_count == 1 && self.word_length == 0 {
            Rule::OpenWord
        } else if self.space_count == 2 && self.word_length != 1 {
            Rule::CloseLongWord
        } else if self.space_count == 2 {
            Rule::CloseSingleWord
        } else {
            Rule::ContinueWord
        }
    }

    /// Apply `rule`, rewriting the most recent label and/or appending to
    /// `labels`.
    pub fn apply(&mut self, rule: Rule, labels: &mut Vec<State>) {
        match rule {
            Rule::EndOfInput => {
                if let Some(last) = labels.last_mut() {
                    if *last == State::M {
                        *last = State::E;
                    }
                    if *last == State::B && self.word_length == 1 {
                        *last = State::S;
                    }
                }
            }
            Rule::Whitespace => {
                self.space_count += 1;
            }
            Rule::OpenWord => {
                labels.push(State::B);
                self.word_length = 1;
            }
            Rule::CloseLongWord => {
                if let Some(last) = labels.last_mut() {
                    *last = State::E;
                }
                labels.push(State::B);
                self.word_length = 1;
                self.space_count = 1;
            }
            Rule::CloseSingleWord => {
                // word_length stays 1: the new word is one character so far
                if let Some(last) = labels.last_mut() {
                    *last = State::S;
                }
                labels.push(State::B);
                self.space_count = 1;
            }
            Rule::ContinueWord => {
                labels.push(State::M);
                self.word_length += 1;
            }
        }
    }
}

/// A sentence's content characters paired with their BMES states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSentence {
    chars: Vec<char>,
    labels: Vec<State>,
}

impl TaggedSentence {
    /// Pair characters with states. The lengths are not checked here; see
    /// [`TaggedSentence::is_aligned`].
    pub fn new(chars: Vec<char>, labels: Vec<State>) -> Self {
        Self { chars, labels }
    }

    /// Parse the interleaved `char, label, char, label, ...` form.
    ///
    /// Returns `None` for odd-length input or an unknown label.
    pub fn parse_interleaved(s: &str) -> Option<Self> {
        let raw: Vec<char> = s.chars().collect();
        if raw.len() % 2 != 0 {
            return None;
        }
        let mut chars = Vec::with_capacity(raw.len() / 2);
        let mut labels = Vec::with_capacity(raw.len() / 2);
        for pair in raw.chunks_exact(2) {
            chars.push(pair[0]);
            labels.push(State::from_label(pair[1])?);
        }
        Some(Self { chars, labels })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn labels(&self) -> &[State] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// True when every character has exactly one label.
    pub fn is_aligned(&self) -> bool {
        self.chars.len() == self.labels.len()
    }

    /// Labels as a string, e.g. `"BEBEBE"`.
    pub fn label_string(&self) -> String {
        label_string(&self.labels)
    }

    /// Characters interleaved with their labels: `一B点E外B语E`.
    pub fn interleave(&self) -> String {
        let mut out = String::with_capacity(self.chars.len() * 4);
        for (ch, st) in self.chars.iter().zip(&self.labels) {
            out.push(*ch);
            out.push(st.label());
        }
        out
    }

    /// (character, state) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (char, State)> + '_ {
        self.chars.iter().copied().zip(self.labels.iter().copied())
    }

    /// Rebuild words by cutting after every E or S.
    ///
    /// A trailing B/M run with no closing state is returned as a final word.
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        for (ch, st) in self.pairs() {
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

/// Tag one pre-segmented sentence.
///
/// Returns `None` when the line is blank or consists only of punctuation;
/// callers skip such lines.
pub fn tag(sentence: &str) -> Option<TaggedSentence> {
    if sentence.trim().is_empty() {
        return None;
    }
    let mut text = punctuation_to_spaces(sentence);
    if text.trim().is_empty() {
        return None;
    }
    if !text.starts_with(char::is_whitespace) {
        text.insert(0, ' ');
    }
    if !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }

    let padded: Vec<char> = text.chars().collect();
    let last = padded.len() - 1;
    let mut state = TaggerState::new();
    let mut labels = Vec::with_capacity(padded.len());
    for (i, &ch) in padded.iter().enumerate() {
        let rule = state.classify(ch, i == last);
        state.apply(rule, &mut labels);
    }

    let chars: Vec<char> = padded.into_iter().filter(|c| !c.is_whitespace()).collect();
    debug_assert_eq!(chars.len(), labels.len());
    Some(TaggedSentence { chars, labels })
}
