//! BMES hidden states.
//!
//! Every character of a segmented sentence carries exactly one of four
//! labels describing its position inside the word it belongs to.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hidden states in the model.
pub const STATE_COUNT: usize = 4;

/// Position of a character inside its word.
///
/// The discriminants are the row/column indices used by every matrix in
/// the crate, so `State::B as usize == 0` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum State {
    /// First character of a multi-character word.
    B = 0,
    /// Interior character of a word of three or more characters.
    M = 1,
    /// Last character of a multi-character word.
    E = 2,
    /// Single-character word.
    S = 3,
}

impl State {
    /// All states in index order.
    pub const ALL: [State; STATE_COUNT] = [State::B, State::M, State::E, State::S];

    /// Matrix index of this state.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`State::index`].
    pub fn from_index(index: usize) -> Option<State> {
        Self::ALL.get(index).copied()
    }

    /// Single-letter label (`'B'`, `'M'`, `'E'`, `'S'`).
    pub fn label(self) -> char {
        match self {
            State::B => 'B',
            State::M => 'M',
            State::E => 'E',
            State::S => 'S',
        }
    }

    /// Inverse of [`State::label`].
    pub fn from_label(label: char) -> Option<State> {
        match label {
            'B' => Some(State::B),
            'M' => Some(State::M),
            'E' => Some(State::E),
            'S' => Some(State::S),
            _ => None,
        }
    }

    /// True for the states that close a word (E and S).
    pub fn is_word_end(self) -> bool {
        matches!(self, State::E | State::S)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Render a state path as its label string, e.g. `"BEBES"`.
pub fn label_string(states: &[State]) -> String {
    states.iter().map(|s| s.label()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_label_are_bijective() {
        for (i, s) in State::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
            assert_eq!(State::from_index(i), Some(*s));
            assert_eq!(State::from_label(s.label()), Some(*s));
        }
        assert_eq!(State::from_index(4), None);
        assert_eq!(State::from_label('X'), None);
    }

    #[test]
    fn word_end_states() {
        assert!(!State::B.is_word_end());
        assert!(!State::M.is_word_end());
        assert!(State::E.is_word_end());
        assert!(State::S.is_word_end());
    }

    #[test]
    fn label_string_renders_in_order() {
        assert_eq!(label_string(&[State::B, State::M, State::E, State::S]), "BMES");
        assert_eq!(label_string(&[]), "");
    }
}
