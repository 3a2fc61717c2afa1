//! Character vocabulary: dense ids assigned in order of first appearance.
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::utils::strip_content;

/// Mapping between corpus characters and dense `u32` ids.
///
/// Ids are 0-based and assigned in order of first occurrence, so building
/// twice from the same corpus always yields the same assignment. Only the
/// id-ordered character list is serialized; the lookup index is rebuilt on
/// load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<char>", into = "Vec<char>")]
pub struct Vocabulary {
    chars: Vec<char>,
    ids: AHashMap<char, u32>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from corpus lines. Punctuation and whitespace are removed
    /// before scanning; lines left empty contribute nothing.
    pub fn build<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for line in lines {
            vocab.extend_from_line(line.as_ref());
        }
        vocab
    }

    /// Add every not-yet-seen content character of `line`.
    pub fn extend_from_line(&mut self, line: &str) {
        for ch in strip_content(line).chars() {
            self.insert(ch);
        }
    }

    /// Insert a character, returning its id (existing or fresh).
    pub fn insert(&mut self, ch: char) -> u32 {
        if let Some(&id) = self.ids.get(&ch) {
            return id;
        }
        let id = self.chars.len() as u32;
        self.chars.push(ch);
        self.ids.insert(ch, id);
        id
    }

    /// Id of `ch`, or `None` if the character never appeared in training.
    pub fn id(&self, ch: char) -> Option<u32> {
        self.ids.get(&ch).copied()
    }

    /// Character with the given id.
    pub fn char_at(&self, id: u32) -> Option<char> {
        self.chars.get(id as usize).copied()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.ids.contains_key(&ch)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Characters in id order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.chars == other.chars
    }
}

impl Eq for Vocabulary {}

impl From<Vec<char>> for Vocabulary {
    fn from(chars: Vec<char>) -> Self {
        let mut vocab = Self::new();
        for ch in chars {
            vocab.insert(ch);
        }
        vocab
    }
}

impl From<Vocabulary> for Vec<char> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.chars
    }
}
