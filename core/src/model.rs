//! Immutable HMM: initial distribution, transition and emission matrices,
//! and the vocabulary that indexes emission columns.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{HmmError, Result};
use crate::state::{State, STATE_COUNT};
use crate::vocab::Vocabulary;

/// Sentences open with either a multi-character word (B) or a
/// single-character word (S); M and E can never come first.
pub const INITIAL_DISTRIBUTION: [f64; STATE_COUNT] = [0.5, 0.0, 0.0, 0.5];

/// Trained segmentation model.
///
/// Built once per training run and never mutated. Construction goes
/// through [`HmmModel::assemble`], which is also applied when a model is
/// read back from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelParts", into = "ModelParts")]
pub struct HmmModel {
    initial: [f64; STATE_COUNT],
    transition: [[f64; STATE_COUNT]; STATE_COUNT],
    /// emission[s][c] = P(character id c | state s)
    emission: Vec<Vec<f64>>,
    vocab: Vocabulary,
}

/// Unchecked on-disk layout of [`HmmModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelParts {
    initial: Vec<f64>,
    transition: Vec<Vec<f64>>,
    emission: Vec<Vec<f64>>,
    vocab: Vocabulary,
}

impl TryFrom<ModelParts> for HmmModel {
    type Error = HmmError;

    fn try_from(parts: ModelParts) -> Result<Self> {
        HmmModel::assemble(parts.initial, parts.transition, parts.emission, parts.vocab)
    }
}

impl From<HmmModel> for ModelParts {
    fn from(model: HmmModel) -> Self {
        Self {
            initial: model.initial.to_vec(),
            transition: model.transition.iter().map(|row| row.to_vec()).collect(),
            emission: model.emission,
            vocab: model.vocab,
        }
    }
}

impl HmmModel {
    /// Bundle the matrices into a model.
    ///
    /// Fails with [`HmmError::Dimension`] unless `initial` has 4 entries,
    /// `transition` is 4x4 and `emission` is 4xV for the vocabulary size V.
    /// Values themselves are taken as given.
    pub fn assemble(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
        vocab: Vocabulary,
    ) -> Result<Self> {
        let initial: [f64; STATE_COUNT] =
            initial
                .as_slice()
                .try_into()
                .map_err(|_| HmmError::Dimension {
                    what: "initial distribution length",
                    expected: STATE_COUNT,
                    found: initial.len(),
                })?;

        check_len("transition rows", STATE_COUNT, transition.len())?;
        let mut trans = [[0.0; STATE_COUNT]; STATE_COUNT];
        for (dst, row) in trans.iter_mut().zip(&transition) {
            check_len("transition columns", STATE_COUNT, row.len())?;
            dst.copy_from_slice(row);
        }

        check_len("emission rows", STATE_COUNT, emission.len())?;
        for row in &emission {
            check_len("emission columns", vocab.len(), row.len())?;
        }

        Ok(Self {
            initial,
            transition: trans,
            emission,
            vocab,
        })
    }

    pub fn initial(&self) -> &[f64; STATE_COUNT] {
        &self.initial
    }

    pub fn transition(&self) -> &[[f64; STATE_COUNT]; STATE_COUNT] {
        &self.transition
    }

    pub fn emission(&self) -> &[Vec<f64>] {
        &self.emission
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn initial_prob(&self, state: State) -> f64 {
        self.initial[state.index()]
    }

    pub fn transition_prob(&self, from: State, to: State) -> f64 {
        self.transition[from.index()][to.index()]
    }

    /// P(ch | state), or `None` when `ch` is not in the vocabulary.
    pub fn emission_prob(&self, state: State, ch: char) -> Option<f64> {
        let id = self.vocab.id(ch)? as usize;
        self.emission[state.index()].get(id).copied()
    }

    /// Write the model with bincode.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        Ok(())
    }

    /// Read a model written by [`HmmModel::save_bincode`].
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model: Self = bincode::deserialize_from(reader)?;
        Ok(model)
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(HmmError::Dimension {
            what,
            expected,
            found,
        })
    }
}
