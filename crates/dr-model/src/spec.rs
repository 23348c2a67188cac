use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Fixed-shape contract of a packaged model.
///
/// The model consumes an input window of shape `[1, seq_len]` and produces
/// logits of shape `[1, seq_len, vocab_size]`. These values, together with
/// the sequence markers, are decided when the model is packaged and never
/// change at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Input window length (maximum token sequence length).
    pub seq_len: usize,
    /// Number of logits per sequence position.
    pub vocab_size: usize,
    /// Begin-of-sequence marker, prepended to every prompt. Only ever fed
    /// to the model, never produced by selection, so it may lie outside
    /// the vocabulary.
    pub bos_id: u32,
    /// End-of-sequence marker; selecting it stops generation.
    pub eos_id: u32,
}

impl Default for ModelSpec {
    /// The shipped reference instance: a 128-token window over a
    /// 32000-entry vocabulary with Llama-style markers.
    fn default() -> Self {
        ModelSpec {
            seq_len: 128,
            vocab_size: 32000,
            bos_id: 128000,
            eos_id: 2,
        }
    }
}

impl ModelSpec {
    /// Validate the spec's internal consistency.
    ///
    /// A spec that fails here is a construction-time failure: no adapter
    /// can be built on top of it and no generation can proceed.
    pub fn validate(&self) -> Result<()> {
        if self.seq_len == 0 {
            return Err(ModelError::InvalidSpec {
                field: "seq_len",
                value: 0,
                reason: "window must hold at least one token",
            });
        }
        if self.vocab_size == 0 {
            return Err(ModelError::InvalidSpec {
                field: "vocab_size",
                value: 0,
                reason: "vocabulary must be non-empty",
            });
        }
        if self.eos_id as usize >= self.vocab_size {
            return Err(ModelError::InvalidSpec {
                field: "eos_id",
                value: self.eos_id as u64,
                reason: "end marker must be selectable from the vocabulary",
            });
        }
        Ok(())
    }

    /// Parse and validate a spec from a JSON string.
    pub fn from_json_str(json: &str) -> Result<ModelSpec> {
        let spec: ModelSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load and validate a spec from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<ModelSpec> {
        let json = fs::read_to_string(path)?;
        ModelSpec::from_json_str(&json)
    }

    /// Number of elements in one logits block: `seq_len * vocab_size`.
    pub fn logits_len(&self) -> usize {
        self.seq_len * self.vocab_size
    }
}
