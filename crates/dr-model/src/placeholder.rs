use dr_tensor::{DType, Shape, Tensor};

use crate::adapter::InferenceAdapter;
use crate::error::{ModelError, Result};
use crate::spec::ModelSpec;

/// Deterministic stand-in for a packaged model.
///
/// **Not a real model.** At every window position it scores the successor
/// id `(token + 1) % vocab_size` highest, so greedy selection walks the
/// vocabulary one id at a time. Exists so the runtime can be exercised
/// end-to-end without a packaged model; real deployments register a host
/// adapter instead.
pub struct PlaceholderModel {
    spec: ModelSpec,
}

impl PlaceholderModel {
    /// Build a placeholder over a validated spec.
    pub fn new(spec: ModelSpec) -> Result<PlaceholderModel> {
        spec.validate()?;
        Ok(PlaceholderModel { spec })
    }
}

impl InferenceAdapter for PlaceholderModel {
    fn infer(&self, input: &Tensor) -> Result<Tensor> {
        let dims = input.shape().dims();
        if dims != [1, self.spec.seq_len] {
            return Err(ModelError::Inference(format!(
                "input shape {} does not match window [1, {}]",
                input.shape(),
                self.spec.seq_len
            )));
        }

        let window = input.data_f32()?;
        let mut logits = Tensor::zeros(
            DType::F32,
            Shape::new(vec![1, self.spec.seq_len, self.spec.vocab_size]),
        )?;
        for (pos, &tok) in window.iter().enumerate() {
            let successor = (tok as usize + 1) % self.spec.vocab_size;
            logits.set_f32(pos * self.spec.vocab_size + successor, 1.0)?;
        }
        Ok(logits)
    }

    fn spec(&self) -> &ModelSpec {
        &self.spec
    }
}
