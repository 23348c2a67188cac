use dr_tensor::Tensor;

use crate::spec::ModelSpec;

/// Trait for the opaque inference boundary to a packaged model.
///
/// Implementations own (or bridge to) an initialized model resource and
/// run one full forward pass per call over the padded input window. The
/// runtime assumes nothing about what happens behind this trait: no state
/// is retained between calls and no cache is reused.
pub trait InferenceAdapter: Send + Sync {
    /// Run one forward pass.
    ///
    /// - `input`: f32 tensor of shape `[1, spec().seq_len]`, token ids in
    ///   the leading positions and zero padding beyond them.
    ///
    /// Returns logits of shape `[1, spec().seq_len, spec().vocab_size]`.
    /// Any failure is terminal for the current generation; callers do not
    /// retry.
    fn infer(&self, input: &Tensor) -> crate::Result<Tensor>;

    /// Returns the fixed-shape contract this adapter was built against.
    fn spec(&self) -> &ModelSpec;
}
