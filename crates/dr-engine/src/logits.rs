use dr_model::ModelSpec;
use dr_tensor::Tensor;

use crate::error::{GenerateError, Result};

/// Slice next-token scores out of a logits block.
///
/// `logits` must have shape `[1, seq_len, vocab_size]` per the adapter
/// contract; `pos` is the zero-based index of the last valid sequence
/// position. Returns the `vocab_size` scores at `[0, pos, ..]`, widened
/// to f32 if the adapter produced half precision.
///
/// The loop invariant keeps `pos` in bounds; the shape check exists
/// because the adapter may be host code across an FFI boundary and its
/// output cannot be trusted the way an internal caller can.
pub fn scores_at(logits: &Tensor, spec: &ModelSpec, pos: usize) -> Result<Vec<f32>> {
    let expected = [1, spec.seq_len, spec.vocab_size];
    if logits.shape().dims() != expected {
        return Err(GenerateError::BadLogitsShape {
            expected: expected.to_vec(),
            got: logits.shape().dims().to_vec(),
        });
    }
    debug_assert!(pos < spec.seq_len, "position {pos} outside window");

    let start = pos * spec.vocab_size;
    Ok(logits.gather_f32(start, spec.vocab_size)?)
}
