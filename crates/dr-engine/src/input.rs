use dr_tensor::{DType, Shape, Tensor};

use crate::error::Result;

/// Build the fixed-shape input window from the current token sequence.
///
/// The result has shape `[1, seq_len]` and dtype f32. The first
/// `min(tokens.len(), seq_len)` entries are the token ids converted to
/// f32; every entry past the sequence is zero. Zero is the documented pad
/// value, not an accident of allocation. Tokens beyond the window are
/// ignored.
///
/// Fails only if the window cannot be allocated; that failure is terminal
/// for the enclosing generation call.
pub fn build_input(tokens: &[u32], seq_len: usize) -> Result<Tensor> {
    let mut input = Tensor::zeros(DType::F32, Shape::new(vec![1, seq_len]))?;
    for (pos, &tok) in tokens.iter().enumerate() {
        if pos >= seq_len {
            break;
        }
        input.set_f32(pos, tok as f32)?;
    }
    Ok(input)
}
