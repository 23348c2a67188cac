//! `dr-engine` - Greedy autoregressive generation loop for decode-runtime.
//!
//! Each iteration rebuilds the fixed-shape padded input window from the
//! current token sequence, runs one full forward pass through the opaque
//! model adapter, slices next-token logits at the last valid position,
//! selects greedily, and stops on the end marker or the window cap.

pub mod error;
pub mod generate;
pub mod input;
pub mod logits;

pub use error::{GenerateError, Result};
pub use generate::{FinishReason, Generation, Generator};
