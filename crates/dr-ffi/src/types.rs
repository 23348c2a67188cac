use std::os::raw::{c_char, c_void};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DRStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorModelInit = 2,
    ErrorGenerate = 3,
    ErrorInternal = 4,
}

/// Inference callback registered by the host.
///
/// The runtime calls it once per decode step with the padded input window
/// (`input_len` f32 token values, zero beyond the sequence). The host runs
/// its packaged model and writes `logits_len` f32 values into
/// `logits_out`, one score per `(position, vocab entry)` pair in
/// row-major order.
/// Returns true on success; false aborts the current generation.
pub type DRInferCallback = Option<
    extern "C" fn(
        input: *const f32,
        input_len: usize,
        logits_out: *mut f32,
        logits_len: usize,
        user_data: *mut c_void,
    ) -> bool,
>;

/// Callback receiving one decoded fragment per accepted token.
pub type DRTokenCallback =
    Option<extern "C" fn(fragment: *const c_char, user_data: *mut c_void)>;
