use std::os::raw::c_void;

use dr_model::{InferenceAdapter, ModelError, ModelSpec};
use dr_tensor::{Shape, Tensor, TensorError};

/// Adapter over a host-registered inference callback.
///
/// The packaged model stays on the host side of the FFI boundary; this
/// adapter hands it the padded input window and wraps whatever logits it
/// writes back into the tensor the engine expects.
pub struct HostModel {
    spec: ModelSpec,
    callback: extern "C" fn(
        input: *const f32,
        input_len: usize,
        logits_out: *mut f32,
        logits_len: usize,
        user_data: *mut c_void,
    ) -> bool,
    user_data: *mut c_void,
}

// Safety: registering a callback commits the host to making it (and the
// user_data it closes over) callable from any thread, as documented on
// `dr_context_set_model`. The runtime itself never mutates through
// `user_data`.
unsafe impl Send for HostModel {}
unsafe impl Sync for HostModel {}

impl HostModel {
    pub fn new(
        spec: ModelSpec,
        callback: extern "C" fn(*const f32, usize, *mut f32, usize, *mut c_void) -> bool,
        user_data: *mut c_void,
    ) -> Self {
        HostModel {
            spec,
            callback,
            user_data,
        }
    }
}

impl InferenceAdapter for HostModel {
    fn infer(&self, input: &Tensor) -> dr_model::Result<Tensor> {
        let window = input.data_f32()?;
        if window.len() != self.spec.seq_len {
            return Err(ModelError::Inference(format!(
                "input window holds {} values, expected {}",
                window.len(),
                self.spec.seq_len
            )));
        }

        let logits_len = self.spec.logits_len();
        let mut logits: Vec<f32> = Vec::new();
        logits
            .try_reserve_exact(logits_len)
            .map_err(|_| TensorError::Allocation { elems: logits_len })?;
        logits.resize(logits_len, 0.0);

        let ok = (self.callback)(
            window.as_ptr(),
            window.len(),
            logits.as_mut_ptr(),
            logits.len(),
            self.user_data,
        );
        if !ok {
            return Err(ModelError::Inference(
                "host inference callback reported failure".to_string(),
            ));
        }

        Ok(Tensor::new(
            logits,
            Shape::new(vec![1, self.spec.seq_len, self.spec.vocab_size]),
        ))
    }

    fn spec(&self) -> &ModelSpec {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dr_tensor::DType;
    use std::ptr;

    fn small_spec() -> ModelSpec {
        ModelSpec {
            seq_len: 4,
            vocab_size: 10,
            bos_id: 1,
            eos_id: 2,
        }
    }

    /// Scores the successor of each position's token, like the in-crate
    /// placeholder model, but from the far side of the callback.
    extern "C" fn successor_cb(
        input: *const f32,
        input_len: usize,
        logits_out: *mut f32,
        logits_len: usize,
        _user_data: *mut c_void,
    ) -> bool {
        let window = unsafe { std::slice::from_raw_parts(input, input_len) };
        let logits = unsafe { std::slice::from_raw_parts_mut(logits_out, logits_len) };
        let vocab = logits_len / input_len;
        for (pos, &tok) in window.iter().enumerate() {
            logits[pos * vocab + (tok as usize + 1) % vocab] = 1.0;
        }
        true
    }

    extern "C" fn failing_cb(
        _input: *const f32,
        _input_len: usize,
        _logits_out: *mut f32,
        _logits_len: usize,
        _user_data: *mut c_void,
    ) -> bool {
        false
    }

    #[test]
    fn test_wraps_host_logits() {
        let model = HostModel::new(small_spec(), successor_cb, ptr::null_mut());
        let mut input = Tensor::zeros(DType::F32, Shape::new(vec![1, 4])).unwrap();
        input.set_f32(0, 7.0).unwrap();

        let logits = model.infer(&input).unwrap();
        assert_eq!(logits.shape().dims(), &[1, 4, 10]);
        let scores = logits.gather_f32(0, 10).unwrap();
        assert_eq!(scores[8], 1.0);
    }

    #[test]
    fn test_callback_failure_is_inference_error() {
        let model = HostModel::new(small_spec(), failing_cb, ptr::null_mut());
        let input = Tensor::zeros(DType::F32, Shape::new(vec![1, 4])).unwrap();
        assert!(matches!(
            model.infer(&input),
            Err(ModelError::Inference(_))
        ));
    }

    #[test]
    fn test_wrong_window_rejected() {
        let model = HostModel::new(small_spec(), successor_cb, ptr::null_mut());
        let input = Tensor::zeros(DType::F32, Shape::new(vec![1, 3])).unwrap();
        assert!(model.infer(&input).is_err());
    }
}
