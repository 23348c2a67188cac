mod context;
mod error;
mod host;
mod types;

pub use context::*;
pub use host::*;
pub use types::*;

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use dr_engine::Generator;
use dr_model::{InferenceAdapter, ModelSpec};

use error::set_last_error;

/// Execute a closure that returns a `DRStatus`, catching any panics
/// and converting them into `DRStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> DRStatus>(f: F) -> DRStatus {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            DRStatus::ErrorInternal
        }
    }
}

/// Create a new runtime context.
///
/// `spec_json` describes the packaged model's fixed shapes (see
/// `ModelSpec`); pass null for the shipped reference instance. On
/// success, writes a heap-allocated `DRContext` pointer into `*ctx_out`
/// and returns `DRStatus::Ok`. The caller must later call
/// `dr_context_destroy` to free the context.
///
/// A spec that fails to parse or validate is a construction-time failure:
/// no context is produced and nothing can be generated.
#[no_mangle]
pub unsafe extern "C" fn dr_context_create(
    spec_json: *const c_char,
    ctx_out: *mut *mut DRContext,
) -> DRStatus {
    catch_panic(|| {
        if ctx_out.is_null() {
            set_last_error("ctx_out is null".to_string());
            return DRStatus::ErrorInvalidArgument;
        }

        let spec = if spec_json.is_null() {
            ModelSpec::default()
        } else {
            let json = match unsafe { CStr::from_ptr(spec_json) }.to_str() {
                Ok(s) => s,
                Err(e) => {
                    set_last_error(format!("invalid spec string: {}", e));
                    return DRStatus::ErrorInvalidArgument;
                }
            };
            match ModelSpec::from_json_str(json) {
                Ok(s) => s,
                Err(e) => {
                    set_last_error(format!("failed to load model spec: {}", e));
                    return DRStatus::ErrorModelInit;
                }
            }
        };

        let ctx = Box::new(DRContext::new(spec));
        unsafe {
            *ctx_out = Box::into_raw(ctx);
        }
        DRStatus::Ok
    })
}

/// Destroy a context previously created by `dr_context_create`.
///
/// Passing a null pointer is a no-op and returns `DRStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn dr_context_destroy(ctx: *mut DRContext) -> DRStatus {
    if ctx.is_null() {
        return DRStatus::Ok;
    }
    drop(Box::from_raw(ctx));
    DRStatus::Ok
}

/// Register the host's inference callback.
///
/// The host keeps ownership of the packaged model; the runtime calls
/// `callback` once per decode step with the padded input window and a
/// logits buffer to fill. The callback and `user_data` must remain valid
/// until the context is destroyed and must be callable from whichever
/// thread runs generation.
#[no_mangle]
pub unsafe extern "C" fn dr_context_set_model(
    ctx: *mut DRContext,
    callback: DRInferCallback,
    user_data: *mut c_void,
) -> DRStatus {
    catch_panic(|| {
        if ctx.is_null() {
            set_last_error("ctx is null".to_string());
            return DRStatus::ErrorInvalidArgument;
        }
        let callback = match callback {
            Some(cb) => cb,
            None => {
                set_last_error("inference callback is null".to_string());
                return DRStatus::ErrorInvalidArgument;
            }
        };

        let ctx = unsafe { &mut *ctx };
        ctx.model = Some(Arc::new(HostModel::new(
            ctx.spec.clone(),
            callback,
            user_data,
        )));
        DRStatus::Ok
    })
}

fn generator_for(ctx: &DRContext) -> Option<Generator> {
    let model = ctx.model.as_ref()?.clone();
    Some(Generator::new(
        model as Arc<dyn InferenceAdapter>,
        ctx.tokenizer.clone(),
    ))
}

/// Generate text from a prompt (non-streaming).
///
/// On success, writes a heap-allocated C string into `*output`.
/// The caller must later call `dr_free_string` to free the output string.
#[no_mangle]
pub unsafe extern "C" fn dr_generate(
    ctx: *mut DRContext,
    prompt: *const c_char,
    output: *mut *mut c_char,
) -> DRStatus {
    catch_panic(|| {
        if ctx.is_null() || prompt.is_null() || output.is_null() {
            set_last_error("null argument".to_string());
            return DRStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        let prompt_str = match unsafe { CStr::from_ptr(prompt) }.to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(format!("invalid prompt: {}", e));
                return DRStatus::ErrorInvalidArgument;
            }
        };

        let generator = match generator_for(ctx) {
            Some(g) => g,
            None => {
                set_last_error("no model registered".to_string());
                return DRStatus::ErrorGenerate;
            }
        };

        let out = match generator.generate(prompt_str) {
            Ok(o) => o,
            Err(e) => {
                set_last_error(format!("generation failed: {}", e));
                return DRStatus::ErrorGenerate;
            }
        };

        match CString::new(out.text) {
            Ok(c) => {
                unsafe { *output = c.into_raw() };
                DRStatus::Ok
            }
            Err(e) => {
                set_last_error(format!("output encoding error: {}", e));
                DRStatus::ErrorGenerate
            }
        }
    })
}

/// Generate text from a prompt with streaming output.
///
/// Each decoded fragment is passed to `callback` as a C string the moment
/// its token is accepted. Fragments already delivered stay delivered even
/// if a later step fails and the call returns an error.
#[no_mangle]
pub unsafe extern "C" fn dr_generate_streaming(
    ctx: *mut DRContext,
    prompt: *const c_char,
    callback: DRTokenCallback,
    user_data: *mut c_void,
) -> DRStatus {
    catch_panic(|| {
        if ctx.is_null() || prompt.is_null() {
            set_last_error("null argument".to_string());
            return DRStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        let prompt_str = match unsafe { CStr::from_ptr(prompt) }.to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(format!("invalid prompt: {}", e));
                return DRStatus::ErrorInvalidArgument;
            }
        };

        let generator = match generator_for(ctx) {
            Some(g) => g,
            None => {
                set_last_error("no model registered".to_string());
                return DRStatus::ErrorGenerate;
            }
        };

        let result = generator.generate_stream(prompt_str, |fragment| {
            if let Some(cb) = callback {
                // Fragments with interior nuls cannot cross the boundary;
                // skip them rather than abort the run.
                if let Ok(c_str) = CString::new(fragment) {
                    cb(c_str.as_ptr(), user_data);
                }
            }
        });

        match result {
            Ok(_) => DRStatus::Ok,
            Err(e) => {
                set_last_error(format!("generation failed: {}", e));
                DRStatus::ErrorGenerate
            }
        }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `dr_free_string`.
#[no_mangle]
pub extern "C" fn dr_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `dr_generate` or `dr_last_error`.
#[no_mangle]
pub unsafe extern "C" fn dr_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
