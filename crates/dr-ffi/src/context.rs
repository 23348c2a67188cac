use std::sync::Arc;

use dr_model::{AsciiTokenizer, ModelSpec, Tokenizer};

use crate::host::HostModel;

/// Opaque context handle that owns the spec, tokenizer, and the
/// host-registered model, if any.
pub struct DRContext {
    pub spec: ModelSpec,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub model: Option<Arc<HostModel>>,
}

impl DRContext {
    pub fn new(spec: ModelSpec) -> Self {
        Self {
            spec,
            tokenizer: Arc::new(AsciiTokenizer::new()),
            model: None,
        }
    }
}
