use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model spec: {0}")]
    Spec(#[from] serde_json::Error),
    #[error("invalid model spec: {field} = {value} ({reason})")]
    InvalidSpec {
        field: &'static str,
        value: u64,
        reason: &'static str,
    },
    #[error("no model loaded")]
    NotLoaded,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("tensor error: {0}")]
    Tensor(#[from] dr_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
