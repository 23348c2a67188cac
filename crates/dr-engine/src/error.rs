use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("prompt needs {needed} tokens but the window holds {seq_len}")]
    PromptTooLong { needed: usize, seq_len: usize },
    #[error("adapter returned logits of shape {got:?}, expected {expected:?}")]
    BadLogitsShape { expected: Vec<usize>, got: Vec<usize> },
    #[error("no token could be selected from the score vector")]
    NoSelection,
    #[error("tensor error: {0}")]
    Tensor(#[from] dr_tensor::TensorError),
    #[error("model error: {0}")]
    Model(#[from] dr_model::ModelError),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
