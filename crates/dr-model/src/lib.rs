pub mod adapter;
pub mod error;
pub mod placeholder;
pub mod spec;
pub mod tokenizer;

pub use adapter::InferenceAdapter;
pub use error::{ModelError, Result};
pub use placeholder::PlaceholderModel;
pub use spec::ModelSpec;
pub use tokenizer::{AsciiTokenizer, Tokenizer};
