/// Trait for strategies that select the next token from a score vector.
///
/// The scores are the logits for one sequence position, indexed by token
/// id. Returning `None` means no selection was possible (empty input).
pub trait Sampler: Send + Sync {
    /// Returns the name of this sampler.
    fn name(&self) -> &str;

    /// Select a token id from the given scores.
    fn sample(&self, scores: &[f32]) -> Option<u32>;
}
