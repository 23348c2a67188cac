use std::sync::Arc;

use tracing::{debug, trace};

use dr_model::{InferenceAdapter, Tokenizer};
use dr_sampler::{GreedySampler, Sampler};

use crate::error::{GenerateError, Result};
use crate::{input, logits};

/// Why a generation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The end-of-sequence marker was selected.
    Eos,
    /// The window filled up before the end marker appeared.
    MaxLen,
}

/// The outcome of one completed generation run.
///
/// `tokens` holds only the generated ids; the BOS marker and the encoded
/// prompt are not included, and neither is the EOS marker.
#[derive(Debug, Clone)]
pub struct Generation {
    pub tokens: Vec<u32>,
    pub text: String,
    pub finish: FinishReason,
}

/// Drives the autoregressive decode loop over an opaque model.
///
/// Holds shared references to an initialized adapter and tokenizer; the
/// loop itself keeps no state between calls, so independent `generate`
/// calls are safe from separate threads.
pub struct Generator {
    adapter: Arc<dyn InferenceAdapter>,
    tokenizer: Arc<dyn Tokenizer>,
    sampler: GreedySampler,
}

impl Generator {
    pub fn new(adapter: Arc<dyn InferenceAdapter>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Generator {
            adapter,
            tokenizer,
            sampler: GreedySampler::new(),
        }
    }

    /// Generate from a prompt, buffering the decoded output.
    pub fn generate(&self, prompt: &str) -> Result<Generation> {
        self.generate_stream(prompt, |_| {})
    }

    /// Generate from a prompt, pushing each decoded fragment into `sink`
    /// as soon as its token is accepted.
    ///
    /// Emission is append-only: fragments already delivered stay valid
    /// even when a later iteration fails and the call returns an error.
    pub fn generate_stream<F>(&self, prompt: &str, mut sink: F) -> Result<Generation>
    where
        F: FnMut(&str),
    {
        let spec = self.adapter.spec();

        // Seed: begin marker, then the encoded prompt.
        let mut tokens: Vec<u32> = Vec::with_capacity(spec.seq_len);
        tokens.push(spec.bos_id);
        tokens.extend(self.tokenizer.encode(prompt));
        if tokens.len() > spec.seq_len {
            return Err(GenerateError::PromptTooLong {
                needed: tokens.len(),
                seq_len: spec.seq_len,
            });
        }
        debug!(seeded = tokens.len(), window = spec.seq_len, "starting generation");

        let mut generated = Vec::new();
        let mut text = String::new();
        let mut finish = FinishReason::MaxLen;

        for step in 0..spec.seq_len - 1 {
            if tokens.len() >= spec.seq_len {
                break;
            }

            // Every step is a full forward pass over the padded window;
            // the model retains nothing between calls.
            let window = input::build_input(&tokens, spec.seq_len)?;
            let block = self.adapter.infer(&window)?;
            let scores = logits::scores_at(&block, spec, tokens.len() - 1)?;
            let next = self
                .sampler
                .sample(&scores)
                .ok_or(GenerateError::NoSelection)?;
            trace!(step, next, "selected token");

            if next == spec.eos_id {
                debug!(step, "end marker selected");
                finish = FinishReason::Eos;
                break;
            }

            tokens.push(next);
            generated.push(next);
            let fragment = self.tokenizer.decode(&[next]);
            text.push_str(&fragment);
            sink(&fragment);
        }

        debug!(generated = generated.len(), ?finish, "generation finished");
        Ok(Generation {
            tokens: generated,
            text,
            finish,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use dr_model::{AsciiTokenizer, ModelError, ModelSpec, PlaceholderModel};
    use dr_tensor::{DType, Shape, Tensor};

    fn small_spec() -> ModelSpec {
        ModelSpec {
            seq_len: 16,
            vocab_size: 128,
            bos_id: 1,
            eos_id: 2,
        }
    }

    /// One scripted adapter response.
    enum Step {
        /// Return logits whose argmax at every position is this id.
        Peak(u32),
        /// Fail the inference call.
        Fail,
    }

    /// Adapter that replays a script; the last step repeats forever.
    struct ScriptedModel {
        spec: ModelSpec,
        script: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(spec: ModelSpec, script: Vec<Step>) -> Self {
            ScriptedModel {
                spec,
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl InferenceAdapter for ScriptedModel {
        fn infer(&self, _input: &Tensor) -> dr_model::Result<Tensor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let step = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                match script.front() {
                    Some(Step::Peak(id)) => Step::Peak(*id),
                    Some(Step::Fail) => Step::Fail,
                    None => Step::Fail,
                }
            };
            match step {
                Step::Peak(id) => {
                    let mut block = Tensor::zeros(
                        DType::F32,
                        Shape::new(vec![1, self.spec.seq_len, self.spec.vocab_size]),
                    )
                    .unwrap();
                    for pos in 0..self.spec.seq_len {
                        block
                            .set_f32(pos * self.spec.vocab_size + id as usize, 1.0)
                            .unwrap();
                    }
                    Ok(block)
                }
                Step::Fail => Err(ModelError::Inference("scripted failure".into())),
            }
        }

        fn spec(&self) -> &ModelSpec {
            &self.spec
        }
    }

    fn generator(model: Arc<ScriptedModel>) -> Generator {
        Generator::new(model, Arc::new(AsciiTokenizer::new()))
    }

    #[test]
    fn test_immediate_eos_stops_after_one_call() {
        // "Hi" seeds [bos, 72, 105]; the first selection is already EOS,
        // so exactly one inference runs and nothing is generated.
        let model = Arc::new(ScriptedModel::new(small_spec(), vec![Step::Peak(2)]));
        let gen = generator(model.clone());

        let out = gen.generate("Hi").unwrap();
        assert_eq!(out.finish, FinishReason::Eos);
        assert!(out.tokens.is_empty());
        assert!(out.text.is_empty());
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn test_generates_until_eos() {
        let model = Arc::new(ScriptedModel::new(
            small_spec(),
            vec![Step::Peak(111), Step::Peak(107), Step::Peak(2)],
        ));
        let gen = generator(model.clone());

        let mut fragments = Vec::new();
        let out = gen.generate_stream("Hi", |f| fragments.push(f.to_string())).unwrap();

        assert_eq!(out.finish, FinishReason::Eos);
        assert_eq!(out.tokens, vec![111, 107]);
        assert_eq!(out.text, "ok");
        assert_eq!(fragments, vec!["o", "k"]);
        assert_eq!(model.calls(), 3);
    }

    #[test]
    fn test_eos_never_appears_in_output() {
        let model = Arc::new(ScriptedModel::new(
            small_spec(),
            vec![Step::Peak(88), Step::Peak(2)],
        ));
        let out = generator(model).generate("a").unwrap();
        assert!(!out.tokens.contains(&2));
    }

    #[test]
    fn test_window_cap_without_eos() {
        // No EOS ever: an empty prompt seeds one token, so the window
        // admits seq_len - 1 generated tokens and the loop stops there.
        let spec = ModelSpec {
            seq_len: 6,
            ..small_spec()
        };
        let model = Arc::new(ScriptedModel::new(spec, vec![Step::Peak(65)]));
        let gen = generator(model.clone());

        let out = gen.generate("").unwrap();
        assert_eq!(out.finish, FinishReason::MaxLen);
        assert_eq!(out.tokens, vec![65; 5]);
        assert_eq!(out.text, "AAAAA");
        assert_eq!(model.calls(), 5);
    }

    #[test]
    fn test_window_cap_with_prompt() {
        let spec = ModelSpec {
            seq_len: 6,
            ..small_spec()
        };
        let model = Arc::new(ScriptedModel::new(spec, vec![Step::Peak(65)]));
        let gen = generator(model.clone());

        // "abc" seeds 4 tokens; only 2 slots remain.
        let out = gen.generate("abc").unwrap();
        assert_eq!(out.finish, FinishReason::MaxLen);
        assert_eq!(out.tokens.len(), 2);
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_prompt_too_long_rejected_before_inference() {
        let spec = ModelSpec {
            seq_len: 4,
            ..small_spec()
        };
        let model = Arc::new(ScriptedModel::new(spec, vec![Step::Peak(65)]));
        let gen = generator(model.clone());

        let err = gen.generate("abcd").unwrap_err();
        assert!(matches!(err, GenerateError::PromptTooLong { needed: 5, seq_len: 4 }));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn test_inference_failure_aborts_keeping_emitted() {
        let model = Arc::new(ScriptedModel::new(
            small_spec(),
            vec![Step::Peak(72), Step::Fail],
        ));
        let gen = generator(model.clone());

        let mut fragments = Vec::new();
        let err = gen
            .generate_stream("x", |f| fragments.push(f.to_string()))
            .unwrap_err();

        // The failure is terminal, but the fragment emitted before it
        // was delivered and stays delivered.
        assert!(matches!(err, GenerateError::Model(_)));
        assert_eq!(fragments, vec!["H"]);
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_bad_adapter_shape_is_an_error() {
        struct WrongShapeModel {
            spec: ModelSpec,
        }
        impl InferenceAdapter for WrongShapeModel {
            fn infer(&self, _input: &Tensor) -> dr_model::Result<Tensor> {
                Ok(Tensor::zeros(DType::F32, Shape::new(vec![1, 2, 3])).unwrap())
            }
            fn spec(&self) -> &ModelSpec {
                &self.spec
            }
        }

        let gen = Generator::new(
            Arc::new(WrongShapeModel { spec: small_spec() }),
            Arc::new(AsciiTokenizer::new()),
        );
        assert!(matches!(
            gen.generate("Hi").unwrap_err(),
            GenerateError::BadLogitsShape { .. }
        ));
    }

    #[test]
    fn test_placeholder_model_walks_vocabulary() {
        // The placeholder scores (token + 1) % vocab highest, so from
        // "Hi" (last id 105) the output walks 106, 107, ... until the
        // window fills.
        let spec = ModelSpec {
            seq_len: 8,
            vocab_size: 300,
            bos_id: 1,
            eos_id: 2,
        };
        let model = Arc::new(PlaceholderModel::new(spec).unwrap());
        let gen = Generator::new(model, Arc::new(AsciiTokenizer::new()));

        let out = gen.generate("Hi").unwrap();
        assert_eq!(out.finish, FinishReason::MaxLen);
        assert_eq!(out.tokens, vec![106, 107, 108, 109, 110]);
        assert_eq!(out.text, "jklmn");
    }
}
