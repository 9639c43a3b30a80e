use std::sync::Arc;
use ort::session::Session;
use tokenizers::Tokenizer;
use log::debug;

use super::error::ClassifierError;
use super::encoding::SequenceEncoding;
use super::logits::Logits;
use super::{Classifiable, ClassifierInfo};
use crate::ModelCharacteristics;

/// A thread-safe binary sequence classifier backed by an ONNX model.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync` because all of its fields are thread-safe:
/// - `String` and `ModelCharacteristics` are `Send + Sync`
/// - `Tokenizer` and `Session` are wrapped in `Arc`
///
/// ONNX Runtime allows concurrent `Run` calls on one session, so a single
/// instance can be shared by every request handler without a lock:
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use cdm_classifier::{BinaryBert, Classifiable};
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(BinaryBert::builder()
///     .with_model_files("model/model.onnx", "model/tokenizer.json", Some(512))?
///     .build()?);
///
/// let classifier_clone = Arc::clone(&classifier);
/// thread::spawn(move || {
///     classifier_clone.predict("paciente con fiebre").unwrap();
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BinaryBert {
    pub(crate) name: String,
    pub(crate) model_path: String,
    pub(crate) tokenizer_path: String,
    pub(crate) tokenizer: Arc<Tokenizer>,
    pub(crate) session: Arc<Session>,
    pub(crate) model_characteristics: ModelCharacteristics,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<BinaryBert>();
    }
};

impl SequenceEncoding for BinaryBert {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&*self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&*self.session)
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.model_characteristics.max_sequence_length)
    }
}

impl BinaryBert {
    /// Creates a new BinaryBertBuilder for fluent construction
    pub fn builder() -> super::builder::BinaryBertBuilder {
        super::builder::BinaryBertBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            name: self.name.clone(),
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            max_sequence_length: self.model_characteristics.max_sequence_length,
        }
    }

    /// Returns the number of tokens the model sees for the input text.
    /// Never exceeds `max_sequence_length`, since longer inputs are truncated.
    pub fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        SequenceEncoding::count_tokens(self, text)
    }

    /// Number of classes the model scores
    pub fn num_labels(&self) -> usize {
        self.model_characteristics.num_labels
    }
}

/// Rejects a model output whose width differs from the label count seen at build time.
pub(crate) fn check_label_count(logits: Logits, num_labels: usize) -> Result<Logits, ClassifierError> {
    if logits.len() != num_labels {
        return Err(ClassifierError::InferenceError(format!(
            "Expected {} logits, model returned {}",
            num_labels,
            logits.len()
        )));
    }
    Ok(logits)
}

impl Classifiable for BinaryBert {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, text: &str) -> Result<Logits, ClassifierError> {
        if text.is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let logits = check_label_count(self.classify_text(text)?, self.model_characteristics.num_labels)?;

        debug!("Classified text into class {:?}", logits.predicted_class());
        Ok(logits)
    }
}
