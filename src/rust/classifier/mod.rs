mod error;
mod encoding;
mod logits;
mod binary_bert;
pub mod builder;

pub use error::ClassifierError;
pub use logits::Logits;
pub use binary_bert::BinaryBert;
pub use builder::BinaryBertBuilder;

/// Name reported for the ONNX-backed binary classifier unless overridden.
pub const DEFAULT_CLASSIFIER_NAME: &str = "BinaryBERT";

/// A model that maps text to class logits.
///
/// Implementations must be safe to call concurrently from several request
/// handlers. A model whose runtime cannot run concurrent inference has to
/// serialize access internally.
pub trait Classifiable: Send + Sync {
    /// Identifying name of the concrete model. It is written into the
    /// envelope as the processing pipeline name and the service model.
    fn name(&self) -> &str;

    /// Produces raw logits for non-empty text.
    fn predict(&self, text: &str) -> Result<Logits, ClassifierError>;
}

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Name written into the envelope
    pub name: String,
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the tokenizer file
    pub tokenizer_path: String,
    /// Maximum number of tokens fed to the model; longer inputs are truncated
    pub max_sequence_length: usize,
}
