use std::path::Path;
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use ort::session::Session;
use log::{info, error};

use super::error::ClassifierError;
use super::encoding::SequenceEncoding;
use super::binary_bert::BinaryBert;
use super::DEFAULT_CLASSIFIER_NAME;
use crate::{ModelCharacteristics, ModelInfo, ModelManager, runtime::{RuntimeConfig, create_session_builder}};

/// Sequence length used when the caller does not provide one (BERT-base limit)
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 512;

/// A builder for constructing a BinaryBert classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct BinaryBertBuilder {
    name: Option<String>,
    model_path: Option<String>,
    tokenizer_path: Option<String>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    max_sequence_length: Option<usize>,
    runtime_config: RuntimeConfig,
}

impl SequenceEncoding for BinaryBertBuilder {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        self.tokenizer.as_ref()
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        self.max_sequence_length
    }
}

impl BinaryBertBuilder {
    /// Creates a new empty BinaryBertBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use cdm_classifier::BinaryBertBuilder;
    ///
    /// let builder = BinaryBertBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution.
    /// Must be called before the model is loaded to take effect.
    ///
    /// # Example
    /// ```
    /// use cdm_classifier::{BinaryBertBuilder, RuntimeConfig};
    ///
    /// let config = RuntimeConfig::default();
    /// let builder = BinaryBertBuilder::new()
    ///     .with_runtime_config(config);
    /// ```
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Overrides the name reported in the envelope (defaults to `BinaryBERT`)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Loads a model previously fetched by a [`ModelManager`]
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The model paths are already set
    ///   - The model is not downloaded
    ///   - The model or tokenizer failed to load
    pub fn with_model(
        self,
        manager: &ModelManager,
        model: &ModelInfo,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        if !manager.is_model_downloaded(&model.name) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{}' is not downloaded. Please download it first using ModelManager::download_model()",
                model.name
            )));
        }

        let model_path = manager.get_model_path(&model.name);
        let tokenizer_path = manager.get_tokenizer_path(&model.name);
        self.with_model_files(
            &model_path.to_string_lossy(),
            &tokenizer_path.to_string_lossy(),
            max_sequence_length,
        )
    }

    /// Sets the ONNX model and tokenizer files for the classifier
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `tokenizer_path` - Path to the tokenizer file
    /// * `max_sequence_length` - Optional maximum number of tokens fed to the model.
    ///   Defaults to 512. Longer inputs are truncated, never rejected.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The model or tokenizer paths are empty
    ///   - The paths are already set
    ///   - The files don't exist
    ///   - The model or tokenizer failed to load
    ///   - The model structure is invalid
    pub fn with_model_files(
        mut self,
        model_path: &str,
        tokenizer_path: &str,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || tokenizer_path.is_empty() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths cannot be empty".to_string()));
        }
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError("Model and tokenizer paths already set".to_string()));
        }
        let max_sequence_length = max_sequence_length.unwrap_or(DEFAULT_MAX_SEQUENCE_LENGTH);
        if max_sequence_length == 0 {
            return Err(ClassifierError::BuildError("Max sequence length must be greater than zero".to_string()));
        }

        if !Path::new(model_path).exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path)));
        }
        if !Path::new(tokenizer_path).exists() {
            return Err(ClassifierError::BuildError(format!("Tokenizer file not found: {}", tokenizer_path)));
        }

        let tokenizer = Self::load_tokenizer(tokenizer_path, max_sequence_length)?;
        info!("Tokenizer loaded successfully (truncating at {} tokens)", max_sequence_length);

        // Create session using the singleton environment
        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        self.max_sequence_length = Some(max_sequence_length);
        self.model_path = Some(model_path.to_string());
        self.tokenizer_path = Some(tokenizer_path.to_string());
        Ok(self)
    }

    fn load_tokenizer(path: &str, max_sequence_length: usize) -> Result<Tokenizer, ClassifierError> {
        let mut tokenizer = Tokenizer::from_file(path)
            .map_err(|e| {
                error!("Failed to load tokenizer: {}", e);
                ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
            })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| ClassifierError::BuildError(format!("Failed to configure truncation: {}", e)))?;

        Ok(tokenizer)
    }

    /// Builds and returns the final BinaryBert instance
    ///
    /// The number of labels is inferred by classifying a probe sentence, the
    /// same way every later prediction runs.
    ///
    /// # Returns
    /// * `Result<BinaryBert, ClassifierError>` - The constructed classifier if successful, or an error if:
    ///   - No model and tokenizer paths are set
    ///   - The probe inference fails
    pub fn build(mut self) -> Result<BinaryBert, ClassifierError> {
        let (model_path, tokenizer_path) = match (self.model_path.take(), self.tokenizer_path.take()) {
            (Some(model), Some(tokenizer)) => (model, tokenizer),
            _ => return Err(ClassifierError::BuildError("Model and tokenizer paths must be set".to_string())),
        };
        let max_sequence_length = self.max_sequence_length
            .ok_or_else(|| ClassifierError::BuildError("Max sequence length not set".to_string()))?;

        let probe = self.classify_text("Texto de prueba para inferir el número de clases")?;
        let num_labels = probe.len();
        info!("Inferred number of labels from model: {}", num_labels);

        let tokenizer = Arc::new(self.tokenizer.take()
            .ok_or_else(|| ClassifierError::BuildError("No tokenizer loaded".into()))?);
        let session = Arc::new(self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?);

        Ok(BinaryBert {
            name: self.name.take().unwrap_or_else(|| DEFAULT_CLASSIFIER_NAME.to_string()),
            model_path,
            tokenizer_path,
            tokenizer,
            session,
            model_characteristics: ModelCharacteristics {
                num_labels,
                max_sequence_length,
            },
        })
    }

    /// Validates that the model has the expected input/output structure
    ///
    /// # Returns
    /// * `Result<(), ClassifierError>` - Ok if validation passes, or an error if:
    ///   - The model doesn't declare `input_ids` and `attention_mask` inputs
    ///   - The model doesn't have any output tensors
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        for required in ["input_ids", "attention_mask"] {
            if !session.inputs.iter().any(|input| input.name == required) {
                return Err(ClassifierError::ModelError(format!(
                    "Model must have an '{}' input, found {:?}",
                    required,
                    session.inputs.iter().map(|input| input.name.as_str()).collect::<Vec<_>>()
                )));
            }
        }

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for logits".to_string()
            ));
        }

        Ok(())
    }
}
