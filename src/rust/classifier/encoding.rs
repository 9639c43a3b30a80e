use tokenizers::Tokenizer;
use ort::session::Session;
use ndarray::Array2;
use ort::value::Tensor;
use std::collections::HashMap;

use super::error::ClassifierError;
use super::logits::Logits;

/// Token ids and attention mask for a single sequence, already truncated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModelInputs {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

impl ModelInputs {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Builds model inputs from tokenizer output, truncating to `max_length`.
///
/// The tokenizer is configured to truncate already; the cut here only guards
/// tokenizers loaded without truncation parameters.
pub(crate) fn prepare_inputs(ids: &[u32], attention: &[u32], max_length: usize) -> ModelInputs {
    let len = ids.len().min(max_length);
    let input_ids = ids[..len].iter().map(|&id| id as i64).collect();
    let attention_mask = (0..len)
        .map(|i| attention.get(i).map(|&m| m as i64).unwrap_or(1))
        .collect();
    ModelInputs { input_ids, attention_mask }
}

/// Runs a sequence classification model over text.
///
/// The pipeline is:
/// 1. Tokenize with special tokens, truncating to `max_sequence_length`
/// 2. Feed `input_ids`, `attention_mask` (and `token_type_ids` when the graph declares it)
/// 3. Read the first output as logits of shape [batch_size=1, num_labels]
pub(crate) trait SequenceEncoding {
    /// Returns the initialized tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Returns the maximum sequence length fed to the model
    fn max_sequence_length(&self) -> Option<usize>;

    /// Counts the tokens the model will see for this text, special tokens
    /// included and after truncation.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized or the text cannot be encoded
    fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        Ok(self.tokenize(text)?.len())
    }

    /// Converts text into truncated model inputs.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized or the text cannot be encoded
    /// - `InferenceError` if the text encodes to zero tokens
    fn tokenize(&self, text: &str) -> Result<ModelInputs, ClassifierError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;
        let max_length = self.max_sequence_length()
            .ok_or_else(|| ClassifierError::TokenizerError("Max sequence length not set".into()))?;

        let encoding = tokenizer.encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;

        let inputs = prepare_inputs(encoding.get_ids(), encoding.get_attention_mask(), max_length);
        if inputs.is_empty() {
            return Err(ClassifierError::InferenceError(
                "Input produced no tokens after tokenization".into(),
            ));
        }
        Ok(inputs)
    }

    /// Whether the loaded graph expects a `token_type_ids` input
    fn uses_token_type_ids(&self) -> bool {
        self.session()
            .map(|session| session.inputs.iter().any(|input| input.name == "token_type_ids"))
            .unwrap_or(false)
    }

    /// Tokenizes and classifies the text in one step.
    fn classify_text(&self, text: &str) -> Result<Logits, ClassifierError> {
        let inputs = self.tokenize(text)?;
        self.run_logits(&inputs)
    }

    /// Runs the ONNX model on prepared inputs and returns the raw logits.
    ///
    /// # Errors
    /// - `InferenceError` if the session is missing, tensor creation fails,
    ///   the run fails, or the output is empty
    fn run_logits(&self, inputs: &ModelInputs) -> Result<Logits, ClassifierError> {
        let session = self.session()
            .ok_or_else(|| ClassifierError::InferenceError("Session not initialized".into()))?;
        let seq_len = inputs.len();

        let input_array = Array2::from_shape_vec((1, seq_len), inputs.input_ids.clone())
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input_ids = input_dyn.as_standard_layout();

        let mask_array = Array2::from_shape_vec((1, seq_len), inputs.attention_mask.clone())
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to create mask array: {}", e)))?;
        let mask_dyn = mask_array.into_dyn();
        let attention_mask = mask_dyn.as_standard_layout();

        let type_array = Array2::<i64>::zeros((1, seq_len));
        let type_dyn = type_array.into_dyn();
        let token_type_ids = type_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert("input_ids", Tensor::from_array(&input_ids)
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to create input tensor: {}", e)))?);
        input_tensors.insert("attention_mask", Tensor::from_array(&attention_mask)
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to create mask tensor: {}", e)))?);
        if self.uses_token_type_ids() {
            input_tensors.insert("token_type_ids", Tensor::from_array(&token_type_ids)
                .map_err(|e| ClassifierError::InferenceError(format!("Failed to create token type tensor: {}", e)))?);
        }

        let outputs = session.run(input_tensors)
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to extract output tensor: {}", e)))?;

        let scores: Vec<f32> = output_tensor.iter().cloned().collect();
        if scores.is_empty() {
            return Err(ClassifierError::InferenceError("Model returned empty logits".into()));
        }

        Ok(Logits::new(scores))
    }
}
