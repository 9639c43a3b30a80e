/// Characteristics of a loaded classification model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCharacteristics {
    /// Number of classes the model scores (length of the logits vector)
    pub num_labels: usize,
    /// Maximum number of tokens fed to the model; longer inputs are truncated
    pub max_sequence_length: usize,
}

/// Where a model's files come from and how to verify them.
///
/// Files are stored by [`crate::ModelManager`] under `<models_dir>/<name>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: Option<String>,
    pub tokenizer_url: Option<String>,
    /// Expected SHA-256 of `model.onnx`, lowercase hex. Unverified when absent.
    pub model_hash: Option<String>,
    /// Expected SHA-256 of `tokenizer.json`, lowercase hex. Unverified when absent.
    pub tokenizer_hash: Option<String>,
}

impl ModelInfo {
    /// A model whose files are placed in the cache directory by hand
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_url: None,
            tokenizer_url: None,
            model_hash: None,
            tokenizer_hash: None,
        }
    }

    /// A model downloaded from the given URLs
    pub fn remote(name: impl Into<String>, model_url: impl Into<String>, tokenizer_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_url: Some(model_url.into()),
            tokenizer_url: Some(tokenizer_url.into()),
            model_hash: None,
            tokenizer_hash: None,
        }
    }

    pub fn with_hashes(mut self, model_hash: Option<String>, tokenizer_hash: Option<String>) -> Self {
        self.model_hash = model_hash.map(|h| h.to_lowercase());
        self.tokenizer_hash = tokenizer_hash.map(|h| h.to_lowercase());
        self
    }
}
