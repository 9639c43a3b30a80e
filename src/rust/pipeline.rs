use std::sync::Arc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cdm::{CdmSerializer, Envelope, FooterInput, MissingMetadataError};
use crate::classifier::{Classifiable, ClassifierError};
use crate::config::ServiceConfig;

/// Failure of a single or batch prediction. No partial envelope is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Empty or absent text, or a malformed request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    MissingMetadata(#[from] MissingMetadataError),
    #[error(transparent)]
    ModelInference(#[from] ClassifierError),
}

/// One item of a batch request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub text: Option<String>,
    pub footer: Option<FooterInput>,
}

impl PredictionInput {
    pub fn new(text: impl Into<String>, footer: Option<FooterInput>) -> Self {
        Self {
            text: Some(text.into()),
            footer,
        }
    }

    /// Reads one `{text, footer}` request object. A non-string `text` or a
    /// footer that is not a JSON object counts as absent.
    pub fn from_json(item: &Value) -> Self {
        let text = item
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string);
        let footer = item
            .get("footer")
            .filter(|footer| footer.is_object())
            .and_then(|footer| FooterInput::deserialize(footer).ok());
        Self { text, footer }
    }
}

/// Classifies text and wraps the result in a CDMv2 envelope.
///
/// Holds no per-call state: the classifier is shared read-only, so one
/// pipeline may serve concurrent callers whenever `C` is `Send + Sync`.
pub struct PredictionPipeline<C: Classifiable> {
    classifier: Arc<C>,
    serializer: CdmSerializer,
}

impl<C: Classifiable> Clone for PredictionPipeline<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
            serializer: self.serializer.clone(),
        }
    }
}

impl<C: Classifiable> PredictionPipeline<C> {
    pub fn new(classifier: Arc<C>, config: ServiceConfig) -> Self {
        Self {
            classifier,
            serializer: CdmSerializer::new(config),
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn config(&self) -> &ServiceConfig {
        self.serializer.config()
    }

    /// Classifies one text and serializes the envelope.
    ///
    /// Empty text is rejected before the classifier runs. The footer is only
    /// checked once the logits exist, by the serializer.
    pub fn predict(&self, text: &str, footer: Option<&FooterInput>) -> Result<Envelope, PipelineError> {
        if text.is_empty() {
            return Err(PipelineError::InvalidInput("'text' is required".into()));
        }

        let logits = self.classifier.predict(text)?;
        debug!("Classifier '{}' returned {} logits", self.classifier.name(), logits.len());

        let envelope = self.serializer.serialize(text, logits, footer, self.classifier.name())?;
        Ok(envelope)
    }

    /// Classifies every item, in order, or fails as a whole.
    ///
    /// All texts are checked before any inference runs; the first item with a
    /// missing or empty text aborts the batch. Any later failure also aborts
    /// it and the envelopes computed so far are dropped.
    pub fn predict_bulk(&self, items: &[PredictionInput]) -> Result<Vec<Envelope>, PipelineError> {
        let texts = items
            .iter()
            .enumerate()
            .map(|(index, item)| match item.text.as_deref() {
                Some(text) if !text.is_empty() => Ok(text),
                _ => Err(PipelineError::InvalidInput(format!(
                    "Each item must contain 'text' (item {})",
                    index
                ))),
            })
            .collect::<Result<Vec<&str>, _>>()?;

        info!("Processing batch of {} items", items.len());
        texts
            .into_iter()
            .zip(items)
            .map(|(text, item)| self.predict(text, item.footer.as_ref()))
            .collect()
    }
}
