//! Binary classification of clinical notes with output in the Common Data
//! Model v2 (CDMv2) envelope.
//!
//! A [`PredictionPipeline`] runs a [`Classifiable`] model over the note text
//! and maps the logits, the text and the caller's record metadata ("footer")
//! onto an [`Envelope`].
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use cdm_classifier::{BinaryBert, FooterInput, PredictionPipeline, ServiceConfig};
//!
//! let classifier = BinaryBert::builder()
//!     .with_model_files("model/model.onnx", "model/tokenizer.json", Some(512))?
//!     .build()?;
//! let pipeline = PredictionPipeline::new(Arc::new(classifier), ServiceConfig::default());
//!
//! let footer: FooterInput = serde_json::from_value(serde_json::json!({
//!     "provider_id": "P1",
//!     "person_id": "123",
//!     "visit_detail_id": "V9",
//!     "note_id": "N7",
//!     "note_type_concept_id": "T1",
//!     "note_datetime": "2023-01-01T00:00:00",
//!     "note_title": "Admission Note"
//! }))?;
//!
//! let envelope = pipeline.predict("paciente con dolor abdominal", Some(&footer))?;
//! println!("{}", serde_json::to_string_pretty(&envelope)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The model is loaded once and shared read-only. `PredictionPipeline` is
//! cheap to clone and can be used from any number of threads.

pub mod classifier;
pub mod cdm;
pub mod config;
mod runtime;
pub mod model_manager;
pub mod models;
pub mod pipeline;
pub mod server;

pub use classifier::{BinaryBert, BinaryBertBuilder, Classifiable, ClassifierError, ClassifierInfo, Logits};
pub use cdm::{CdmSerializer, Envelope, Footer, FooterInput, MissingMetadataError};
pub use config::ServiceConfig;
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError};
pub use models::{ModelCharacteristics, ModelInfo};
pub use pipeline::{PipelineError, PredictionInput, PredictionPipeline};

pub fn init_logger() {
    env_logger::init();
}
