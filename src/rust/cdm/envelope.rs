//! Common Data Model v2 output envelope.
//!
//! Field names and their order are part of the wire contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classifier::Logits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub nlp_output: NlpOutput,
    pub nlp_service_info: ServiceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpOutput {
    pub record_metadata: RecordMetadata,
    pub class_logits: Logits,
    /// Always `true`; failures never produce an envelope
    pub processing_success: bool,
}

/// Identifies the clinical record and how it was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub clinical_site_id: Value,
    pub patient_id: Value,
    pub admission_id: Value,
    pub record_id: Value,
    pub record_type: Value,
    pub record_format: String,
    pub record_creation_date: Value,
    pub record_lastupdate_date: String,
    pub record_character_encoding: String,
    pub record_extraction_date: String,
    pub report_section: Value,
    pub report_language: String,
    pub deidentified: String,
    pub deidentification_pipeline_name: String,
    pub deidentification_pipeline_version: String,
    pub text: String,
    pub nlp_processing_date: String,
    pub nlp_processing_pipeline_name: String,
    pub nlp_processing_pipeline_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service_app_name: String,
    pub service_language: String,
    pub service_version: String,
    pub service_model: String,
}

impl Envelope {
    /// The three wall-clock fields stamped at serialization time
    pub fn timestamps(&self) -> [&str; 3] {
        let metadata = &self.nlp_output.record_metadata;
        [
            metadata.record_lastupdate_date.as_str(),
            metadata.record_extraction_date.as_str(),
            metadata.nlp_processing_date.as_str(),
        ]
    }
}
