use chrono::Local;

use crate::classifier::Logits;
use crate::config::ServiceConfig;
use super::envelope::{Envelope, NlpOutput, RecordMetadata, ServiceInfo};
use super::footer::{FooterInput, MissingMetadataError};

const RECORD_FORMAT: &str = "json";
const RECORD_CHARACTER_ENCODING: &str = "UTF-8";
const DEIDENTIFIED: &str = "no";

/// Local time with microseconds, e.g. `2024-05-02T10:14:03.512093`
fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Maps classifier output and record metadata onto the CDMv2 envelope.
///
/// Pure apart from reading the clock: each timestamp field is taken
/// separately, so they may differ by a few microseconds within one envelope.
#[derive(Debug, Clone, Default)]
pub struct CdmSerializer {
    config: ServiceConfig,
}

impl CdmSerializer {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Builds the envelope for one classified text.
    ///
    /// `model_name` is the classifier's identifying name; it becomes both the
    /// processing pipeline name and the service model.
    ///
    /// # Errors
    /// `MissingMetadataError` when the footer is absent or lacks a required
    /// key. Record identity is never defaulted.
    pub fn serialize(
        &self,
        text: &str,
        logits: Logits,
        footer: Option<&FooterInput>,
        model_name: &str,
    ) -> Result<Envelope, MissingMetadataError> {
        let footer = footer.ok_or(MissingMetadataError::FooterAbsent)?.validate()?;

        let record_metadata = RecordMetadata {
            clinical_site_id: footer.provider_id,
            patient_id: footer.person_id,
            admission_id: footer.visit_detail_id,
            record_id: footer.note_id,
            record_type: footer.note_type_concept_id,
            record_format: RECORD_FORMAT.to_string(),
            record_creation_date: footer.note_datetime,
            record_lastupdate_date: now_iso(),
            record_character_encoding: RECORD_CHARACTER_ENCODING.to_string(),
            record_extraction_date: now_iso(),
            report_section: footer.note_title,
            report_language: self.config.language.clone(),
            deidentified: DEIDENTIFIED.to_string(),
            deidentification_pipeline_name: String::new(),
            deidentification_pipeline_version: String::new(),
            text: text.to_string(),
            nlp_processing_date: now_iso(),
            nlp_processing_pipeline_name: model_name.to_string(),
            nlp_processing_pipeline_version: self.config.pipeline_version.clone(),
        };

        Ok(Envelope {
            nlp_output: NlpOutput {
                record_metadata,
                class_logits: logits,
                processing_success: true,
            },
            nlp_service_info: ServiceInfo {
                service_app_name: self.config.app_name.clone(),
                service_language: self.config.language.clone(),
                service_version: self.config.service_version.clone(),
                service_model: model_name.to_string(),
            },
        })
    }
}
