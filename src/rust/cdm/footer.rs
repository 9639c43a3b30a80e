use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The footer or one of its record-identifying fields is absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MissingMetadataError {
    #[error("footer is absent or not a JSON object; it is required to identify the clinical record")]
    FooterAbsent,
    #[error("footer is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Footer as sent by the caller.
///
/// Every key is optional here so that absence can be reported by name. A key
/// set to JSON `null` counts as absent. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterInput {
    pub provider_id: Option<Value>,
    pub person_id: Option<Value>,
    pub visit_detail_id: Option<Value>,
    pub note_id: Option<Value>,
    pub note_type_concept_id: Option<Value>,
    pub note_datetime: Option<Value>,
    pub note_title: Option<Value>,
}

/// A footer with every record-identifying field present.
///
/// Values are kept as the caller sent them (string, number, ...) and copied
/// into the envelope verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub provider_id: Value,
    pub person_id: Value,
    pub visit_detail_id: Value,
    pub note_id: Value,
    pub note_type_concept_id: Value,
    pub note_datetime: Value,
    pub note_title: Value,
}

fn require(field: &Option<Value>, name: &'static str) -> Result<Value, MissingMetadataError> {
    match field {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Err(MissingMetadataError::MissingField(name)),
    }
}

impl FooterInput {
    /// Checks every required key, reporting the first absent one.
    pub fn validate(&self) -> Result<Footer, MissingMetadataError> {
        Ok(Footer {
            provider_id: require(&self.provider_id, "provider_id")?,
            person_id: require(&self.person_id, "person_id")?,
            visit_detail_id: require(&self.visit_detail_id, "visit_detail_id")?,
            note_id: require(&self.note_id, "note_id")?,
            note_type_concept_id: require(&self.note_type_concept_id, "note_type_concept_id")?,
            note_datetime: require(&self.note_datetime, "note_datetime")?,
            note_title: require(&self.note_title, "note_title")?,
        })
    }
}

impl From<Footer> for FooterInput {
    fn from(footer: Footer) -> Self {
        Self {
            provider_id: Some(footer.provider_id),
            person_id: Some(footer.person_id),
            visit_detail_id: Some(footer.visit_detail_id),
            note_id: Some(footer.note_id),
            note_type_concept_id: Some(footer.note_type_concept_id),
            note_datetime: Some(footer.note_datetime),
            note_title: Some(footer.note_title),
        }
    }
}
