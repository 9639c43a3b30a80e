#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use cdm_classifier::{Classifiable, ClassifierError, FooterInput, Logits};
use serde_json::{json, Value};

/// Deterministic classifier whose scores depend only on the text.
#[derive(Debug, Default)]
pub struct StubClassifier {
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn expected_logits(text: &str) -> Logits {
        let len = text.chars().count() as f32;
        Logits::new(vec![1.0 / (1.0 + len), len / 10.0])
    }
}

impl Classifiable for StubClassifier {
    fn name(&self) -> &str {
        "StubClassifier"
    }

    fn predict(&self, text: &str) -> Result<Logits, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("<fail>") {
            return Err(ClassifierError::InferenceError("stub refused input".into()));
        }
        Ok(Self::expected_logits(text))
    }
}

pub const REQUIRED_KEYS: [&str; 7] = [
    "provider_id",
    "person_id",
    "visit_detail_id",
    "note_id",
    "note_type_concept_id",
    "note_datetime",
    "note_title",
];

pub fn footer_json(note_id: &str) -> Value {
    json!({
        "provider_id": "P1",
        "person_id": "123",
        "visit_detail_id": "V9",
        "note_id": note_id,
        "note_type_concept_id": "T1",
        "note_datetime": "2023-01-01T00:00:00",
        "note_title": "Admission Note"
    })
}

pub fn footer(note_id: &str) -> FooterInput {
    serde_json::from_value(footer_json(note_id)).unwrap()
}

pub fn footer_without(key: &str) -> FooterInput {
    let mut value = footer_json("N7");
    value.as_object_mut().unwrap().remove(key);
    serde_json::from_value(value).unwrap()
}

/// Envelope as JSON with the wall-clock fields blanked out
pub fn without_timestamps(envelope: &cdm_classifier::Envelope) -> Value {
    let mut value = serde_json::to_value(envelope).unwrap();
    let metadata = &mut value["nlp_output"]["record_metadata"];
    for key in ["record_lastupdate_date", "record_extraction_date", "nlp_processing_date"] {
        metadata[key] = Value::Null;
    }
    value
}
