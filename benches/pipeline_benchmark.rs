use std::sync::Arc;

use cdm_classifier::{
    CdmSerializer, Classifiable, ClassifierError, FooterInput, Logits, PredictionInput,
    PredictionPipeline, ServiceConfig,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

/// Scores by text length so the benchmark measures the pipeline, not a model
struct LengthClassifier;

impl Classifiable for LengthClassifier {
    fn name(&self) -> &str {
        "LengthClassifier"
    }

    fn predict(&self, text: &str) -> Result<Logits, ClassifierError> {
        let len = text.len() as f32;
        Ok(Logits::new(vec![-len, len]))
    }
}

fn footer(note_id: usize) -> FooterInput {
    serde_json::from_value(json!({
        "provider_id": "P1",
        "person_id": "123",
        "visit_detail_id": "V9",
        "note_id": format!("N{}", note_id),
        "note_type_concept_id": "T1",
        "note_datetime": "2023-01-01T00:00:00",
        "note_title": "Admission Note"
    }))
    .unwrap()
}

fn bench_serialization(c: &mut Criterion) {
    let serializer = CdmSerializer::default();
    let footer = footer(0);
    let mut group = c.benchmark_group("Serialization");
    group.sample_size(50);

    group.bench_function("envelope", |b| b.iter(|| {
        serializer
            .serialize(
                black_box("paciente con dolor abdominal"),
                Logits::new(vec![0.2, 0.8]),
                Some(&footer),
                "LengthClassifier",
            )
            .unwrap()
    }));

    group.bench_function("envelope_to_json", |b| {
        let envelope = serializer
            .serialize("paciente con dolor abdominal", Logits::new(vec![0.2, 0.8]), Some(&footer), "LengthClassifier")
            .unwrap();
        b.iter(|| serde_json::to_string(black_box(&envelope)).unwrap())
    });

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let pipeline = PredictionPipeline::new(Arc::new(LengthClassifier), ServiceConfig::default());
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let single_footer = footer(0);
    group.bench_function("single", |b| b.iter(|| {
        pipeline
            .predict(black_box("paciente con dolor abdominal"), Some(&single_footer))
            .unwrap()
    }));

    let batch: Vec<PredictionInput> = (0..64)
        .map(|i| PredictionInput::new(format!("nota clínica número {}", i), Some(footer(i))))
        .collect();
    group.bench_function("bulk_64", |b| b.iter(|| pipeline.predict_bulk(black_box(&batch)).unwrap()));

    group.finish();
}

criterion_group!(benches, bench_serialization, bench_prediction);
criterion_main!(benches);
