use serde::{Deserialize, Serialize};

/// Raw, unnormalized class scores produced by a classifier for one text.
///
/// The pipeline treats this as opaque: it is written into the envelope
/// exactly as the classifier returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Logits(Vec<f32>);

impl Logits {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Softmax over the scores, computed as `exp(x_i - max) / sum(exp(x - max))`.
    pub fn probabilities(&self) -> Vec<f32> {
        if self.0.is_empty() {
            return vec![];
        }

        let max_logit = self.0.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp_vals: Vec<f32> = self.0.iter().map(|&x| (x - max_logit).exp()).collect();
        let sum: f32 = exp_vals.iter().sum();

        if sum == 0.0 || !sum.is_finite() {
            let n = exp_vals.len();
            return vec![1.0 / n as f32; n];
        }

        exp_vals.iter().map(|&x| x / sum).collect()
    }

    /// Index of the highest score, or `None` for empty logits.
    pub fn predicted_class(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, _)| idx)
    }
}

impl From<Vec<f32>> for Logits {
    fn from(scores: Vec<f32>) -> Self {
        Self(scores)
    }
}
