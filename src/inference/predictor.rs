//! Ranking & Response Builder
//!
//! Turns the raw probability vector produced by the model into the ranked,
//! rounded result returned to clients. Everything here is pure: the same
//! probabilities, catalog and latency always give the same result.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::catalog::ClassCatalog;
use crate::utils::error::{ClassifierError, Result};
use crate::utils::round_to;

/// Decimal places for probabilities and confidence
pub const PROBABILITY_DECIMALS: u32 = 4;

/// Decimal places for percentages and millisecond figures
pub const DISPLAY_DECIMALS: u32 = 2;

/// One class with its (rounded) probability
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassProbability {
    pub class_name: String,
    pub probability: f64,
}

/// Per-class probabilities ordered from most to least likely
///
/// Serializes as a JSON object whose key order is the ranking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedPredictions(Vec<ClassProbability>);

impl RankedPredictions {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassProbability> {
        self.0.iter()
    }

    /// Probability for a class name
    pub fn get(&self, class_name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|c| c.class_name == class_name)
            .map(|c| c.probability)
    }

    pub fn as_slice(&self) -> &[ClassProbability] {
        &self.0
    }
}

impl Serialize for RankedPredictions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.class_name, &entry.probability)?;
        }
        map.end()
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PredictionResult {
    /// Catalog index of the predicted class
    #[serde(skip)]
    pub predicted_index: usize,

    /// Predicted class name (argmax label)
    pub predicted_class: String,

    /// Probability of the predicted class, 4 decimals
    pub confidence: f64,

    /// Confidence as a percentage, 2 decimals
    pub confidence_percent: f64,

    /// Every class, sorted by probability descending
    pub all_predictions: RankedPredictions,

    /// End-to-end latency in milliseconds, 2 decimals
    pub latency_ms: f64,
}

impl PredictionResult {
    /// Gap between the top-1 and top-2 probabilities
    pub fn margin(&self) -> f64 {
        match self.all_predictions.as_slice() {
            [first, second, ..] => first.probability - second.probability,
            _ => self.confidence,
        }
    }
}

/// NaN sorts below everything and never wins the argmax
fn rank_key(p: f32) -> f32 {
    if p.is_nan() {
        f32::NEG_INFINITY
    } else {
        p
    }
}

/// Index of the largest probability, first occurrence on ties
fn argmax(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in probabilities.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if p <= current => {}
            _ => best = Some((i, p)),
        }
    }
    best
}

/// Build the client-facing result from a raw probability vector
///
/// The vector must have exactly one entry per catalog class. Probabilities
/// are not re-normalized.
pub fn build_result(
    probabilities: &[f32],
    catalog: &ClassCatalog,
    latency_ms: f64,
) -> Result<PredictionResult> {
    if probabilities.len() != catalog.len() {
        return Err(ClassifierError::Inference(format!(
            "model returned {} probabilities for {} classes",
            probabilities.len(),
            catalog.len()
        )));
    }

    let (predicted_index, confidence) = argmax(probabilities).ok_or_else(|| {
        ClassifierError::Inference("model returned no usable probabilities".to_string())
    })?;

    let predicted_class = catalog
        .name(predicted_index)
        .ok_or_else(|| ClassifierError::Inference(format!("no class at index {}", predicted_index)))?
        .to_string();

    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    // sort_by is stable, so equal probabilities keep catalog order
    ranked.sort_by(|a, b| rank_key(b.1).total_cmp(&rank_key(a.1)));

    let all_predictions = RankedPredictions(
        ranked
            .into_iter()
            .map(|(i, p)| ClassProbability {
                class_name: catalog.names()[i].clone(),
                probability: round_to(p as f64, PROBABILITY_DECIMALS),
            })
            .collect(),
    );

    let confidence = confidence as f64;

    Ok(PredictionResult {
        predicted_index,
        predicted_class,
        confidence: round_to(confidence, PROBABILITY_DECIMALS),
        confidence_percent: round_to(confidence * 100.0, DISPLAY_DECIMALS),
        all_predictions,
        latency_ms: round_to(latency_ms, DISPLAY_DECIMALS),
    })
}
