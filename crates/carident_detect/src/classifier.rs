//! Severity classification.

use carident_core::{
    NormalizedPrediction, ProbabilityMask, Severity, SeverityResult, SEVERITY_LABELS,
};

/// Per-pixel probability above which a pixel counts as lesion tissue.
pub const LESION_PROBABILITY_THRESHOLD: f32 = 0.5;

/// Convert a normalized prediction into a severity verdict.
///
/// Segmentation mode grades on the affected-area percentage with strict
/// upper bounds, first match wins:
///
/// | affected % | severity | confidence             |
/// |-----------|----------|------------------------|
/// | `< 1`     | Normal   | `(1 - mean) * 100`     |
/// | `< 5`     | Mild     | `mean * 100`           |
/// | `< 15`    | Moderate | `mean * 100`           |
/// | otherwise | Severe   | `mean * 100`           |
///
/// Mean and max probability are computed over the full mask, not just the
/// thresholded pixels. Confidence is clamped to 100.0 against floating-point
/// drift. The mask is attached to the result for lesion extraction and must
/// be stripped before the result is serialized.
///
/// Classification mode takes the argmax of the probability vector (first
/// maximum wins) mapped through the ordered severity labels, truncated when
/// the model emits fewer classes.
///
/// This function is total: unknown shapes and degenerate inputs produce an
/// `Unknown` verdict with a diagnostic note, never a panic.
#[must_use]
pub fn classify(prediction: NormalizedPrediction) -> SeverityResult {
    match prediction {
        NormalizedPrediction::Segmentation(mask) => classify_segmentation(mask),
        NormalizedPrediction::Classification(probs) => classify_vector(&probs),
        NormalizedPrediction::Unknown { shape } => {
            tracing::warn!(?shape, "degrading to Unknown severity");
            SeverityResult::unknown_for_shape(&shape)
        }
    }
}

fn classify_segmentation(mask: ProbabilityMask) -> SeverityResult {
    let affected = mask.affected_percentage(LESION_PROBABILITY_THRESHOLD);
    let mean = mask.mean();
    let max = mask.max_value();

    let (severity, confidence) = if affected < 1.0 {
        (Severity::Normal, (1.0 - mean) * 100.0)
    } else if affected < 5.0 {
        (Severity::Mild, mean * 100.0)
    } else if affected < 15.0 {
        (Severity::Moderate, mean * 100.0)
    } else {
        (Severity::Severe, mean * 100.0)
    };

    tracing::debug!(
        severity = %severity,
        affected_percentage = affected,
        mean_probability = mean,
        max_probability = max,
        "classified segmentation mask"
    );

    SeverityResult {
        severity,
        confidence: confidence.min(100.0),
        affected_percentage: Some(affected),
        mean_probability: Some(mean),
        max_probability: Some(max),
        all_probabilities: None,
        note: None,
        mask: Some(mask),
    }
}

fn classify_vector(probs: &[f64]) -> SeverityResult {
    if probs.is_empty() {
        let mut result = SeverityResult::unknown_for_shape(&[1, 0]);
        result.note = Some("Empty class-probability vector".to_string());
        return result;
    }

    let labels = &SEVERITY_LABELS[..SEVERITY_LABELS.len().min(probs.len())];

    // First maximum wins on ties.
    let mut best = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }

    let severity = labels.get(best).copied().unwrap_or(Severity::Unknown);

    SeverityResult {
        severity,
        confidence: (probs[best] * 100.0).min(100.0),
        affected_percentage: None,
        mean_probability: None,
        max_probability: None,
        all_probabilities: Some(probs.iter().map(|p| p * 100.0).collect()),
        note: None,
        mask: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carident_core::normalize;
    use burn::tensor::TensorData;

    fn segmentation(height: usize, width: usize, data: Vec<f32>) -> NormalizedPrediction {
        NormalizedPrediction::Segmentation(ProbabilityMask::new(height, width, data).unwrap())
    }

    #[test]
    fn test_all_zero_mask_is_normal_full_confidence() {
        let result = classify(segmentation(100, 100, vec![0.0; 10_000]));
        assert_eq!(result.severity, Severity::Normal);
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.affected_percentage, Some(0.0));
        assert!(result.mask.is_some());
    }

    #[test]
    fn test_all_one_mask_is_severe_and_clamped() {
        let result = classify(segmentation(10, 10, vec![1.0; 100]));
        assert_eq!(result.severity, Severity::Severe);
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.affected_percentage, Some(100.0));
    }

    #[test]
    fn test_block_mask_is_mild() {
        // 20x20 block of 0.9 in a 100x100 mask: 4% affected, whole-mask
        // mean 0.036.
        let mut data = vec![0.0f32; 10_000];
        for y in 10..30 {
            for x in 10..30 {
                data[y * 100 + x] = 0.9;
            }
        }
        let result = classify(segmentation(100, 100, data));
        assert_eq!(result.severity, Severity::Mild);
        assert!((result.affected_percentage.unwrap() - 4.0).abs() < 1e-9);
        assert!((result.mean_probability.unwrap() - 0.036).abs() < 1e-6);
        assert!((result.confidence - 3.6).abs() < 1e-4);
        assert!((result.max_probability.unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_severity_boundaries_are_strict_upper_bounds() {
        // Exactly 1% affected must already be Mild, exactly 5% Moderate,
        // exactly 15% Severe.
        for (pixels, expected) in [
            (99, Severity::Normal),
            (100, Severity::Mild),
            (499, Severity::Mild),
            (500, Severity::Moderate),
            (1499, Severity::Moderate),
            (1500, Severity::Severe),
        ] {
            let mut data = vec![0.0f32; 10_000];
            for v in data.iter_mut().take(pixels) {
                *v = 0.8;
            }
            let result = classify(segmentation(100, 100, data));
            assert_eq!(result.severity, expected, "{pixels} affected pixels");
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut data = vec![0.1f32; 400];
        data[5] = 0.95;
        let first = classify(segmentation(20, 20, data.clone()));
        let second = classify(segmentation(20, 20, data));
        assert_eq!(first.severity, second.severity);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn test_vector_argmax_and_percent_scaling() {
        let result = classify(NormalizedPrediction::Classification(vec![
            0.05, 0.15, 0.7, 0.1,
        ]));
        assert_eq!(result.severity, Severity::Moderate);
        assert!((result.confidence - 70.0).abs() < 1e-9);
        let probs = result.all_probabilities.unwrap();
        assert_eq!(probs.len(), 4);
        assert!((probs[0] - 5.0).abs() < 1e-9);
        assert!((probs[2] - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_vector_first_maximum_wins() {
        let result = classify(NormalizedPrediction::Classification(vec![0.4, 0.4, 0.2]));
        assert_eq!(result.severity, Severity::Normal);
    }

    #[test]
    fn test_short_vector_truncates_labels() {
        let result = classify(NormalizedPrediction::Classification(vec![0.3, 0.7]));
        assert_eq!(result.severity, Severity::Mild);
    }

    #[test]
    fn test_empty_vector_degrades() {
        let result = classify(NormalizedPrediction::Classification(Vec::new()));
        assert_eq!(result.severity, Severity::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_unknown_shape_never_panics() {
        let result = classify(NormalizedPrediction::Unknown {
            shape: vec![3, 3, 3],
        });
        assert_eq!(result.severity, Severity::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.note.unwrap().contains("[3, 3, 3]"));
    }

    #[test]
    fn test_rank4_and_rank2_tensors_always_classify() {
        for data in [
            TensorData::new(vec![0.0f32; 64], [1, 8, 8, 1]),
            TensorData::new(vec![1.0f32; 64], [1, 8, 8, 1]),
            TensorData::new(vec![0.25f32, 0.75], [1, 2]),
        ] {
            let result = classify(normalize(data));
            assert_ne!(result.severity, Severity::Unknown);
        }
    }
}
