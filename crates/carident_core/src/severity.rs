//! Severity labels and classification results.

use serde::{Deserialize, Serialize};

use crate::mask::ProbabilityMask;

/// Clinical severity of detected caries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// No clinically relevant lesion area.
    Normal,
    /// Small affected area.
    Mild,
    /// Moderate affected area.
    Moderate,
    /// Large affected area.
    Severe,
    /// Reserved for unrecognized prediction shapes.
    Unknown,
}

/// Ordered label list for classification-mode outputs. The vector index is
/// the class index; the list is truncated when the model emits fewer classes.
pub const SEVERITY_LABELS: [Severity; 4] = [
    Severity::Normal,
    Severity::Mild,
    Severity::Moderate,
    Severity::Severe,
];

impl Severity {
    /// Label as displayed to callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity verdict with confidence and supporting statistics.
///
/// `confidence` is always a percentage in `[0, 100]`, never a raw
/// probability. Segmentation-mode results carry `affected_percentage`,
/// `mean_probability` and `max_probability`; classification-mode results
/// carry `all_probabilities` (each entry already scaled to a percentage).
///
/// The mask used to produce a segmentation verdict rides along transiently
/// for lesion extraction in the same request. It is excluded from
/// serialization and must be dropped via [`SeverityResult::strip_mask`]
/// before the result leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityResult {
    /// Severity verdict.
    pub severity: Severity,
    /// Confidence as a percentage, clamped to at most 100.0.
    pub confidence: f64,
    /// Percentage of mask pixels above the lesion threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_percentage: Option<f64>,
    /// Mean probability over the full mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_probability: Option<f64>,
    /// Maximum probability over the full mask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_probability: Option<f64>,
    /// Per-class probabilities as percentages, order preserved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_probabilities: Option<Vec<f64>>,
    /// Diagnostic message, set when the prediction shape was unrecognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Transient mask held for lesion extraction; never serialized.
    #[serde(skip)]
    pub mask: Option<ProbabilityMask>,
}

impl SeverityResult {
    /// Fallback result for an unrecognized prediction shape.
    #[must_use]
    pub fn unknown_for_shape(shape: &[usize]) -> Self {
        Self {
            severity: Severity::Unknown,
            confidence: 0.0,
            affected_percentage: None,
            mean_probability: None,
            max_probability: None,
            all_probabilities: None,
            note: Some(format!("Unexpected prediction shape: {shape:?}")),
            mask: None,
        }
    }

    /// Borrow the transient mask, if still attached.
    #[must_use]
    pub fn mask(&self) -> Option<&ProbabilityMask> {
        self.mask.as_ref()
    }

    /// Detach and return the transient mask. After this call the result is
    /// safe to serialize and cheap to clone.
    pub fn strip_mask(&mut self) -> Option<ProbabilityMask> {
        self.mask.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Normal.to_string(), "Normal");
        assert_eq!(SEVERITY_LABELS.len(), 4);
        assert_eq!(SEVERITY_LABELS[3], Severity::Severe);
    }

    #[test]
    fn test_unknown_result_names_shape() {
        let result = SeverityResult::unknown_for_shape(&[1, 2, 3]);
        assert_eq!(result.severity, Severity::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.note.unwrap().contains("[1, 2, 3]"));
    }

    #[test]
    fn test_mask_is_never_serialized() {
        let result = SeverityResult {
            severity: Severity::Mild,
            confidence: 42.0,
            affected_percentage: Some(2.0),
            mean_probability: Some(0.42),
            max_probability: Some(0.9),
            all_probabilities: None,
            note: None,
            mask: Some(ProbabilityMask::zeros(4, 4)),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("mask"));
        let restored: SeverityResult = serde_json::from_str(&json).unwrap();
        assert!(restored.mask.is_none());
        assert_eq!(restored.severity, Severity::Mild);
    }

    #[test]
    fn test_strip_mask() {
        let mut result = SeverityResult::unknown_for_shape(&[]);
        result.mask = Some(ProbabilityMask::zeros(2, 2));
        assert!(result.strip_mask().is_some());
        assert!(result.mask.is_none());
    }
}
