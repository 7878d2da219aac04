//! "Has caries" decision policies.
//!
//! Three mutually inconsistent thresholds for the boolean verdict exist in
//! clinical use of this pipeline. None of them is the single correct one, so
//! the choice is an explicit configuration knob rather than a hard-coded
//! constant: callers pick one policy and apply it consistently to every
//! record they persist.

use serde::{Deserialize, Serialize};

use crate::severity::{Severity, SeverityResult};

/// Policy deciding the boolean "has caries" verdict from a severity result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CariesPolicy {
    /// Any non-Normal, non-Unknown severity label counts as caries.
    SeverityLabel,
    /// At least 1% of mask pixels above the lesion threshold.
    AffectedArea,
    /// Joint condition: affected percentage above 0.5 AND max probability
    /// above 0.6. Stricter than the severity classifier's own Normal split;
    /// used by the explanation report.
    ConservativeJoint,
}

impl CariesPolicy {
    /// Apply the policy to a severity result.
    ///
    /// Missing segmentation statistics (classification mode, unknown mode)
    /// are treated as zero, so area-based policies answer `false` for them.
    #[must_use]
    pub fn has_caries(&self, result: &SeverityResult) -> bool {
        let affected = result.affected_percentage.unwrap_or(0.0);
        let max_probability = result.max_probability.unwrap_or(0.0);
        match self {
            Self::SeverityLabel => matches!(
                result.severity,
                Severity::Mild | Severity::Moderate | Severity::Severe
            ),
            Self::AffectedArea => affected >= 1.0,
            Self::ConservativeJoint => affected > 0.5 && max_probability > 0.6,
        }
    }
}

impl Default for CariesPolicy {
    fn default() -> Self {
        Self::SeverityLabel
    }
}
