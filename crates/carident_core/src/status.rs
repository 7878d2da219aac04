//! Diagnosis processing status machine.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Processing state of a diagnosis record.
///
/// The happy path advances strictly in order:
/// `Pending -> Preprocessing -> Detecting -> Classifying -> Completed`.
/// `Failed` is absorbing and reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    /// Uploaded, nothing run yet.
    Pending,
    /// Image is being prepared for the model.
    Preprocessing,
    /// Model inference and lesion extraction are running.
    Detecting,
    /// Severity classification is running.
    Classifying,
    /// All stages finished.
    Completed,
    /// A stage raised; absorbing.
    Failed,
}

impl DiagnosisStatus {
    /// Status string as persisted by callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preprocessing => "preprocessing",
            Self::Detecting => "detecting",
            Self::Classifying => "classifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether this state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition(&self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Failed) {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Preprocessing)
                | (Self::Preprocessing, Self::Detecting)
                | (Self::Detecting, Self::Classifying)
                | (Self::Classifying, Self::Completed)
        )
    }

    /// Move to `next`, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] for an illegal move.
    pub fn advance_to(self, next: Self) -> Result<Self> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl Default for DiagnosisStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for DiagnosisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let status = DiagnosisStatus::Pending
            .advance_to(DiagnosisStatus::Preprocessing)
            .and_then(|s| s.advance_to(DiagnosisStatus::Detecting))
            .and_then(|s| s.advance_to(DiagnosisStatus::Classifying))
            .and_then(|s| s.advance_to(DiagnosisStatus::Completed))
            .unwrap();
        assert_eq!(status, DiagnosisStatus::Completed);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_failed_reachable_from_any_live_state() {
        for state in [
            DiagnosisStatus::Pending,
            DiagnosisStatus::Preprocessing,
            DiagnosisStatus::Detecting,
            DiagnosisStatus::Classifying,
        ] {
            assert!(state.can_transition(DiagnosisStatus::Failed));
        }
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        assert!(!DiagnosisStatus::Completed.can_transition(DiagnosisStatus::Failed));
        assert!(!DiagnosisStatus::Failed.can_transition(DiagnosisStatus::Pending));
    }

    #[test]
    fn test_skipping_stages_is_rejected() {
        let err = DiagnosisStatus::Pending
            .advance_to(DiagnosisStatus::Classifying)
            .unwrap_err();
        assert!(err.to_string().contains("pending"));
        assert!(err.to_string().contains("classifying"));
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&DiagnosisStatus::Preprocessing).unwrap();
        assert_eq!(json, "\"preprocessing\"");
    }
}
