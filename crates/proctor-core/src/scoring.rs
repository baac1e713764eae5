use crate::error::{ProctorError, Result};
use serde::{Deserialize, Serialize};

/// Weights and cutoff used to turn raw session data into a verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub mcq_weight: f64,
    pub integrity_weight: f64,
    pub qualification_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            mcq_weight: 0.7,
            integrity_weight: 0.3,
            qualification_threshold: 0.7,
        }
    }
}

impl ScoringPolicy {
    /// # Errors
    ///
    /// Returns a configuration error if a weight or the threshold is outside
    /// `[0, 1]`, or if the weights do not sum to 1.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("scoring.mcq_weight", self.mcq_weight),
            ("scoring.integrity_weight", self.integrity_weight),
            ("scoring.qualification_threshold", self.qualification_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProctorError::configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if ((self.mcq_weight + self.integrity_weight) - 1.0).abs() > 1e-9 {
            return Err(ProctorError::configuration(
                "scoring weights must sum to 1",
            ));
        }
        Ok(())
    }
}

/// Terminal verdict of one assessment session. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub mcq_score: f64,
    pub cheating_score: f64,
    pub final_score: f64,
    pub qualified: bool,
}

impl SessionResult {
    /// Integrity shown to the candidate: the complement of the cheating score
    #[must_use]
    pub fn integrity_score(&self) -> f64 {
        1.0 - self.cheating_score
    }
}

/// Combine answer correctness and the latest cheating score into a verdict.
///
/// An empty question set scores zero rather than dividing by zero. The
/// cheating score is clamped into `[0, 1]` before weighting.
#[must_use]
pub fn aggregate(
    correct_answers: usize,
    total_questions: usize,
    latest_cheating_score: f64,
    policy: &ScoringPolicy,
) -> SessionResult {
    #[allow(clippy::cast_precision_loss)]
    let mcq_score = if total_questions == 0 {
        0.0
    } else {
        correct_answers.min(total_questions) as f64 / total_questions as f64
    };
    let cheating_score = if latest_cheating_score.is_nan() {
        0.0
    } else {
        latest_cheating_score.clamp(0.0, 1.0)
    };
    let final_score =
        mcq_score * policy.mcq_weight + (1.0 - cheating_score) * policy.integrity_weight;

    SessionResult {
        mcq_score,
        cheating_score,
        final_score,
        qualified: final_score >= policy.qualification_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_four_of_five_with_low_cheating_qualifies() {
        let result = aggregate(4, 5, 0.2, &ScoringPolicy::default());
        assert!(approx(result.mcq_score, 0.8));
        assert!(approx(result.final_score, 0.80));
        assert!(result.qualified);
    }

    #[test]
    fn test_two_of_five_with_high_cheating_fails() {
        let result = aggregate(2, 5, 0.9, &ScoringPolicy::default());
        assert!(approx(result.mcq_score, 0.4));
        assert!(approx(result.final_score, 0.31));
        assert!(!result.qualified);
    }

    #[test]
    fn test_empty_question_set_scores_zero() {
        let result = aggregate(0, 0, 0.0, &ScoringPolicy::default());
        assert!(approx(result.mcq_score, 0.0));
        assert!(approx(result.final_score, 0.3));
        assert!(!result.qualified);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = ScoringPolicy {
            mcq_weight: 0.5,
            integrity_weight: 0.5,
            qualification_threshold: 0.5,
        };
        let result = aggregate(0, 4, 0.0, &policy);
        assert!(approx(result.final_score, 0.5));
        assert!(result.qualified);
    }

    #[test]
    fn test_out_of_range_cheating_score_clamped() {
        let result = aggregate(5, 5, 1.7, &ScoringPolicy::default());
        assert!(approx(result.cheating_score, 1.0));
        assert!(approx(result.final_score, 0.7));
        assert!(approx(result.integrity_score(), 0.0));
    }

    #[test]
    fn test_policy_rejects_weights_not_summing_to_one() {
        let policy = ScoringPolicy {
            mcq_weight: 0.6,
            integrity_weight: 0.6,
            qualification_threshold: 0.7,
        };
        assert!(policy.validate().is_err());
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = aggregate(1, 2, 0.0, &ScoringPolicy::default());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"mcqScore\""));
        assert!(json.contains("\"finalScore\""));
        assert!(json.contains("\"qualified\""));
    }
}
