use serde::{Deserialize, Serialize};

use crate::schema::StaticThreshold;

/// Static score for a value outside its limits.
pub const OUTLIER_SCORE: f64 = 10.0;
/// Static score for a value within its limits.
pub const INLIER_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Within,
    AboveUpper { limit: f64 },
    BelowLower { limit: f64 },
}

impl Outcome {
    pub fn is_breach(&self) -> bool {
        !matches!(self, Self::Within)
    }

    pub fn limit(&self) -> Option<f64> {
        match self {
            Self::Within => None,
            Self::AboveUpper { limit } | Self::BelowLower { limit } => Some(*limit),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Within => "within",
            Self::AboveUpper { .. } => "above_upper",
            Self::BelowLower { .. } => "below_lower",
        }
    }
}

impl StaticThreshold {
    /// Values equal to a limit are within it. The upper limit wins when both
    /// could apply.
    pub fn check(&self, value: f64) -> Outcome {
        if let Some(limit) = self.upper_limit {
            if value > limit {
                return Outcome::AboveUpper { limit };
            }
        }
        if let Some(limit) = self.lower_limit {
            if value < limit {
                return Outcome::BelowLower { limit };
            }
        }
        Outcome::Within
    }

    pub fn score(&self, value: f64) -> f64 {
        if self.check(value).is_breach() {
            OUTLIER_SCORE
        } else {
            INLIER_SCORE
        }
    }

    /// Mixes the static score into a model's anomaly score by `weight`.
    /// Without a weight the model score passes through unchanged.
    pub fn blend(&self, model_score: f64, value: f64) -> f64 {
        let w = self.weight.unwrap_or(0.0);
        w * self.score(value) + (1.0 - w) * model_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(limit: f64) -> StaticThreshold {
        StaticThreshold {
            upper_limit: Some(limit),
            ..Default::default()
        }
    }

    #[test]
    fn above_upper() {
        assert_eq!(upper(80.0).check(81.0), Outcome::AboveUpper { limit: 80.0 });
        assert_eq!(upper(80.0).check(79.0), Outcome::Within);
    }

    #[test]
    fn boundaries_are_within() {
        let st = StaticThreshold {
            upper_limit: Some(80.0),
            lower_limit: Some(10.0),
            weight: None,
        };
        assert_eq!(st.check(80.0), Outcome::Within);
        assert_eq!(st.check(10.0), Outcome::Within);
        assert_eq!(st.check(9.9), Outcome::BelowLower { limit: 10.0 });
    }

    #[test]
    fn no_limits_never_breach() {
        let st = StaticThreshold::default();
        assert_eq!(st.check(f64::MAX), Outcome::Within);
        assert_eq!(st.check(f64::MIN), Outcome::Within);
    }

    #[test]
    fn nan_is_within() {
        assert!(!upper(1.0).check(f64::NAN).is_breach());
    }

    #[test]
    fn scores() {
        assert_eq!(upper(80.0).score(90.0), OUTLIER_SCORE);
        assert_eq!(upper(80.0).score(50.0), INLIER_SCORE);
    }

    #[test]
    fn blend_by_weight() {
        let mut st = upper(80.0);
        assert_eq!(st.blend(2.0, 90.0), 2.0);

        st.weight = Some(0.5);
        assert_eq!(st.blend(2.0, 90.0), 6.0);
        assert_eq!(st.blend(2.0, 50.0), 1.25);

        st.weight = Some(1.0);
        assert_eq!(st.blend(2.0, 90.0), OUTLIER_SCORE);
    }

    #[test]
    fn outcome_accessors() {
        let o = Outcome::BelowLower { limit: 3.0 };
        assert!(o.is_breach());
        assert_eq!(o.limit(), Some(3.0));
        assert_eq!(o.as_str(), "below_lower");
        assert_eq!(Outcome::Within.limit(), None);
    }
}
