//! Recognition outcomes published by the engine.

use serde::{Deserialize, Serialize};

/// App-defined placeholder labels that carry no numeric confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelLabel {
    /// Round just started; nothing classified yet.
    Starting,
    /// No subject in frame, or the classifier is confident nothing matches.
    NoSubject,
    /// The classifier produced no sufficiently confident label.
    LowConfidence,
}

impl SentinelLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentinelLabel::Starting => "starting",
            SentinelLabel::NoSubject => "no subject",
            SentinelLabel::LowConfidence => "low confidence",
        }
    }
}

/// Discriminated union of recognition outcomes.
///
/// Callers dispatch on the variant, never on whether a confidence value
/// happens to be present: sentinels are app-defined placeholders and never
/// carry a number, while scored predictions always do. The UI uses that to
/// suppress percentages for degraded detections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prediction {
    /// App-defined placeholder, no numeric confidence.
    Sentinel { label: SentinelLabel },

    /// Model-derived label with its probability.
    Scored { label: String, confidence: f32 },
}

impl Prediction {
    pub fn starting() -> Self {
        Self::Sentinel {
            label: SentinelLabel::Starting,
        }
    }

    pub fn no_subject() -> Self {
        Self::Sentinel {
            label: SentinelLabel::NoSubject,
        }
    }

    pub fn low_confidence() -> Self {
        Self::Sentinel {
            label: SentinelLabel::LowConfidence,
        }
    }

    pub fn scored(label: impl Into<String>, confidence: f32) -> Self {
        Self::Scored {
            label: label.into(),
            confidence,
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &str {
        match self {
            Self::Sentinel { label } => label.as_str(),
            Self::Scored { label, .. } => label,
        }
    }

    /// Numeric confidence, present only for model-derived predictions.
    pub fn confidence(&self) -> Option<f32> {
        match self {
            Self::Sentinel { .. } => None,
            Self::Scored { confidence, .. } => Some(*confidence),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel { .. })
    }

    /// The score a round settles on when it ends with this prediction.
    ///
    /// Sentinels contribute zero.
    pub fn final_score(&self) -> f32 {
        self.confidence().unwrap_or(0.0)
    }
}
