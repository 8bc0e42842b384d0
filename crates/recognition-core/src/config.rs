//! Recognizer configuration.

use matchpose_common::error::{MatchposeError, MatchposeResult};
use matchpose_pose_model::joint::Joint;
use serde::{Deserialize, Serialize};

/// Configuration value object for one recognition pipeline.
///
/// The engine is a single implementation parameterized by this struct;
/// every tunable the pipeline consults (canonical joint list, window
/// geometry, class labels, decision thresholds) lives here so variants
/// differ by configuration, not by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Canonical joint list, in encoding order.
    pub joints: Vec<Joint>,

    /// Window capacity W in frames.
    pub window_capacity: usize,

    /// Eviction stride S: the number of oldest frames removed in one batch
    /// once the window exceeds capacity.
    pub eviction_stride: usize,

    /// Classifier label for the target pose.
    pub target_label: String,

    /// Classifier label for the negative / no-pose class.
    pub negative_label: String,

    /// Tier (a): minimum target-class probability for a confident match.
    pub target_threshold: f32,

    /// Tier (b): minimum negative-class probability to report no subject.
    pub negative_threshold: f32,

    /// Tier (c): minimum best-class probability before falling back to the
    /// low-confidence sentinel.
    pub fallback_threshold: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            joints: Joint::ALL.to_vec(),
            window_capacity: 90,
            eviction_stride: 10,
            target_label: "target_pose".to_string(),
            negative_label: "no_pose".to_string(),
            target_threshold: 0.8,
            negative_threshold: 0.8,
            fallback_threshold: 0.6,
        }
    }
}

impl RecognizerConfig {
    /// Length of one encoded frame under this configuration.
    pub fn frame_len(&self) -> usize {
        self.joints.len() * matchpose_pose_model::encoded::VALUES_PER_JOINT
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> MatchposeResult<()> {
        if self.joints.is_empty() {
            return Err(MatchposeError::config("joint list must not be empty"));
        }
        if self.window_capacity == 0 {
            return Err(MatchposeError::config("window capacity must be positive"));
        }
        if self.eviction_stride == 0 {
            return Err(MatchposeError::config("eviction stride must be positive"));
        }
        if self.eviction_stride > self.window_capacity {
            return Err(MatchposeError::config(format!(
                "eviction stride {} exceeds window capacity {}",
                self.eviction_stride, self.window_capacity
            )));
        }
        if self.target_label == self.negative_label {
            return Err(MatchposeError::config(
                "target and negative labels must differ",
            ));
        }
        for (name, value) in [
            ("target_threshold", self.target_threshold),
            ("negative_threshold", self.negative_threshold),
            ("fallback_threshold", self.fallback_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchposeError::config(format!(
                    "{name} {value} outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RecognizerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.frame_len(), 18 * 3);
        assert_eq!(config.window_capacity, 90);
        assert_eq!(config.eviction_stride, 10);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = RecognizerConfig {
            window_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_stride_over_capacity() {
        let config = RecognizerConfig {
            window_capacity: 5,
            eviction_stride: 6,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config = RecognizerConfig {
            target_threshold: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_colliding_labels() {
        let config = RecognizerConfig {
            negative_label: "target_pose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
