//! Synthetic predictors for driving the engine without real models.
//!
//! The detector emits a deterministic swaying figure with periodic subject
//! dropouts; the classifier derives probabilities from how much of the
//! window actually contained a subject. Both are pure functions of their
//! inputs, so a `run` invocation with the same parameters reproduces the
//! same round.

use std::collections::HashMap;

use async_trait::async_trait;

use matchpose_common::error::MatchposeResult;
use matchpose_pose_model::encoded::WindowTensor;
use matchpose_pose_model::frame::VideoFrame;
use matchpose_pose_model::joint::Joint;
use matchpose_pose_model::skeleton::{Keypoint, Skeleton};
use matchpose_recognition_engine::{ActionClassifier, PoseDetector, StreamAuthorizer};

/// Fraction of each dropout period during which the subject is absent.
const DROPOUT_DUTY: f64 = 0.25;

/// Deterministic single-subject detector.
pub struct SyntheticDetector {
    /// Seconds between subject dropouts; zero disables dropouts.
    dropout_period_secs: f64,
}

impl SyntheticDetector {
    pub fn new(dropout_period_secs: f64) -> Self {
        Self {
            dropout_period_secs,
        }
    }

    fn subject_absent(&self, t: f64) -> bool {
        if self.dropout_period_secs <= 0.0 {
            return false;
        }
        let phase = (t % self.dropout_period_secs) / self.dropout_period_secs;
        phase >= 1.0 - DROPOUT_DUTY
    }

    fn figure_at(&self, t: f64) -> Skeleton {
        let sway = (t * std::f64::consts::TAU / 4.0).sin() as f32 * 0.1;

        // Coarse standing figure: joints descend head-to-ankle and fan
        // out left/right around a swaying centerline.
        let mut skeleton = Skeleton::empty();
        for (index, joint) in Joint::ALL.iter().enumerate() {
            let lateral = ((index % 3) as f32 - 1.0) * 0.08;
            let x = 0.5 + sway + lateral;
            let y = 0.1 + (index as f32 / Joint::COUNT as f32) * 0.8;
            skeleton.set(*joint, Keypoint::new(x, y, 0.9));
        }
        skeleton
    }
}

#[async_trait]
impl PoseDetector for SyntheticDetector {
    async fn load(&self) -> MatchposeResult<()> {
        tracing::debug!("Synthetic detector ready (no model to load)");
        Ok(())
    }

    async fn detect(&self, frame: &VideoFrame) -> MatchposeResult<Vec<Skeleton>> {
        let t = frame.timestamp_secs();
        if self.subject_absent(t) {
            return Ok(vec![]);
        }
        Ok(vec![self.figure_at(t)])
    }
}

/// Classifier whose probabilities track subject presence in the window.
pub struct SyntheticClassifier {
    target_label: String,
    negative_label: String,
}

impl SyntheticClassifier {
    pub fn new(target_label: impl Into<String>, negative_label: impl Into<String>) -> Self {
        Self {
            target_label: target_label.into(),
            negative_label: negative_label.into(),
        }
    }
}

#[async_trait]
impl ActionClassifier for SyntheticClassifier {
    async fn load(&self) -> MatchposeResult<()> {
        tracing::debug!("Synthetic classifier ready (no model to load)");
        Ok(())
    }

    async fn predict(&self, window: &WindowTensor) -> MatchposeResult<HashMap<String, f32>> {
        // Mean of the confidence channel: 0 for an empty window,
        // ~0.9 when the subject was present throughout.
        let confidences: Vec<f32> = window.data().iter().skip(2).step_by(3).copied().collect();
        let presence = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f32>() / confidences.len() as f32
        };

        let mut probabilities = HashMap::new();
        probabilities.insert(self.target_label.clone(), presence.clamp(0.0, 1.0));
        probabilities.insert(self.negative_label.clone(), (1.0 - presence).clamp(0.0, 1.0));
        Ok(probabilities)
    }
}

/// Authorizer that always grants the stream (there is no real camera).
pub struct AlwaysAuthorized;

#[async_trait]
impl StreamAuthorizer for AlwaysAuthorized {
    async fn authorize(&self) -> MatchposeResult<()> {
        Ok(())
    }
}
