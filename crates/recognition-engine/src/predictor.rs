//! Trait seams for the external predictors and the stream authorizer.
//!
//! The engine never touches model inference directly; detectors and
//! classifiers are opaque async collaborators behind these traits. Real
//! implementations wrap on-device model runtimes; tests and the CLI use
//! synthetic ones.

use std::collections::HashMap;

use async_trait::async_trait;

use matchpose_common::error::MatchposeResult;
use matchpose_pose_model::encoded::WindowTensor;
use matchpose_pose_model::frame::VideoFrame;
use matchpose_pose_model::skeleton::Skeleton;

/// Per-frame pose detection.
#[async_trait]
pub trait PoseDetector: Send + Sync {
    /// Load model resources.
    ///
    /// A session awaits this before its frame stream is permitted to
    /// start; failures surface as model-load errors and keep the session
    /// idle.
    async fn load(&self) -> MatchposeResult<()>;

    /// Detect zero or more skeletons in one frame.
    ///
    /// The orientation hint travels inside the frame. Errors are recovered
    /// by the pipeline as "no skeleton detected" for that frame only.
    async fn detect(&self, frame: &VideoFrame) -> MatchposeResult<Vec<Skeleton>>;
}

/// Windowed action classification.
#[async_trait]
pub trait ActionClassifier: Send + Sync {
    /// Load model resources; same activation contract as the detector.
    async fn load(&self) -> MatchposeResult<()>;

    /// Map a full window tensor to label → probability.
    ///
    /// Errors are recovered by the pipeline by retaining the previous
    /// prediction unchanged.
    async fn predict(&self, window: &WindowTensor) -> MatchposeResult<HashMap<String, f32>>;
}

/// Consent gate for the frame stream (camera permission or equivalent).
#[async_trait]
pub trait StreamAuthorizer: Send + Sync {
    /// Resolve to Ok once streaming is permitted; an authorization error
    /// keeps the session idle.
    async fn authorize(&self) -> MatchposeResult<()>;
}
