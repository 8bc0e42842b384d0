//! MatchPose Pose Model
//!
//! Defines the core data contracts for the recognition engine:
//! - **Joints:** the canonical body-joint enumeration
//! - **Skeletons:** per-frame detected keypoints with missing-joint slots
//! - **Frames:** raw video frames with orientation hints and timestamps
//! - **Predictions:** sentinel vs model-derived recognition outcomes
//! - **Encoded frames:** fixed-length numeric vectors and window tensors
//!
//! All keypoint coordinates are normalized to `[0.0, 1.0]` relative to the
//! frame so downstream consumers survive resolution changes across devices.

pub mod encoded;
pub mod frame;
pub mod joint;
pub mod prediction;
pub mod skeleton;

pub use encoded::*;
pub use frame::*;
pub use joint::*;
pub use prediction::*;
pub use skeleton::*;
