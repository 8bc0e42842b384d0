//! MatchPose Recognition Engine
//!
//! Orchestrates the live recognition loop: frames pushed by an external
//! source flow through pose detection, candidate selection, keypoint
//! encoding, and the sliding window; completed windows reach the
//! classifier and the decision policy, and the results are published as
//! read-only snapshots.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               RecognitionSession                  │
//! │   start ──► load models ──► authorize stream      │
//! │  ┌─────────────────────────────────────────────┐ │
//! │  │              FramePipeline                   │ │
//! │  │  FrameFeed ─► detect ─► select ─► encode     │ │
//! │  │      │                            │          │ │
//! │  │   (busy? drop)              FrameWindow      │ │
//! │  │                                   │ ready    │ │
//! │  │                       classify ─► decide     │ │
//! │  └───────────────┬─────────────────────────────┘ │
//! │                  ▼                                │
//! │   published snapshots: prediction / overlay /     │
//! │   latest frame; final score + thumbnail on stop   │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod predictor;
pub mod processor;
pub mod session;

pub use predictor::{ActionClassifier, PoseDetector, StreamAuthorizer};
pub use processor::{FrameAdmission, FrameFeed, FramePipeline, FrameStats, PipelineOutputs};
pub use session::{RecognitionSession, RoundOutcome, SessionState};
