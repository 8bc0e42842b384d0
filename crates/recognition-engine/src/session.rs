//! Round lifecycle management.
//!
//! A session cycles indefinitely through idle → playing → ended: the
//! player lines up with a reference pose while idle, the pipeline runs
//! while playing, and the round's final score and thumbnail freeze when
//! it ends. Reset returns to idle for the next round.

use std::sync::Arc;

use matchpose_common::error::{MatchposeError, MatchposeResult};
use matchpose_pose_model::frame::VideoFrame;
use matchpose_recognition_core::RecognizerConfig;

use crate::predictor::{ActionClassifier, PoseDetector, StreamAuthorizer};
use crate::processor::{FrameFeed, FramePipeline, FrameStats, PipelineOutputs};

/// State of a recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No round running; the UI shows the static reference pose.
    Idle,
    /// Stream active; predictions flow.
    Playing,
    /// Round finished; final score and thumbnail frozen until reset.
    Ended,
}

/// Frozen results of a finished round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Confidence of the last prediction, with sentinels scoring zero.
    pub final_score: f32,

    /// Display label of the last prediction.
    pub final_label: String,

    /// Most recent raw frame at the moment the round stopped.
    pub thumbnail: Option<VideoFrame>,
}

/// A recognition session that owns one pipeline per round.
pub struct RecognitionSession {
    config: RecognizerConfig,
    detector: Arc<dyn PoseDetector>,
    classifier: Arc<dyn ActionClassifier>,
    authorizer: Arc<dyn StreamAuthorizer>,
    state: SessionState,
    pipeline: Option<FramePipeline>,
    outcome: Option<RoundOutcome>,
}

impl RecognitionSession {
    /// Create a new idle session with the given collaborators.
    pub fn new(
        config: RecognizerConfig,
        detector: Arc<dyn PoseDetector>,
        classifier: Arc<dyn ActionClassifier>,
        authorizer: Arc<dyn StreamAuthorizer>,
    ) -> MatchposeResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detector,
            classifier,
            authorizer,
            state: SessionState::Idle,
            pipeline: None,
            outcome: None,
        })
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Results of the last finished round, if any.
    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    /// Published snapshots of the running pipeline.
    pub fn outputs(&self) -> Option<PipelineOutputs> {
        self.pipeline.as_ref().map(|p| p.outputs())
    }

    /// Statistics of the running pipeline.
    pub fn stats(&self) -> Option<FrameStats> {
        self.pipeline.as_ref().map(|p| p.stats())
    }

    /// Start a round.
    ///
    /// Model load completes before the stream is permitted to start, then
    /// the authorizer must grant the stream; failure of either surfaces
    /// the error and leaves the session idle. On success the caller
    /// receives the feed to wire its frame source into.
    pub async fn start(&mut self) -> MatchposeResult<FrameFeed> {
        if self.state != SessionState::Idle {
            return Err(MatchposeError::session("session already started"));
        }

        tracing::info!("Starting recognition session");

        self.detector.load().await?;
        self.classifier.load().await?;
        tracing::info!("Models loaded");

        self.authorizer.authorize().await?;
        tracing::info!("Frame stream authorized");

        let (pipeline, feed) = FramePipeline::start(
            self.config.clone(),
            self.detector.clone(),
            self.classifier.clone(),
        );
        self.pipeline = Some(pipeline);
        self.state = SessionState::Playing;

        Ok(feed)
    }

    /// Stop the round and freeze its results.
    ///
    /// The pipeline is halted first, so a routine still in flight cannot
    /// publish afterwards; then the latest prediction and raw frame are
    /// read as the round's final score and thumbnail.
    pub async fn stop(&mut self) -> MatchposeResult<RoundOutcome> {
        if self.state != SessionState::Playing {
            return Err(MatchposeError::session("session not playing"));
        }

        let pipeline = self
            .pipeline
            .take()
            .ok_or_else(|| MatchposeError::session("no pipeline for playing session"))?;

        let stats = pipeline.stats();
        let outputs = pipeline.outputs();
        pipeline.shutdown().await;

        let prediction = outputs.prediction.borrow().clone();
        let thumbnail = outputs.latest_frame.borrow().clone();

        let outcome = RoundOutcome {
            final_score: prediction.final_score(),
            final_label: prediction.label().to_string(),
            thumbnail,
        };

        tracing::info!(
            score = outcome.final_score,
            label = %outcome.final_label,
            accepted = stats.accepted,
            dropped = stats.dropped,
            "Round finished"
        );

        self.outcome = Some(outcome.clone());
        self.state = SessionState::Ended;
        Ok(outcome)
    }

    /// Discard the finished round and return to idle.
    ///
    /// Clears the frozen score and thumbnail; the next `start` builds a
    /// fresh window and a fresh `Starting` prediction, so nothing of the
    /// previous round leaks into the next one.
    pub fn reset(&mut self) -> MatchposeResult<()> {
        if self.state != SessionState::Ended {
            return Err(MatchposeError::session("session not ended"));
        }

        self.outcome = None;
        self.state = SessionState::Idle;
        tracing::info!("Session reset");
        Ok(())
    }
}
