//! The per-frame processing pipeline.
//!
//! One consumer task owns the window and the published snapshots; the
//! producer side is a cheap `FrameFeed` handle with single-flight
//! admission. A frame arriving while the previous one is still mid-flight
//! is dropped entirely, never queued, bounding pipeline latency under
//! load at the cost of sampled coverage.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use matchpose_pose_model::frame::VideoFrame;
use matchpose_pose_model::prediction::Prediction;
use matchpose_pose_model::skeleton::Skeleton;
use matchpose_recognition_core::{decide, encode, select_primary, FrameWindow, RecognizerConfig};

use crate::predictor::{ActionClassifier, PoseDetector};

/// Outcome of offering a frame to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAdmission {
    /// The frame was handed to the consumer task.
    Accepted,
    /// A previous frame is still mid-processing; this one was discarded.
    DroppedBusy,
    /// The pipeline has been stopped; no further frames are accepted.
    Halted,
}

/// Runtime statistics snapshot for a pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Frames accepted into the pipeline.
    pub accepted: u64,

    /// Frames dropped by the single-flight guard.
    pub dropped: u64,

    /// Completed windows sent to the classifier.
    pub windows_classified: u64,
}

impl FrameStats {
    /// Drop rate as a percentage.
    pub fn drop_rate(&self) -> f64 {
        let total = self.accepted + self.dropped;
        if total == 0 {
            return 0.0;
        }
        self.dropped as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Default)]
struct StatsCells {
    accepted: AtomicU64,
    dropped: AtomicU64,
    windows_classified: AtomicU64,
}

#[derive(Debug)]
struct Flags {
    /// Claimed by `offer` before hand-off, released by the consumer task
    /// only after the per-frame routine completes.
    busy: AtomicBool,
    /// Set once on shutdown; checked by `offer` and by the in-flight
    /// routine before every state mutation.
    stopped: AtomicBool,
}

/// Read-only snapshots published by the pipeline task.
///
/// Everyone outside the pipeline (presentation, session machine) reads
/// these; nothing outside the task ever mutates pipeline state.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    /// Current prediction; starts as the `Starting` sentinel.
    pub prediction: watch::Receiver<Prediction>,

    /// Currently selected skeleton, for overlay rendering.
    pub overlay: watch::Receiver<Option<Skeleton>>,

    /// Most recent accepted raw frame, for the end-of-round thumbnail.
    pub latest_frame: watch::Receiver<Option<VideoFrame>>,
}

/// Producer-side handle for pushing frames into the pipeline.
///
/// Non-blocking by design: the frame source calls `offer` from its
/// delivery context and immediately learns whether the frame was taken.
#[derive(Clone, Debug)]
pub struct FrameFeed {
    tx: mpsc::Sender<VideoFrame>,
    flags: Arc<Flags>,
    stats: Arc<StatsCells>,
}

impl FrameFeed {
    /// Offer one frame; drops it when the consumer is busy or stopped.
    pub fn offer(&self, frame: VideoFrame) -> FrameAdmission {
        if self.flags.stopped.load(Ordering::SeqCst) {
            return FrameAdmission::Halted;
        }

        if self.flags.busy.swap(true, Ordering::AcqRel) {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return FrameAdmission::DroppedBusy;
        }

        match self.tx.try_send(frame) {
            Ok(()) => {
                self.stats.accepted.fetch_add(1, Ordering::Relaxed);
                FrameAdmission::Accepted
            }
            Err(_) => {
                // Consumer gone: shutdown raced the admission checks.
                self.flags.busy.store(false, Ordering::Release);
                FrameAdmission::Halted
            }
        }
    }
}

/// A running recognition pipeline: one consumer task plus its handles.
pub struct FramePipeline {
    flags: Arc<Flags>,
    stats: Arc<StatsCells>,
    outputs: PipelineOutputs,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FramePipeline {
    /// Spawn the consumer task and return the pipeline with its feed.
    pub fn start(
        config: RecognizerConfig,
        detector: Arc<dyn PoseDetector>,
        classifier: Arc<dyn ActionClassifier>,
    ) -> (Self, FrameFeed) {
        // Capacity 1 is sufficient: the busy flag guarantees at most one
        // frame is ever in flight between producer and consumer.
        let (frame_tx, frame_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (prediction_tx, prediction_rx) = watch::channel(Prediction::starting());
        let (overlay_tx, overlay_rx) = watch::channel(None);
        let (latest_frame_tx, latest_frame_rx) = watch::channel(None);

        let flags = Arc::new(Flags {
            busy: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        });
        let stats = Arc::new(StatsCells::default());

        let window = FrameWindow::new(config.window_capacity, config.eviction_stride);

        let task = PipelineTask {
            config,
            detector,
            classifier,
            window,
            flags: flags.clone(),
            stats: stats.clone(),
            prediction_tx,
            overlay_tx,
            latest_frame_tx,
        };

        let join = tokio::spawn(task.run(frame_rx, stop_rx));

        let pipeline = Self {
            flags: flags.clone(),
            stats: stats.clone(),
            outputs: PipelineOutputs {
                prediction: prediction_rx,
                overlay: overlay_rx,
                latest_frame: latest_frame_rx,
            },
            stop_tx,
            task: join,
        };
        let feed = FrameFeed {
            tx: frame_tx,
            flags,
            stats,
        };

        (pipeline, feed)
    }

    /// Clone the published snapshot receivers.
    pub fn outputs(&self) -> PipelineOutputs {
        self.outputs.clone()
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> FrameStats {
        FrameStats {
            accepted: self.stats.accepted.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
            windows_classified: self.stats.windows_classified.load(Ordering::Relaxed),
        }
    }

    /// Stop the pipeline and wait for the consumer task to finish.
    ///
    /// The stopped flag is raised before waiting, so an in-flight routine
    /// completes without publishing or touching the window again, and any
    /// concurrent `offer` observes `Halted`.
    pub async fn shutdown(self) {
        self.flags.stopped.store(true, Ordering::SeqCst);
        self.stop_tx.send(true).ok();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Pipeline task join failed");
        }
        tracing::info!("Frame pipeline stopped");
    }
}

struct PipelineTask {
    config: RecognizerConfig,
    detector: Arc<dyn PoseDetector>,
    classifier: Arc<dyn ActionClassifier>,
    window: FrameWindow,
    flags: Arc<Flags>,
    stats: Arc<StatsCells>,
    prediction_tx: watch::Sender<Prediction>,
    overlay_tx: watch::Sender<Option<Skeleton>>,
    latest_frame_tx: watch::Sender<Option<VideoFrame>>,
}

impl PipelineTask {
    async fn run(
        mut self,
        mut frame_rx: mpsc::Receiver<VideoFrame>,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        tracing::info!(
            window_capacity = self.config.window_capacity,
            eviction_stride = self.config.eviction_stride,
            "Frame pipeline started"
        );

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                frame = frame_rx.recv() => {
                    let Some(frame) = frame else { break };
                    self.process_frame(frame).await;
                    self.flags.busy.store(false, Ordering::Release);
                }
            }
        }
    }

    fn stopped(&self) -> bool {
        self.flags.stopped.load(Ordering::SeqCst)
    }

    /// The per-frame routine: detect, select, encode, window, classify.
    ///
    /// Accepted frames run strictly in arrival order because this is the
    /// only place frames are consumed. The stopped flag is re-checked
    /// around every suspension point so a routine that outlives a stop
    /// request cannot resurrect window or snapshot state.
    async fn process_frame(&mut self, frame: VideoFrame) {
        if self.stopped() {
            return;
        }
        self.latest_frame_tx.send(Some(frame.clone())).ok();

        let skeletons = match self.detector.detect(&frame).await {
            Ok(skeletons) => skeletons,
            Err(e) => {
                tracing::warn!(error = %e, "Pose detection failed; treating frame as subject-less");
                Vec::new()
            }
        };

        let candidate = select_primary(&skeletons).cloned();

        if self.stopped() {
            return;
        }

        if candidate.is_none() {
            self.prediction_tx.send(Prediction::no_subject()).ok();
        }

        // The window advances every accepted frame; a subject-less frame
        // contributes an all-zero entry rather than stalling the stream.
        let encoded = encode(candidate.as_ref(), &self.config.joints);
        let ready = self.window.append(encoded);

        if ready {
            self.classify_window().await;
        }

        if self.stopped() {
            return;
        }
        self.overlay_tx.send(candidate).ok();
    }

    async fn classify_window(&mut self) {
        let tensor = self.window.to_tensor();
        match self.classifier.predict(&tensor).await {
            Ok(probabilities) => {
                if self.stopped() {
                    return;
                }
                let prediction = decide(&probabilities, &self.config);
                tracing::debug!(label = prediction.label(), "Window classified");
                self.stats.windows_classified.fetch_add(1, Ordering::Relaxed);
                self.prediction_tx.send(prediction).ok();
            }
            Err(e) => {
                // Previous prediction stays published untouched.
                tracing::warn!(error = %e, "Classification failed; keeping previous prediction");
            }
        }
    }
}
