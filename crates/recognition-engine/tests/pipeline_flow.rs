//! End-to-end pipeline and session tests with mock predictors.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use matchpose_common::error::{MatchposeError, MatchposeResult};
use matchpose_pose_model::encoded::WindowTensor;
use matchpose_pose_model::frame::{Orientation, VideoFrame};
use matchpose_pose_model::joint::Joint;
use matchpose_pose_model::prediction::Prediction;
use matchpose_pose_model::skeleton::{Keypoint, Skeleton};
use matchpose_recognition_core::RecognizerConfig;
use matchpose_recognition_engine::{
    ActionClassifier, FrameAdmission, FramePipeline, PoseDetector, RecognitionSession,
    SessionState, StreamAuthorizer,
};

async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("test future timed out")
}

fn small_config(capacity: usize, stride: usize) -> RecognizerConfig {
    RecognizerConfig {
        window_capacity: capacity,
        eviction_stride: stride,
        ..Default::default()
    }
}

fn frame(timestamp_ns: u64) -> VideoFrame {
    VideoFrame::new(vec![0u8; 4], 2, 2, Orientation::Up, timestamp_ns)
}

fn subject() -> Skeleton {
    Skeleton::empty()
        .with_joint(Joint::Nose, Keypoint::new(0.5, 0.2, 0.9))
        .with_joint(Joint::LeftAnkle, Keypoint::new(0.6, 0.9, 0.8))
}

fn probabilities(entries: &[(&str, f32)]) -> HashMap<String, f32> {
    entries
        .iter()
        .map(|(label, p)| (label.to_string(), *p))
        .collect()
}

/// Detector that always returns the same skeletons, counting load calls.
struct StaticDetector {
    skeletons: Vec<Skeleton>,
    load_calls: AtomicUsize,
}

impl StaticDetector {
    fn new(skeletons: Vec<Skeleton>) -> Self {
        Self {
            skeletons,
            load_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PoseDetector for StaticDetector {
    async fn load(&self) -> MatchposeResult<()> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn detect(&self, _frame: &VideoFrame) -> MatchposeResult<Vec<Skeleton>> {
        Ok(self.skeletons.clone())
    }
}

/// Detector that parks inside `detect` until the test releases it.
struct GatedDetector {
    entered: Semaphore,
    release: Semaphore,
}

impl GatedDetector {
    fn new() -> Self {
        Self {
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }

    async fn wait_until_entered(&self) {
        within(self.entered.acquire()).await.unwrap().forget();
    }
}

#[async_trait]
impl PoseDetector for GatedDetector {
    async fn load(&self) -> MatchposeResult<()> {
        Ok(())
    }

    async fn detect(&self, _frame: &VideoFrame) -> MatchposeResult<Vec<Skeleton>> {
        self.entered.add_permits(1);
        self.release.acquire().await.unwrap().forget();
        Ok(vec![subject()])
    }
}

struct FailingDetector;

#[async_trait]
impl PoseDetector for FailingDetector {
    async fn load(&self) -> MatchposeResult<()> {
        Ok(())
    }

    async fn detect(&self, _frame: &VideoFrame) -> MatchposeResult<Vec<Skeleton>> {
        Err(MatchposeError::detection("synthetic detector failure"))
    }
}

/// Classifier that records every tensor it sees and answers from a script.
struct RecordingClassifier {
    response: HashMap<String, f32>,
    calls: Mutex<Vec<WindowTensor>>,
}

impl RecordingClassifier {
    fn new(response: HashMap<String, f32>) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn tensor(&self, index: usize) -> WindowTensor {
        self.calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ActionClassifier for RecordingClassifier {
    async fn load(&self) -> MatchposeResult<()> {
        Ok(())
    }

    async fn predict(&self, window: &WindowTensor) -> MatchposeResult<HashMap<String, f32>> {
        self.calls.lock().unwrap().push(window.clone());
        Ok(self.response.clone())
    }
}

struct FailingClassifier {
    calls: AtomicUsize,
}

impl FailingClassifier {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ActionClassifier for FailingClassifier {
    async fn load(&self) -> MatchposeResult<()> {
        Ok(())
    }

    async fn predict(&self, _window: &WindowTensor) -> MatchposeResult<HashMap<String, f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MatchposeError::classification("synthetic classifier failure"))
    }
}

struct UnloadableClassifier;

#[async_trait]
impl ActionClassifier for UnloadableClassifier {
    async fn load(&self) -> MatchposeResult<()> {
        Err(MatchposeError::model_load("weights file missing"))
    }

    async fn predict(&self, _window: &WindowTensor) -> MatchposeResult<HashMap<String, f32>> {
        Ok(HashMap::new())
    }
}

struct GrantingAuthorizer;

#[async_trait]
impl StreamAuthorizer for GrantingAuthorizer {
    async fn authorize(&self) -> MatchposeResult<()> {
        Ok(())
    }
}

struct DenyingAuthorizer;

#[async_trait]
impl StreamAuthorizer for DenyingAuthorizer {
    async fn authorize(&self) -> MatchposeResult<()> {
        Err(MatchposeError::authorization("camera access denied"))
    }
}

/// Offer a frame the way a paced producer would: retry the next delivery
/// slot while the consumer is busy finishing the previous routine.
async fn offer_until_accepted(
    feed: &matchpose_recognition_engine::FrameFeed,
    video_frame: VideoFrame,
) {
    loop {
        match feed.offer(video_frame.clone()) {
            FrameAdmission::Accepted => return,
            FrameAdmission::DroppedBusy => tokio::task::yield_now().await,
            FrameAdmission::Halted => panic!("pipeline halted unexpectedly"),
        }
    }
}

/// Offer a frame and wait for its routine to finish (overlay publishes
/// once per processed frame).
async fn offer_and_settle(
    feed: &matchpose_recognition_engine::FrameFeed,
    overlay: &mut tokio::sync::watch::Receiver<Option<Skeleton>>,
    video_frame: VideoFrame,
) {
    offer_until_accepted(feed, video_frame).await;
    within(overlay.changed()).await.unwrap();
}

#[tokio::test]
async fn single_flight_drops_frame_arriving_mid_processing() {
    let detector = Arc::new(GatedDetector::new());
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[("no_pose", 0.95)])));
    let (pipeline, feed) =
        FramePipeline::start(small_config(5, 2), detector.clone(), classifier);
    let outputs = pipeline.outputs();
    let mut overlay = outputs.overlay.clone();

    assert_eq!(feed.offer(frame(0)), FrameAdmission::Accepted);
    detector.wait_until_entered().await;

    // Frame 1 arrives strictly before frame 0 finishes: dropped, not queued.
    assert_eq!(feed.offer(frame(1)), FrameAdmission::DroppedBusy);

    detector.release.add_permits(1);
    within(overlay.changed()).await.unwrap();

    let stats = pipeline.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.dropped, 1);
    assert!((stats.drop_rate() - 50.0).abs() < 1e-9);

    // The guard released after completion: the next frame gets admitted.
    offer_until_accepted(&feed, frame(2)).await;
    detector.wait_until_entered().await;
    detector.release.add_permits(1);
    within(overlay.changed()).await.unwrap();

    assert_eq!(pipeline.stats().accepted, 2);
    pipeline.shutdown().await;
}

#[tokio::test]
async fn subjectless_frames_advance_window_and_classify_all_zero() {
    let detector = Arc::new(StaticDetector::new(vec![]));
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[("no_pose", 0.95)])));
    let (pipeline, feed) =
        FramePipeline::start(small_config(5, 2), detector, classifier.clone());
    let outputs = pipeline.outputs();
    let mut overlay = outputs.overlay.clone();

    for i in 0..5u64 {
        offer_and_settle(&feed, &mut overlay, frame(i)).await;
    }

    // Five subject-less frames advanced the window by five zero entries
    // and reached the classifier exactly once, with no stall.
    assert_eq!(classifier.call_count(), 1);
    let tensor = classifier.tensor(0);
    assert_eq!(tensor.frames(), 5);
    assert!(tensor.data().iter().all(|v| *v == 0.0));

    // A confident negative over an all-zero window is the no-subject
    // sentinel, never a confident target match.
    let prediction = outputs.prediction.borrow().clone();
    assert_eq!(prediction, Prediction::no_subject());
    assert_eq!(prediction.confidence(), None);

    assert_eq!(pipeline.stats().windows_classified, 1);
    pipeline.shutdown().await;
}

#[tokio::test]
async fn detector_failure_degrades_to_subjectless_frame() {
    let detector = Arc::new(FailingDetector);
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[("no_pose", 0.9)])));
    let (pipeline, feed) =
        FramePipeline::start(small_config(3, 1), detector, classifier.clone());
    let outputs = pipeline.outputs();
    let mut overlay = outputs.overlay.clone();

    for i in 0..3u64 {
        offer_and_settle(&feed, &mut overlay, frame(i)).await;
    }

    // The pipeline survived every failed detection and still classified
    // a full (all-zero) window.
    assert_eq!(pipeline.stats().accepted, 3);
    assert_eq!(classifier.call_count(), 1);
    assert_eq!(*outputs.prediction.borrow(), Prediction::no_subject());
    assert!(outputs.overlay.borrow().is_none());

    pipeline.shutdown().await;
}

#[tokio::test]
async fn classifier_failure_retains_previous_prediction() {
    let detector = Arc::new(StaticDetector::new(vec![subject()]));
    let classifier = Arc::new(FailingClassifier::new());
    let (pipeline, feed) =
        FramePipeline::start(small_config(2, 1), detector, classifier.clone());
    let outputs = pipeline.outputs();
    let mut overlay = outputs.overlay.clone();

    for i in 0..2u64 {
        offer_and_settle(&feed, &mut overlay, frame(i)).await;
    }

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    // The failure left the previous (initial) prediction untouched.
    assert_eq!(*outputs.prediction.borrow(), Prediction::starting());
    assert_eq!(pipeline.stats().windows_classified, 0);

    // The overlay still tracks the selected subject.
    assert!(outputs.overlay.borrow().is_some());

    pipeline.shutdown().await;
}

#[tokio::test]
async fn session_start_surfaces_model_load_failure() {
    let detector = Arc::new(StaticDetector::new(vec![subject()]));
    let mut session = RecognitionSession::new(
        small_config(3, 1),
        detector,
        Arc::new(UnloadableClassifier),
        Arc::new(GrantingAuthorizer),
    )
    .unwrap();

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, MatchposeError::ModelLoad { .. }));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.outputs().is_none());
}

#[tokio::test]
async fn session_start_surfaces_authorization_denial() {
    let detector = Arc::new(StaticDetector::new(vec![subject()]));
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[("no_pose", 0.9)])));
    let mut session = RecognitionSession::new(
        small_config(3, 1),
        detector.clone(),
        classifier,
        Arc::new(DenyingAuthorizer),
    )
    .unwrap();

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, MatchposeError::Authorization { .. }));
    assert_eq!(session.state(), SessionState::Idle);

    // Model load completed before authorization was attempted.
    assert_eq!(detector.load_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn full_round_lifecycle() {
    let detector = Arc::new(StaticDetector::new(vec![subject()]));
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[
        ("target_pose", 0.85),
        ("no_pose", 0.05),
    ])));
    let mut session = RecognitionSession::new(
        small_config(3, 1),
        detector,
        classifier,
        Arc::new(GrantingAuthorizer),
    )
    .unwrap();

    let feed = session.start().await.unwrap();
    assert_eq!(session.state(), SessionState::Playing);

    let outputs = session.outputs().unwrap();
    assert_eq!(*outputs.prediction.borrow(), Prediction::starting());
    let mut overlay = outputs.overlay.clone();

    for i in 0..3u64 {
        offer_and_settle(&feed, &mut overlay, frame(i)).await;
    }

    let outcome = session.stop().await.unwrap();
    assert_eq!(session.state(), SessionState::Ended);
    assert!((outcome.final_score - 0.85).abs() < 1e-6);
    assert_eq!(outcome.final_label, "target_pose");
    assert_eq!(outcome.thumbnail.unwrap().timestamp_ns, 2);

    // The producer is halted deterministically.
    assert_eq!(feed.offer(frame(9)), FrameAdmission::Halted);

    session.reset().unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.outcome().is_none());

    // The cycle repeats: a fresh round starts with a fresh prediction.
    let _feed = session.start().await.unwrap();
    let outputs = session.outputs().unwrap();
    assert_eq!(*outputs.prediction.borrow(), Prediction::starting());
    session.stop().await.unwrap();
}

#[tokio::test]
async fn stop_suppresses_in_flight_publishes() {
    let detector = Arc::new(GatedDetector::new());
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[("no_pose", 0.9)])));
    let (pipeline, feed) =
        FramePipeline::start(small_config(5, 2), detector.clone(), classifier);
    let outputs = pipeline.outputs();

    assert_eq!(feed.offer(frame(0)), FrameAdmission::Accepted);
    detector.wait_until_entered().await;

    let shutdown = tokio::spawn(pipeline.shutdown());
    // Let the shutdown raise the stopped flag while detect is in flight.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(feed.offer(frame(1)), FrameAdmission::Halted);

    detector.release.add_permits(1);
    within(shutdown).await.unwrap();

    // The routine finished after the stop request without resurrecting
    // any published state.
    assert_eq!(*outputs.prediction.borrow(), Prediction::starting());
    assert!(outputs.overlay.borrow().is_none());
}

#[tokio::test]
async fn wrong_state_transitions_are_rejected() {
    let detector = Arc::new(StaticDetector::new(vec![]));
    let classifier = Arc::new(RecordingClassifier::new(probabilities(&[("no_pose", 0.9)])));
    let mut session = RecognitionSession::new(
        small_config(3, 1),
        detector,
        classifier,
        Arc::new(GrantingAuthorizer),
    )
    .unwrap();

    assert!(session.stop().await.is_err());
    assert!(session.reset().is_err());

    session.start().await.unwrap();
    assert!(matches!(
        session.start().await.unwrap_err(),
        MatchposeError::Session { .. }
    ));
    session.stop().await.unwrap();
}
