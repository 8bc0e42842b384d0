//! Run a synthetic recognition round.

use std::sync::Arc;
use std::time::Duration;

use matchpose_common::clock::{RateController, SessionClock};
use matchpose_pose_model::frame::{Orientation, VideoFrame};
use matchpose_recognition_core::RecognizerConfig;
use matchpose_recognition_engine::RecognitionSession;

use crate::synthetic::{AlwaysAuthorized, SyntheticClassifier, SyntheticDetector};

/// Nominal pixel dimensions of the synthetic frames.
const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 64;

pub async fn run(
    duration: f64,
    fps: u32,
    window_capacity: usize,
    eviction_stride: usize,
    target_threshold: f32,
    negative_threshold: f32,
    fallback_threshold: f32,
    dropout_period: f64,
) -> anyhow::Result<()> {
    let config = RecognizerConfig {
        window_capacity,
        eviction_stride,
        target_threshold,
        negative_threshold,
        fallback_threshold,
        ..Default::default()
    };

    println!("Running synthetic round");
    println!("  Duration: {duration}s at {fps} fps");
    println!(
        "  Window: {} frames, stride {}",
        config.window_capacity, config.eviction_stride
    );
    println!("  Subject dropout period: {dropout_period}s");
    println!();

    let mut session = RecognitionSession::new(
        config,
        Arc::new(SyntheticDetector::new(dropout_period)),
        Arc::new(SyntheticClassifier::new("target_pose", "no_pose")),
        Arc::new(AlwaysAuthorized),
    )?;

    let feed = session.start().await?;
    let outputs = session
        .outputs()
        .ok_or_else(|| anyhow::anyhow!("session started without pipeline outputs"))?;
    let mut prediction_rx = outputs.prediction.clone();

    // One shared pixel buffer: frames are timestamps over static pixels.
    let pixels: Arc<[u8]> = vec![0u8; (FRAME_WIDTH * FRAME_HEIGHT) as usize].into();

    let clock = SessionClock::start();
    let mut rate = RateController::new(fps);
    // Tick well above the frame rate and let the controller pick the
    // frames, so pacing stays accurate under timer jitter.
    let mut ticker = tokio::time::interval(Duration::from_nanos(rate.interval_ns() / 4));

    while clock.elapsed_secs() < duration {
        ticker.tick().await;

        let now_ns = clock.elapsed_ns();
        if rate.should_tick(now_ns) {
            let frame = VideoFrame::new(
                pixels.clone(),
                FRAME_WIDTH,
                FRAME_HEIGHT,
                Orientation::Up,
                now_ns,
            );
            feed.offer(frame);
        }

        if prediction_rx.has_changed().unwrap_or(false) {
            let prediction = prediction_rx.borrow_and_update().clone();
            match prediction.confidence() {
                Some(confidence) => println!(
                    "[{:6.2}s] {} ({:.0}%)",
                    clock.elapsed_secs(),
                    prediction.label(),
                    confidence * 100.0
                ),
                None => println!("[{:6.2}s] {}", clock.elapsed_secs(), prediction.label()),
            }
        }
    }

    let stats = session
        .stats()
        .ok_or_else(|| anyhow::anyhow!("session lost its pipeline before stop"))?;
    let outcome = session.stop().await?;

    println!();
    println!("Round finished");
    println!("  Final label: {}", outcome.final_label);
    println!("  Final score: {:.2}", outcome.final_score);
    println!(
        "  Thumbnail: {}",
        match &outcome.thumbnail {
            Some(frame) => format!("{}x{} @ {:.2}s", frame.width, frame.height, frame.timestamp_secs()),
            None => "none".to_string(),
        }
    );
    println!(
        "  Frames: {} accepted, {} dropped ({:.1}% drop rate), {} windows classified",
        stats.accepted,
        stats.dropped,
        stats.drop_rate(),
        stats.windows_classified
    );

    Ok(())
}
