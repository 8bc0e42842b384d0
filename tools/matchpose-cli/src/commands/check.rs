//! Check configuration and engine readiness.

use matchpose_common::config::AppConfig;
use matchpose_recognition_core::RecognizerConfig;

struct Readiness {
    name: &'static str,
    detail: String,
    ok: bool,
    required: bool,
}

pub fn run() -> anyhow::Result<()> {
    println!("MatchPose Engine Check");
    println!("{}", "=".repeat(50));

    let app = AppConfig::load();
    let config = RecognizerConfig {
        window_capacity: app.recognition.window_capacity,
        eviction_stride: app.recognition.eviction_stride,
        target_threshold: app.recognition.target_threshold,
        negative_threshold: app.recognition.negative_threshold,
        fallback_threshold: app.recognition.fallback_threshold,
        ..Default::default()
    };

    let checks = vec![
        check_recognizer(&config),
        check_model_file(&app, "pose_detector.onnx", "Pose detector model"),
        check_model_file(&app, "action_classifier.onnx", "Action classifier model"),
    ];

    for check in &checks {
        let status = if check.ok {
            "[OK]"
        } else if check.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };
        println!("  {} {}: {}", status, check.name, check.detail);
    }

    println!();
    println!("Effective recognizer configuration:");
    println!("{}", serde_json::to_string_pretty(&config)?);

    let all_required_ok = checks.iter().filter(|c| c.required).all(|c| c.ok);
    println!();
    if all_required_ok {
        println!("Engine configuration is valid. Synthetic rounds are available via `matchpose run`.");
    } else {
        println!("Engine configuration is invalid. Fix the items above.");
    }

    Ok(())
}

fn check_recognizer(config: &RecognizerConfig) -> Readiness {
    match config.validate() {
        Ok(()) => Readiness {
            name: "Recognizer parameters",
            detail: format!(
                "window {} / stride {}, thresholds {:.2}/{:.2}/{:.2}",
                config.window_capacity,
                config.eviction_stride,
                config.target_threshold,
                config.negative_threshold,
                config.fallback_threshold
            ),
            ok: true,
            required: true,
        },
        Err(e) => Readiness {
            name: "Recognizer parameters",
            detail: e.to_string(),
            ok: false,
            required: true,
        },
    }
}

/// Model files are only needed for real predictors; synthetic rounds run
/// without them.
fn check_model_file(app: &AppConfig, file: &str, name: &'static str) -> Readiness {
    let path = app.models_dir.join(file);
    Readiness {
        name,
        detail: path.display().to_string(),
        ok: path.exists(),
        required: false,
    }
}
