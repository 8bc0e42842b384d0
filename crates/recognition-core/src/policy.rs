//! The tiered decision policy over classifier probabilities.

use std::collections::HashMap;

use matchpose_pose_model::prediction::Prediction;

use crate::config::RecognizerConfig;

/// Map classifier probabilities to a confidence-tiered prediction.
///
/// Tiers, evaluated in order, first match wins:
/// 1. target-class probability above the target threshold and above the
///    negative-class probability → scored target prediction
/// 2. negative-class probability above the negative threshold → no-subject
///    sentinel
/// 3. overall best probability above the fallback threshold → scored
///    best-label prediction
/// 4. otherwise → low-confidence sentinel
///
/// Exactly one tier fires for any input. Labels absent from the map read
/// as probability zero. Equal maximal probabilities in tier 3 break by
/// lexicographic label order, so the function is a pure function of its
/// input despite the map's unordered iteration.
pub fn decide(probabilities: &HashMap<String, f32>, config: &RecognizerConfig) -> Prediction {
    let target_p = probabilities
        .get(&config.target_label)
        .copied()
        .unwrap_or(0.0);
    let negative_p = probabilities
        .get(&config.negative_label)
        .copied()
        .unwrap_or(0.0);

    if target_p > config.target_threshold && target_p > negative_p {
        return Prediction::scored(config.target_label.clone(), target_p);
    }

    if negative_p > config.negative_threshold {
        return Prediction::no_subject();
    }

    if let Some((label, p)) = best_label(probabilities) {
        if p > config.fallback_threshold {
            return Prediction::scored(label.clone(), p);
        }
    }

    Prediction::low_confidence()
}

/// Highest-probability entry, ties broken by label order.
fn best_label(probabilities: &HashMap<String, f32>) -> Option<(&String, f32)> {
    let mut best: Option<(&String, f32)> = None;
    for (label, p) in probabilities {
        best = match best {
            Some((best_label, best_p)) => {
                if *p > best_p || (*p == best_p && label < best_label) {
                    Some((label, *p))
                } else {
                    Some((best_label, best_p))
                }
            }
            None => Some((label, *p)),
        };
    }
    best
}
