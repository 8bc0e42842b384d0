//! Candidate selection among per-frame detections.

use matchpose_pose_model::skeleton::Skeleton;

/// Pick the most prominent skeleton from a frame's detections.
///
/// Prominence is approximated by bounding-box area over the visible
/// joints, with no identity tracking and no temporal continuity. Ties
/// resolve to the first occurrence in the input list, so the selection is
/// stable for identical inputs. Returns `None` iff the list is empty.
pub fn select_primary(candidates: &[Skeleton]) -> Option<&Skeleton> {
    let mut best: Option<(&Skeleton, f32)> = None;

    for candidate in candidates {
        let area = candidate.area();
        match best {
            // Strictly greater keeps the first occurrence on ties.
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((candidate, area)),
        }
    }

    best.map(|(skeleton, _)| skeleton)
}
