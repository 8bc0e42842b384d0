//! Keypoint encoding: one skeleton (or none) → one fixed-length vector.

use matchpose_pose_model::encoded::EncodedFrame;
use matchpose_pose_model::joint::Joint;
use matchpose_pose_model::skeleton::Skeleton;

/// Encode a skeleton into a fixed-length numeric vector.
///
/// For each joint in `joints`, in order, three values are emitted: x, y,
/// confidence. A joint the detector did not report (and the whole
/// no-skeleton case) encodes as `(0, 0, 0)`. Reported joints pass their
/// raw values through untouched; low-confidence joints are not filtered
/// here, that judgement belongs to the classifier.
///
/// Pure function: identical input always yields identical output, and the
/// output length is always `3 × joints.len()`.
pub fn encode(skeleton: Option<&Skeleton>, joints: &[Joint]) -> EncodedFrame {
    let mut values = Vec::with_capacity(joints.len() * matchpose_pose_model::VALUES_PER_JOINT);

    for joint in joints {
        match skeleton.and_then(|s| s.get(*joint)) {
            Some(kp) => {
                values.push(kp.x);
                values.push(kp.y);
                values.push(kp.confidence);
            }
            None => {
                values.push(0.0);
                values.push(0.0);
                values.push(0.0);
            }
        }
    }

    EncodedFrame::new(values)
}
