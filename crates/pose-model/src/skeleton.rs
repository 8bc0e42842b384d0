//! Detected skeletons and their keypoints.
//!
//! A skeleton is the set of joints the detector saw for one person in one
//! frame. Joints the detector did not report at all are *missing*, which
//! is a different condition from a reported joint with low confidence;
//! the distinction matters to the encoder.

use crate::joint::Joint;

/// A single detected keypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Normalized X coordinate [0.0, 1.0].
    pub x: f32,
    /// Normalized Y coordinate [0.0, 1.0].
    pub y: f32,
    /// Detector confidence score [0.0, 1.0].
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

/// One person's detected joints for one frame.
///
/// Not mutated after the detector produces it; the engine reads it once
/// for selection and encoding and then discards it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    joints: [Option<Keypoint>; Joint::COUNT],
}

impl Skeleton {
    /// A skeleton with every joint missing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style joint insertion, used by detectors and tests.
    pub fn with_joint(mut self, joint: Joint, keypoint: Keypoint) -> Self {
        self.joints[joint as usize] = Some(keypoint);
        self
    }

    pub fn set(&mut self, joint: Joint, keypoint: Keypoint) {
        self.joints[joint as usize] = Some(keypoint);
    }

    /// The keypoint for a joint, or `None` if the detector did not report it.
    pub fn get(&self, joint: Joint) -> Option<Keypoint> {
        self.joints[joint as usize]
    }

    /// Number of joints the detector reported.
    pub fn visible_joints(&self) -> usize {
        self.joints.iter().filter(|j| j.is_some()).count()
    }

    /// Iterate over reported joints in canonical order.
    pub fn iter_present(&self) -> impl Iterator<Item = (Joint, Keypoint)> + '_ {
        Joint::ALL
            .iter()
            .filter_map(|joint| self.joints[*joint as usize].map(|kp| (*joint, kp)))
    }

    /// Axis-aligned bounding box over the reported joints.
    ///
    /// `None` when the skeleton has no reported joints at all.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut present = self.iter_present().map(|(_, kp)| kp);
        let first = present.next()?;

        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for kp in present {
            bbox.min_x = bbox.min_x.min(kp.x);
            bbox.min_y = bbox.min_y.min(kp.y);
            bbox.max_x = bbox.max_x.max(kp.x);
            bbox.max_y = bbox.max_y.max(kp.y);
        }
        Some(bbox)
    }

    /// Bounding-box area, with jointless skeletons reading as zero.
    pub fn area(&self) -> f32 {
        self.bounding_box().map(|b| b.area()).unwrap_or(0.0)
    }
}

/// Axis-aligned bounding box in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_skeleton_has_no_bbox() {
        let skeleton = Skeleton::empty();
        assert_eq!(skeleton.visible_joints(), 0);
        assert!(skeleton.bounding_box().is_none());
        assert_eq!(skeleton.area(), 0.0);
    }

    #[test]
    fn test_single_joint_bbox_is_degenerate() {
        let skeleton = Skeleton::empty().with_joint(Joint::Nose, Keypoint::new(0.5, 0.3, 0.9));
        let bbox = skeleton.bounding_box().unwrap();
        assert_eq!(bbox.min_x, 0.5);
        assert_eq!(bbox.max_x, 0.5);
        assert_eq!(bbox.area(), 0.0);
    }

    #[test]
    fn test_bbox_spans_all_present_joints() {
        let skeleton = Skeleton::empty()
            .with_joint(Joint::Nose, Keypoint::new(0.4, 0.1, 0.9))
            .with_joint(Joint::LeftAnkle, Keypoint::new(0.6, 0.9, 0.8))
            .with_joint(Joint::RightWrist, Keypoint::new(0.2, 0.5, 0.7));

        let bbox = skeleton.bounding_box().unwrap();
        assert!((bbox.min_x - 0.2).abs() < 1e-6);
        assert!((bbox.max_x - 0.6).abs() < 1e-6);
        assert!((bbox.min_y - 0.1).abs() < 1e-6);
        assert!((bbox.max_y - 0.9).abs() < 1e-6);
        assert!((bbox.area() - 0.4 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_iter_present_follows_canonical_order() {
        let skeleton = Skeleton::empty()
            .with_joint(Joint::LeftEar, Keypoint::new(0.1, 0.1, 0.5))
            .with_joint(Joint::Nose, Keypoint::new(0.2, 0.2, 0.5));

        let joints: Vec<Joint> = skeleton.iter_present().map(|(j, _)| j).collect();
        assert_eq!(joints, vec![Joint::Nose, Joint::LeftEar]);
    }
}
