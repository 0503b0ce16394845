//! Pose estimator capability.
//!
//! The analysis core never depends on a concrete estimator. Extraction code
//! injects anything implementing [`PoseEstimator`] and gets back an ordered
//! frame sequence ready for [`crate::swing::analyze_swing`].

use super::landmark::{PoseFrame, PoseLandmark};

/// Given an image, return landmarks or nothing.
pub trait PoseEstimator {
    type Image;

    fn estimate(&mut self, image: &Self::Image) -> Option<Vec<PoseLandmark>>;
}

/// Run an estimator over timestamped images in order.
///
/// Images without a detection still produce a frame (with no landmarks) so
/// that frame numbering stays aligned with the source clip.
pub fn collect_pose_frames<E: PoseEstimator>(
    estimator: &mut E,
    images: &[(f64, E::Image)],
) -> Vec<PoseFrame> {
    let mut missed = 0usize;
    let frames: Vec<PoseFrame> = images
        .iter()
        .enumerate()
        .map(|(i, (timestamp, image))| {
            let landmarks = estimator.estimate(image).unwrap_or_else(|| {
                missed += 1;
                Vec::new()
            });
            PoseFrame::new(*timestamp, i as u32, landmarks)
        })
        .collect();

    if missed > 0 {
        log::debug!("Pose estimator returned nothing for {}/{} frames", missed, frames.len());
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::LandmarkIndex;

    /// Detects a person only on even-valued images.
    struct EvenOnly;

    impl PoseEstimator for EvenOnly {
        type Image = u32;

        fn estimate(&mut self, image: &u32) -> Option<Vec<PoseLandmark>> {
            if image % 2 == 0 {
                Some(vec![PoseLandmark::new(0.5, 0.5, 0.0, 0.9); LandmarkIndex::COUNT])
            } else {
                None
            }
        }
    }

    #[test]
    fn test_collect_keeps_alignment() {
        let images = vec![(0.0, 0u32), (33.3, 1), (66.7, 2)];
        let frames = collect_pose_frames(&mut EvenOnly, &images);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].frame_number, 1);
        assert!(frames[1].landmarks.is_empty());
        assert_eq!(frames[2].landmarks.len(), LandmarkIndex::COUNT);
        assert_eq!(frames[2].timestamp, 66.7);
    }
}
