//! Contract for the sparse scene flow provider.

use nalgebra::Matrix4;

use crate::tracker::Rect;

/// Estimates the rigid motion of the points inside an image region between
/// two frames, from sparse scene flow correspondences.
///
/// Returns the motion in the camera frame of the current frame; camera
/// egomotion is not removed. `None` means no reliable estimate exists, e.g.
/// too few correspondences fall inside the region.
pub trait SceneFlowSource {
    fn relative_motion(
        &self,
        previous_frame: u32,
        current_frame: u32,
        region: &Rect,
    ) -> Option<Matrix4<f64>>;
}
