//! One observation of a tracked object.

use std::sync::Arc;

use nalgebra::Matrix4;

use crate::integration::InstanceView;

/// One observation of a tracked object.
///
/// The relative pose is filled in by [`Track::update`](crate::Track::update)
/// once the frame is part of a track.
#[derive(Debug, Clone)]
pub struct TrackFrame {
    /// Index of the video frame this observation comes from
    pub frame_index: u32,
    /// Segmentation result for the object in this frame
    pub instance_view: Arc<dyn InstanceView>,
    /// Camera pose at capture time
    pub camera_pose: Matrix4<f32>,
    /// Egomotion-compensated motion since the previous frame of the track, if known
    pub(crate) relative_pose: Option<Matrix4<f64>>,
}

impl TrackFrame {
    pub fn new(
        frame_index: u32,
        instance_view: Arc<dyn InstanceView>,
        camera_pose: Matrix4<f32>,
    ) -> Self {
        Self {
            frame_index,
            instance_view,
            camera_pose,
            relative_pose: None,
        }
    }

    pub fn class_name(&self) -> &str {
        self.instance_view.class_name()
    }

    pub fn relative_pose(&self) -> Option<&Matrix4<f64>> {
        self.relative_pose.as_ref()
    }
}
