//! Relative motion of a tracked object between consecutive observations.

use nalgebra::Matrix4;

/// Relative object motion handed to downstream consumers after an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEstimate {
    /// Estimated from scene flow for the newest frame
    Measured(Matrix4<f64>),
    /// Last known frame-to-frame motion reused under a constant velocity assumption
    Extrapolated(Matrix4<f64>),
    /// Neither a fresh nor a recent enough motion is known
    Unavailable,
}

impl MotionEstimate {
    pub fn pose(&self) -> Option<&Matrix4<f64>> {
        match self {
            MotionEstimate::Measured(pose) | MotionEstimate::Extrapolated(pose) => Some(pose),
            MotionEstimate::Unavailable => None,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, MotionEstimate::Measured(_))
    }
}

/// Removes camera egomotion from an object's camera-frame motion.
///
/// For an object at rest in the world the result is close to identity.
pub fn compensate_egomotion(
    egomotion: &Matrix4<f32>,
    object_motion: &Matrix4<f64>,
) -> Matrix4<f64> {
    egomotion.cast::<f64>() * object_motion
}

/// Length of the translation part of a rigid transform.
pub fn translation_norm(transform: &Matrix4<f64>) -> f64 {
    transform.fixed_view::<3, 1>(0, 3).norm()
}

/// Builds a pure translation transform.
pub fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    let mut transform = Matrix4::identity();
    transform[(0, 3)] = x;
    transform[(1, 3)] = y;
    transform[(2, 3)] = z;
    transform
}
