//! Contract for the instance segmentation results a track refers to.

use std::fmt;

use crate::tracker::Rect;

/// One detected object instance in one frame, as produced by the
/// segmentation subsystem.
///
/// Tracks only hold shared references to views; the segmentation subsystem
/// owns the underlying masks and images.
///
/// # Example
///
/// ```ignore
/// use instrack_rs::{InstanceView, Rect};
///
/// #[derive(Debug)]
/// struct MaskRcnnInstance {
///     class: String,
///     bbox: Rect,
///     // mask, score, ...
/// }
///
/// impl InstanceView for MaskRcnnInstance {
///     fn class_name(&self) -> &str {
///         &self.class
///     }
///
///     fn bounding_box(&self) -> Rect {
///         self.bbox
///     }
/// }
/// ```
pub trait InstanceView: fmt::Debug {
    /// Semantic class label, e.g. "car".
    fn class_name(&self) -> &str;

    /// Image-space extent used for overlap scoring.
    fn bounding_box(&self) -> Rect;
}

/// Plain detection: a labelled box with a confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
    /// Semantic class label
    pub class_name: String,
}

impl Detection {
    /// Create a detection from a TLBR box.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_name: &str) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
            class_name: class_name.to_string(),
        }
    }

    pub fn from_rect(bbox: Rect, score: f32, class_name: &str) -> Self {
        Self {
            bbox,
            score,
            class_name: class_name.to_string(),
        }
    }
}

impl InstanceView for Detection {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn bounding_box(&self) -> Rect {
        self.bbox
    }
}
