//! Contracts for the collaborators a track depends on.
//!
//! The segmentation subsystem provides [`InstanceView`]s, the sparse scene
//! flow provider implements [`SceneFlowSource`], and the fusion engine hands
//! out [`ReconstructionVolume`] handles.

mod builder;
mod detector;
mod reconstruction;
mod scene_flow;

pub use builder::DetectionBuilder;
pub use detector::{Detection, InstanceView};
pub use reconstruction::{ReconstructionVolume, reap_weight};
pub use scene_flow::SceneFlowSource;
