//! Per-object track management for dynamic scene reconstruction.
//!
//! A [`Track`] accumulates the observations of one physical object over a
//! video sequence, decides whether the object is static or moving in the
//! world, and coordinates the lifecycle of the object's 3D reconstruction.
//! Detection, scene flow and volumetric fusion are provided by the caller
//! through the traits in [`integration`].

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackError};
pub use integration::{
    Detection, DetectionBuilder, InstanceView, ReconstructionVolume, SceneFlowSource, reap_weight,
};
pub use tracker::{
    DynamicDemotion, MotionEstimate, MotionEvidence, Rect, StateMachine, Track, TrackConfig,
    TrackFrame, TrackState, score_matrix,
};
