//! Contract for the volumetric reconstruction owned by a track.

use std::fmt;

/// Weight used for the first reaping passes, before much has been fused.
const MIN_REAP_WEIGHT: u32 = 1;
/// Upper bound on the reaping weight, bounding the cost of a single pass.
const MAX_REAP_WEIGHT: u32 = 5;
const REAP_WEIGHT_PER_FUSED_FRAME: f64 = 0.33;

/// Handle to an object's incremental 3D reconstruction in the fusion engine.
///
/// Shared between the driver and the track through an `Arc`. The volume is
/// released when the last holder drops it. Implementations do their own
/// synchronization if volumes are processed from several threads.
pub trait ReconstructionVolume: fmt::Debug {
    /// Decays voxels whose accumulated weight is at most `max_weight`.
    fn reap(&self, max_weight: u32);
}

/// Reaping weight for a volume with `fused_frames` frames integrated.
///
/// More fused evidence allows more aggressive decay: `round(0.33 * n)`,
/// clamped to `[1, 5]`.
pub fn reap_weight(fused_frames: u32) -> u32 {
    let weight = (REAP_WEIGHT_PER_FUSED_FRAME * fused_frames as f64).round() as u32;
    weight.clamp(MIN_REAP_WEIGHT, MAX_REAP_WEIGHT)
}
