//! Static/dynamic confidence state of a track and its transition policy.

use std::fmt;
use std::str::FromStr;

use crate::error::TrackError;
use crate::tracker::track::TrackConfig;

/// Confidence state of a track's motion classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Object does not move relative to the world
    Static,
    /// Object moves independently of the camera
    Dynamic,
    /// Not enough relative motion information to decide
    #[default]
    Uncertain,
}

impl TrackState {
    pub fn label(&self) -> &'static str {
        match self {
            TrackState::Static => "Static",
            TrackState::Dynamic => "Dynamic",
            TrackState::Uncertain => "Uncertain",
        }
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrackState {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Static" => Ok(TrackState::Static),
            "Dynamic" => Ok(TrackState::Dynamic),
            "Uncertain" => Ok(TrackState::Uncertain),
            other => Err(TrackError::UnknownState(other.to_string())),
        }
    }
}

/// When a dynamic track may be demoted back to static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicDemotion {
    /// A dynamic track only ever leaves `Dynamic` by becoming `Uncertain`.
    #[default]
    Never,
    /// Demote after this many consecutive low-residual frames with a known pose.
    AfterLowResidualRun(u32),
}

/// What one frame's motion estimate says about the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvidence {
    /// Residual translation below the threshold
    Stationary,
    /// Residual translation at or above the threshold
    Moving,
    /// No relative pose could be estimated
    Unavailable,
}

impl MotionEvidence {
    pub fn from_residual(residual: Option<f64>, threshold: f32) -> Self {
        match residual {
            Some(r) if r < threshold as f64 => MotionEvidence::Stationary,
            Some(_) => MotionEvidence::Moving,
            None => MotionEvidence::Unavailable,
        }
    }
}

/// Hysteresis state machine driving [`TrackState`].
///
/// Leaving `Uncertain` takes a single frame with a known pose. Falling back
/// to `Uncertain` requires strictly more consecutive pose failures than the
/// state's tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateMachine {
    state: TrackState,
    /// Consecutive frames without a relative pose
    uncertain_frames: u32,
    /// Consecutive low-residual frames observed while dynamic
    low_residual_run: u32,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn uncertain_frames(&self) -> u32 {
        self.uncertain_frames
    }

    pub fn low_residual_run(&self) -> u32 {
        self.low_residual_run
    }

    /// Feed one frame of evidence. Returns the new state if it changed.
    pub fn advance(
        &mut self,
        evidence: MotionEvidence,
        config: &TrackConfig,
    ) -> Option<TrackState> {
        let next = match (self.state, evidence) {
            (TrackState::Uncertain, MotionEvidence::Stationary) => TrackState::Static,
            (TrackState::Uncertain, MotionEvidence::Moving) => TrackState::Dynamic,
            (TrackState::Uncertain, MotionEvidence::Unavailable) => TrackState::Uncertain,

            (TrackState::Static, MotionEvidence::Stationary) => {
                self.uncertain_frames = 0;
                TrackState::Static
            }
            (TrackState::Static, MotionEvidence::Moving) => TrackState::Dynamic,
            (TrackState::Static, MotionEvidence::Unavailable) => {
                self.count_failure(config.max_uncertain_frames_static)
            }

            (TrackState::Dynamic, MotionEvidence::Stationary) => {
                self.uncertain_frames = 0;
                self.low_residual_run = self.low_residual_run.saturating_add(1);
                match config.dynamic_demotion {
                    DynamicDemotion::AfterLowResidualRun(run) if self.low_residual_run >= run => {
                        TrackState::Static
                    }
                    _ => TrackState::Dynamic,
                }
            }
            (TrackState::Dynamic, MotionEvidence::Moving) => {
                self.uncertain_frames = 0;
                self.low_residual_run = 0;
                TrackState::Dynamic
            }
            (TrackState::Dynamic, MotionEvidence::Unavailable) => {
                self.count_failure(config.max_uncertain_frames_dynamic)
            }
        };

        if next == self.state {
            return None;
        }

        self.state = next;
        self.uncertain_frames = 0;
        self.low_residual_run = 0;
        Some(next)
    }

    fn count_failure(&mut self, tolerance: u32) -> TrackState {
        self.uncertain_frames = self.uncertain_frames.saturating_add(1);
        if self.uncertain_frames > tolerance {
            TrackState::Uncertain
        } else {
            self.state
        }
    }
}
