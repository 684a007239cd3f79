//! Single object track: observation history, motion state and reconstruction lifecycle.

use std::fmt::Write as _;
use std::sync::Arc;

use nalgebra::Matrix4;

use crate::error::{Result, TrackError};
use crate::integration::{ReconstructionVolume, SceneFlowSource, reap_weight};
use crate::tracker::matching;
use crate::tracker::motion::{self, MotionEstimate};
use crate::tracker::track_frame::TrackFrame;
use crate::tracker::track_state::{DynamicDemotion, MotionEvidence, StateMachine, TrackState};

/// Narrowest frame column in [`Track::ascii_art`].
const MIN_ASCII_COLUMN_WIDTH: usize = 3;

/// Configuration for a track's state estimation and matching.
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Pose failures a static track tolerates before becoming uncertain
    pub max_uncertain_frames_static: u32,
    /// Pose failures a dynamic track tolerates before becoming uncertain
    pub max_uncertain_frames_dynamic: u32,
    /// Residual translation separating static from dynamic objects
    pub translation_error_threshold: f32,
    /// When a dynamic track may become static again
    pub dynamic_demotion: DynamicDemotion,
    /// Maximum age, in frames, of a motion reused for extrapolation
    pub max_extrapolation_gap: u32,
    /// Frames a track must have before it may be reconstructed
    pub min_reconstruction_frames: usize,
    /// Score multiplier applied per missed frame
    pub gap_decay: f32,
    /// Largest frame gap a match may bridge
    pub max_frame_gap: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            max_uncertain_frames_static: 3,
            max_uncertain_frames_dynamic: 2,
            translation_error_threshold: 0.20,
            dynamic_demotion: DynamicDemotion::Never,
            max_extrapolation_gap: 3,
            min_reconstruction_frames: 6,
            gap_decay: 0.8,
            max_frame_gap: 10,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.translation_error_threshold > 0.0) {
            return Err(TrackError::config(format!(
                "translation_error_threshold must be positive, got {}",
                self.translation_error_threshold
            )));
        }
        if !(self.gap_decay > 0.0 && self.gap_decay <= 1.0) {
            return Err(TrackError::config(format!(
                "gap_decay must be in (0, 1], got {}",
                self.gap_decay
            )));
        }
        if self.max_frame_gap == 0 {
            return Err(TrackError::config("max_frame_gap must be at least 1"));
        }
        if self.dynamic_demotion == DynamicDemotion::AfterLowResidualRun(0) {
            return Err(TrackError::config("dynamic_demotion run length must be at least 1"));
        }
        Ok(())
    }
}

/// A detected object's track through multiple frames.
///
/// Frames are kept in non-decreasing frame index order. There can be gaps,
/// for frames in which the object was not detected.
#[derive(Debug)]
pub struct Track {
    id: u64,
    config: TrackConfig,
    frames: Vec<TrackFrame>,
    state: StateMachine,
    /// Reconstruction of the object, once the driver allocated one
    reconstruction: Option<Arc<dyn ReconstructionVolume>>,
    /// Whether the reconstruction is pending a full voxel decay pass
    needs_cleanup: bool,
    fused_frames: u32,
    // Constant velocity bookkeeping: frame index and value of the newest measured motion.
    last_known_motion_time: Option<u32>,
    last_known_motion: Matrix4<f64>,
}

impl Track {
    /// Create an empty, uncertain track. `id` must be unique for the driver's lifetime.
    pub fn new(id: u64) -> Self {
        Self::with_config(id, TrackConfig::default())
    }

    pub fn with_config(id: u64, config: TrackConfig) -> Self {
        Self {
            id,
            config,
            frames: Vec::new(),
            state: StateMachine::new(),
            reconstruction: None,
            needs_cleanup: false,
            fused_frames: 0,
            last_known_motion_time: None,
            last_known_motion: Matrix4::identity(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Append an observation. Rejects frames older than the newest one.
    pub fn add_frame(&mut self, frame: TrackFrame) -> Result<()> {
        if let Some(last) = self.frames.last() {
            if frame.frame_index < last.frame_index {
                return Err(TrackError::OutOfOrderFrame {
                    track_id: self.id,
                    last: last.frame_index,
                    new: frame.frame_index,
                });
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Evaluates how well `candidate` would extend this track, in `[0, 1]`.
    ///
    /// An empty track matches nothing.
    pub fn score_match(&self, candidate: &TrackFrame) -> f32 {
        match self.frames.last() {
            Some(last) => matching::score_frames(last, candidate, &self.config),
            None => 0.0,
        }
    }

    /// Estimates the newest frame's relative pose and re-evaluates the track state.
    ///
    /// Call once after adding the frame for the current time step. The
    /// returned estimate falls back to the last measured motion when scene
    /// flow fails, as long as that motion is recent enough.
    pub fn update<S>(
        &mut self,
        egomotion: &Matrix4<f32>,
        flow: &S,
        verbose: bool,
    ) -> Result<MotionEstimate>
    where
        S: SceneFlowSource + ?Sized,
    {
        let len = self.frames.len();
        if len == 0 {
            return Err(TrackError::EmptyTrack(self.id));
        }

        let current_index = self.frames[len - 1].frame_index;
        let relative_pose = if len >= 2 {
            let previous_index = self.frames[len - 2].frame_index;
            let region = self.frames[len - 1].instance_view.bounding_box();
            flow.relative_motion(previous_index, current_index, &region)
                .map(|raw| motion::compensate_egomotion(egomotion, &raw))
        } else {
            None
        };
        self.frames[len - 1].relative_pose = relative_pose;

        let residual = relative_pose.as_ref().map(motion::translation_norm);
        let evidence =
            MotionEvidence::from_residual(residual, self.config.translation_error_threshold);
        log::debug!(
            "Track [{}] frame {}: residual {:?}, evidence {:?}",
            self.id,
            current_index,
            residual,
            evidence
        );

        let previous_state = self.state.state();
        if let Some(next) = self.state.advance(evidence, &self.config) {
            if verbose {
                log::info!(
                    "Track [{}] ({}) {} -> {} at frame {}",
                    self.id,
                    self.frames[len - 1].class_name(),
                    previous_state,
                    next,
                    current_index
                );
            } else {
                log::debug!("Track [{}] {} -> {}", self.id, previous_state, next);
            }
        }

        let estimate = match relative_pose {
            Some(pose) => {
                self.last_known_motion = pose;
                self.last_known_motion_time = Some(current_index);
                MotionEstimate::Measured(pose)
            }
            None => match self.last_known_motion_time {
                Some(time) if current_index - time <= self.config.max_extrapolation_gap => {
                    MotionEstimate::Extrapolated(self.last_known_motion)
                }
                _ => MotionEstimate::Unavailable,
            },
        };
        Ok(estimate)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[TrackFrame] {
        &self.frames
    }

    pub fn frame(&self, position: usize) -> Option<&TrackFrame> {
        self.frames.get(position)
    }

    pub fn last_frame(&self) -> Result<&TrackFrame> {
        self.frames.last().ok_or(TrackError::EmptyTrack(self.id))
    }

    pub fn start_time(&self) -> Option<u32> {
        self.frames.first().map(|f| f.frame_index)
    }

    pub fn end_time(&self) -> Option<u32> {
        self.frames.last().map(|f| f.frame_index)
    }

    /// Class of the object, taken from the newest observation.
    pub fn class_name(&self) -> Result<&str> {
        Ok(self.last_frame()?.class_name())
    }

    pub fn state(&self) -> TrackState {
        self.state.state()
    }

    pub fn state_label(&self) -> &'static str {
        self.state.state().label()
    }

    /// Whether the track carries enough observations to start a 3D reconstruction.
    pub fn eligible_for_reconstruction(&self) -> bool {
        self.frames.len() >= self.config.min_reconstruction_frames
    }

    /// Relative pose of the frame at `position` w.r.t. the track's first frame.
    ///
    /// `None` if any link of the chain is unknown.
    pub fn frame_pose(&self, position: usize) -> Result<Option<Matrix4<f64>>> {
        if position >= self.frames.len() {
            return Err(TrackError::FrameOutOfRange {
                track_id: self.id,
                position,
                len: self.frames.len(),
            });
        }

        let pose = self.frames[1..=position]
            .iter()
            .try_fold(Matrix4::identity(), |pose, frame| {
                frame.relative_pose.map(|relative| relative * pose)
            });
        Ok(pose)
    }

    /// Position of the frame right before the first frame with a known
    /// relative pose, which anchors batched fusion.
    pub fn first_fusable_frame_index(&self) -> Option<usize> {
        self.frames
            .iter()
            .position(|f| f.relative_pose.is_some())
            .map(|i| i.saturating_sub(1))
    }

    pub fn has_reconstruction(&self) -> bool {
        self.reconstruction.is_some()
    }

    pub fn reconstruction(&self) -> Option<&Arc<dyn ReconstructionVolume>> {
        self.reconstruction.as_ref()
    }

    /// Hands the track its reconstruction, returning any previously attached one.
    pub fn attach_reconstruction(
        &mut self,
        volume: Arc<dyn ReconstructionVolume>,
    ) -> Option<Arc<dyn ReconstructionVolume>> {
        self.reconstruction.replace(volume)
    }

    /// Detaches the reconstruction so the driver can free it.
    pub fn release_reconstruction(&mut self) -> Option<Arc<dyn ReconstructionVolume>> {
        let volume = self.reconstruction.take();
        if volume.is_some() {
            log::warn!(
                "Releasing reconstruction of track [{}] after {} fused frames",
                self.id,
                self.fused_frames
            );
            self.needs_cleanup = false;
        }
        volume
    }

    pub fn needs_cleanup(&self) -> bool {
        self.needs_cleanup
    }

    pub fn set_needs_cleanup(&mut self, needs_cleanup: bool) {
        self.needs_cleanup = needs_cleanup;
    }

    pub fn count_fused_frame(&mut self) {
        self.fused_frames += 1;
    }

    pub fn fused_frames(&self) -> u32 {
        self.fused_frames
    }

    /// Runs a bounded decay pass on the reconstruction. Returns the weight used.
    pub fn reap_reconstruction(&self) -> Result<u32> {
        let volume = self
            .reconstruction
            .as_ref()
            .ok_or(TrackError::NoReconstruction(self.id))?;
        let weight = reap_weight(self.fused_frames);
        log::info!("Reaping track [{}] with max weight [{}].", self.id, weight);
        volume.reap(weight);
        Ok(weight)
    }

    /// Draws the frames of this track on a timeline.
    ///
    /// For an object seen in frames 1, 2 and 4 this looks like
    /// `Object #   7 [     1  2     4]`. Columns are wide enough for the
    /// newest frame index plus one separator space.
    pub fn ascii_art(&self) -> String {
        self.ascii_art_with_width(MIN_ASCII_COLUMN_WIDTH)
    }

    /// Like [`Track::ascii_art`], with at least `column_width` characters per
    /// frame. Drawing several tracks with the width of the newest frame among
    /// them lines up their columns.
    pub fn ascii_art_with_width(&self, column_width: usize) -> String {
        let newest_digits = self.end_time().map(digit_count).unwrap_or(1);
        let width = column_width
            .max(MIN_ASCII_COLUMN_WIDTH)
            .max(newest_digits + 1);

        let mut out = format!("Object #{:>4} [", self.id);
        let mut column = 0;
        for frame in &self.frames {
            while column < frame.frame_index {
                out.push_str(&" ".repeat(width));
                column += 1;
            }
            let _ = write!(out, "{:>width$}", frame.frame_index);
            column = frame.frame_index + 1;
        }
        out.push(']');
        out
    }
}

fn digit_count(index: u32) -> usize {
    index.checked_ilog10().map_or(1, |d| d as usize + 1)
}

impl Drop for Track {
    fn drop(&mut self) {
        if self.reconstruction.is_some() {
            log::warn!(
                "Deleting track [{}] and its associated reconstruction!",
                self.id
            );
        }
    }
}
