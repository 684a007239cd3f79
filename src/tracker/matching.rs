//! Matching scores between tracks and new observations.

use ndarray::Array2;

use crate::tracker::track::{Track, TrackConfig};
use crate::tracker::track_frame::TrackFrame;

/// How well `candidate` continues a track whose newest frame is `last`.
///
/// Returns 0.0 for a candidate that is not strictly newer than `last`, has a
/// different class, does not overlap, or comes after more than
/// `max_frame_gap` frames. Otherwise the bounding box overlap ratio is
/// discounted by `gap_decay` for every missed frame.
pub fn score_frames(last: &TrackFrame, candidate: &TrackFrame, config: &TrackConfig) -> f32 {
    if candidate.frame_index <= last.frame_index {
        return 0.0;
    }

    if candidate.class_name() != last.class_name() {
        return 0.0;
    }

    let gap = candidate.frame_index - last.frame_index;
    if gap > config.max_frame_gap {
        return 0.0;
    }

    let last_box = last.instance_view.bounding_box();
    let candidate_box = candidate.instance_view.bounding_box();
    let overlap = last_box.overlap_ratio(&candidate_box);

    let time_discount = config.gap_decay.powi(gap as i32 - 1);
    (overlap * time_discount).clamp(0.0, 1.0)
}

/// Score matrix of shape (tracks, candidates) for the external assignment step.
pub fn score_matrix(tracks: &[Track], candidates: &[TrackFrame]) -> Array2<f32> {
    let mut scores = Array2::zeros((tracks.len(), candidates.len()));
    for (i, track) in tracks.iter().enumerate() {
        for (j, candidate) in candidates.iter().enumerate() {
            scores[[i, j]] = track.score_match(candidate);
        }
    }
    scores
}
