mod matching;
mod motion;
mod rect;
mod track;
mod track_frame;
mod track_state;

pub use matching::score_matrix;
pub use motion::{MotionEstimate, compensate_egomotion, translation, translation_norm};
pub use rect::Rect;
pub use track::{Track, TrackConfig};
pub use track_frame::TrackFrame;
pub use track_state::{DynamicDemotion, MotionEvidence, StateMachine, TrackState};
