//! Error types for track management.

use thiserror::Error;

/// Result type alias for track operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors raised when a track operation is called outside its preconditions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("track [{0}] has no frames")]
    EmptyTrack(u64),

    #[error("track [{0}] has no reconstruction")]
    NoReconstruction(u64),

    #[error("frame {new} precedes the last frame {last} of track [{track_id}]")]
    OutOfOrderFrame { track_id: u64, last: u32, new: u32 },

    #[error("frame position {position} is out of range for track [{track_id}] with {len} frames")]
    FrameOutOfRange {
        track_id: u64,
        position: usize,
        len: usize,
    },

    #[error("unknown track state label: {0}")]
    UnknownState(String),

    #[error("invalid track configuration: {0}")]
    InvalidConfig(String),
}

impl TrackError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
