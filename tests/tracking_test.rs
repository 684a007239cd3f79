use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use approx::assert_relative_eq;
use instrack_rs::tracker::{translation, translation_norm};
use instrack_rs::{
    Detection, DetectionBuilder, MotionEstimate, ReconstructionVolume, Rect, SceneFlowSource,
    Track, TrackFrame, TrackState, score_matrix,
};
use nalgebra::Matrix4;

/// Flow provider answering from a table keyed by the current frame index.
#[derive(Default)]
struct TableFlow {
    motions: HashMap<u32, Matrix4<f64>>,
    queries: RefCell<Vec<(u32, u32)>>,
}

impl TableFlow {
    fn with(mut self, frame: u32, motion: Matrix4<f64>) -> Self {
        self.motions.insert(frame, motion);
        self
    }
}

impl SceneFlowSource for TableFlow {
    fn relative_motion(
        &self,
        previous: u32,
        current: u32,
        _region: &Rect,
    ) -> Option<Matrix4<f64>> {
        self.queries.borrow_mut().push((previous, current));
        self.motions.get(&current).copied()
    }
}

#[derive(Debug, Default)]
struct CountingVolume {
    reaps: Cell<u32>,
    last_weight: Cell<u32>,
}

impl ReconstructionVolume for CountingVolume {
    fn reap(&self, max_weight: u32) {
        self.reaps.set(self.reaps.get() + 1);
        self.last_weight.set(max_weight);
    }
}

fn frame(index: u32, x: f32, class_name: &str) -> TrackFrame {
    let detection = DetectionBuilder::new()
        .tlbr(x, 100.0, x + 50.0, 150.0)
        .score(0.9)
        .class_name(class_name)
        .build();
    TrackFrame::new(index, Arc::new(detection), Matrix4::identity())
}

#[test]
fn test_static_track_reverts_to_uncertain_after_pose_failures() {
    let flow = TableFlow::default().with(1, translation(0.05, 0.0, 0.0));
    let egomotion = Matrix4::identity();
    let mut track = Track::new(1);
    assert_eq!(track.state(), TrackState::Uncertain);
    assert_eq!(track.len(), 0);

    track.add_frame(frame(0, 0.0, "car")).unwrap();
    track.update(&egomotion, &flow, false).unwrap();
    assert_eq!(track.state(), TrackState::Uncertain);

    track.add_frame(frame(1, 0.0, "car")).unwrap();
    let estimate = track.update(&egomotion, &flow, true).unwrap();
    assert!(estimate.is_measured());
    assert_eq!(track.state(), TrackState::Static);

    for index in 2..=4 {
        track.add_frame(frame(index, 0.0, "car")).unwrap();
        track.update(&egomotion, &flow, false).unwrap();
        assert_eq!(track.state(), TrackState::Static);
    }

    track.add_frame(frame(5, 0.0, "car")).unwrap();
    track.update(&egomotion, &flow, false).unwrap();
    assert_eq!(track.state(), TrackState::Uncertain);
    assert_eq!(track.state_label(), "Uncertain");

    assert_eq!(
        *flow.queries.borrow(),
        vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]
    );
}

#[test]
fn test_moving_object_against_moving_camera() {
    // Camera drives forward 1.0 per frame. A parked car appears to recede by
    // the same amount; an oncoming car recedes twice as fast.
    let egomotion = translation(0.0, 0.0, 1.0).cast::<f32>();
    let parked_flow = TableFlow::default()
        .with(1, translation(0.0, 0.0, -1.0))
        .with(2, translation(0.0, 0.0, -1.02));
    let oncoming_flow = TableFlow::default()
        .with(1, translation(0.0, 0.0, -2.0))
        .with(2, translation(0.0, 0.0, -2.0));

    let mut parked = Track::new(1);
    let mut oncoming = Track::new(2);
    for index in 0..3 {
        parked.add_frame(frame(index, 0.0, "car")).unwrap();
        parked.update(&egomotion, &parked_flow, false).unwrap();
        oncoming.add_frame(frame(index, 300.0, "car")).unwrap();
        oncoming.update(&egomotion, &oncoming_flow, false).unwrap();
    }

    assert_eq!(parked.state(), TrackState::Static);
    assert_eq!(oncoming.state(), TrackState::Dynamic);

    let oncoming_pose = oncoming.frame_pose(2).unwrap().unwrap();
    assert_relative_eq!(translation_norm(&oncoming_pose), 2.0, epsilon = 1e-6);
}

#[test]
fn test_frame_pose_and_fusable_index_follow_known_links() {
    let flow = TableFlow::default()
        .with(2, translation(0.1, 0.0, 0.0))
        .with(4, translation(0.1, 0.0, 0.0));
    let mut track = Track::new(3);
    for index in 0..5 {
        track.add_frame(frame(index, 0.0, "car")).unwrap();
        track.update(&Matrix4::identity(), &flow, false).unwrap();
    }

    assert_eq!(track.first_fusable_frame_index(), Some(1));
    assert_eq!(track.frame_pose(0), Ok(Some(Matrix4::identity())));
    // Frame 1 has no relative pose, so every later pose is unknown too.
    for position in 1..5 {
        assert_eq!(track.frame_pose(position), Ok(None));
    }
}

#[test]
fn test_reconstruction_lifecycle() {
    let mut track = Track::new(4);
    for index in 0..6 {
        assert!(!track.eligible_for_reconstruction());
        track.add_frame(frame(index, 0.0, "car")).unwrap();
    }
    assert!(track.eligible_for_reconstruction());

    let volume = Arc::new(CountingVolume::default());
    track.attach_reconstruction(volume.clone());
    assert!(track.has_reconstruction());

    for _ in 0..3 {
        track.count_fused_frame();
    }
    assert_eq!(track.reap_reconstruction(), Ok(1));

    for _ in 0..12 {
        track.count_fused_frame();
    }
    assert_eq!(track.reap_reconstruction(), Ok(5));
    assert_eq!(volume.reaps.get(), 2);
    assert_eq!(volume.last_weight.get(), 5);

    track.set_needs_cleanup(true);
    assert!(track.needs_cleanup());
    track.set_needs_cleanup(false);

    // The driver still holds a handle; dropping the track does not free the volume.
    drop(track);
    assert_eq!(Arc::strong_count(&volume), 1);
}

#[test]
fn test_frame_assignment_by_score() {
    let mut car = Track::new(10);
    car.add_frame(frame(0, 0.0, "car")).unwrap();
    let mut person = Track::new(11);
    person.add_frame(frame(0, 200.0, "person")).unwrap();
    let tracks = [car, person];

    let candidates = vec![
        frame(1, 210.0, "person"),
        frame(1, 10.0, "car"),
        TrackFrame::new(
            1,
            Arc::new(Detection::from_rect(Rect::new(0.0, 100.0, 50.0, 50.0), 0.8, "bicycle")),
            Matrix4::identity(),
        ),
    ];
    let scores = score_matrix(&tracks, &candidates);

    assert_eq!(scores[[0, 0]], 0.0);
    assert!(scores[[0, 1]] > 0.5);
    assert!(scores[[1, 0]] > 0.5);
    assert_eq!(scores[[1, 1]], 0.0);
    // Same box as the car, different class.
    assert_eq!(scores[[0, 2]], 0.0);
}

#[test]
fn test_start_and_end_bound_all_frames() {
    let mut track = Track::new(5);
    for index in [2, 3, 3, 7, 12] {
        track.add_frame(frame(index, 0.0, "car")).unwrap();
    }
    let start = track.start_time().unwrap();
    let end = track.end_time().unwrap();
    assert!(track.frames().windows(2).all(|w| w[0].frame_index <= w[1].frame_index));
    assert!(
        track
            .frames()
            .iter()
            .all(|f| start <= f.frame_index && f.frame_index <= end)
    );
    assert!(track.add_frame(frame(11, 0.0, "car")).is_err());
}

#[test]
fn test_extrapolated_motion_does_not_count_as_evidence() {
    let flow = TableFlow::default().with(1, translation(0.6, 0.0, 0.0));
    let mut track = Track::new(6);
    let mut estimates = Vec::new();
    for index in 0..5 {
        track.add_frame(frame(index, 0.0, "car")).unwrap();
        estimates.push(track.update(&Matrix4::identity(), &flow, false).unwrap());
    }

    assert_eq!(estimates[0], MotionEstimate::Unavailable);
    assert!(estimates[1].is_measured());
    assert_eq!(estimates[2], MotionEstimate::Extrapolated(translation(0.6, 0.0, 0.0)));
    assert_eq!(estimates[3], MotionEstimate::Extrapolated(translation(0.6, 0.0, 0.0)));
    // Dynamic tolerates two pose failures; the third reverts it.
    assert_eq!(track.state(), TrackState::Uncertain);
}
