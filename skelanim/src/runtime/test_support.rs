use crate::{
    ActorHooks, Animation, AnimationConfig, BoneData, Curve, MarkerEvent, NodeTrack,
    SkeletonData, SourceData, TextKey, TextKeyMap, Vec3Frame,
};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-4,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

pub(crate) fn assert_vec_approx(actual: Vec3, expected: Vec3) {
    assert!(
        actual.abs_diff_eq(expected, 1.0e-4),
        "expected {expected}, got {actual}"
    );
}

/// Root, Bip01, pelvis, spine, both arms and a thigh.
pub(crate) fn biped_data() -> Arc<SkeletonData> {
    SkeletonData::new(vec![
        BoneData::new("Root", None),
        BoneData::new("Bip01", Some(0)),
        BoneData::new("Bip01 Pelvis", Some(1)),
        BoneData::new("Bip01 Spine1", Some(2)),
        BoneData::new("Bip01 L Clavicle", Some(3)),
        BoneData::new("Bip01 L Hand", Some(4)).with_translation(Vec3::new(-10.0, 0.0, 0.0)),
        BoneData::new("Bip01 R Clavicle", Some(3)),
        BoneData::new("Bip01 R Hand", Some(6)).with_translation(Vec3::new(10.0, 0.0, 0.0)),
        BoneData::new("Bip01 L Thigh", Some(2)),
    ])
    .expect("valid biped")
}

pub(crate) fn text_keys(keys: &[(f32, &str)]) -> TextKeyMap {
    TextKeyMap::new(
        keys.iter()
            .map(|(time, label)| TextKey::new(*time, *label))
            .collect(),
    )
}

pub(crate) fn translation_track(bone: &str, frames: &[(f32, Vec3)]) -> NodeTrack {
    let mut track = NodeTrack::new(bone);
    track.translations = frames
        .iter()
        .map(|(time, value)| Vec3Frame {
            time: *time,
            value: *value,
            curve: Curve::Linear,
        })
        .collect();
    track
}

pub(crate) fn source(keys: &[(f32, &str)], tracks: Vec<NodeTrack>) -> SourceData {
    SourceData {
        text_keys: text_keys(keys),
        tracks,
    }
}

pub(crate) fn animation_with(config: AnimationConfig, sources: Vec<(&str, SourceData)>) -> Animation {
    let mut animation = Animation::new(config);
    animation.set_object_root(biped_data());
    for (path, data) in sources {
        animation.add_source_data(path, data).expect("skeleton set");
    }
    animation
}

#[derive(Clone, Default)]
pub(crate) struct Recording {
    pub markers: Rc<RefCell<Vec<MarkerEvent>>>,
    pub weapons: Rc<RefCell<Vec<bool>>>,
    pub movement_scale: Option<f32>,
}

impl Recording {
    pub(crate) fn labels(&self) -> Vec<String> {
        self.markers
            .borrow()
            .iter()
            .map(|m| m.label.clone())
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.markers.borrow_mut().clear();
        self.weapons.borrow_mut().clear();
    }
}

pub(crate) struct RecordingHooks {
    pub recording: Recording,
}

impl ActorHooks for RecordingHooks {
    fn on_marker(&mut self, event: &MarkerEvent) {
        self.recording.markers.borrow_mut().push(event.clone());
    }

    fn show_weapons(&mut self, show: bool) {
        self.recording.weapons.borrow_mut().push(show);
    }

    fn adjust_movement(&mut self, movement: Vec3) -> Vec3 {
        match self.recording.movement_scale {
            Some(scale) => movement * scale,
            None => movement,
        }
    }
}

pub(crate) fn record(animation: &mut Animation) -> Recording {
    let recording = Recording::default();
    animation.set_hooks(RecordingHooks {
        recording: recording.clone(),
    });
    recording
}
