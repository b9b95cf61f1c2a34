use crate::Error;
use glam::{Quat, Vec3};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct BoneData {
    pub name: String,
    pub parent: Option<usize>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl BoneData {
    /// A bone at rest with the identity transform.
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }
}

/// Immutable bone hierarchy shared by every skeleton instance built from it.
#[derive(Clone, Debug)]
pub struct SkeletonData {
    pub bones: Vec<BoneData>,
    bone_index: HashMap<String, usize>,
}

impl SkeletonData {
    /// Builds the hierarchy. Parents must precede their children.
    pub fn new(bones: Vec<BoneData>) -> Result<Arc<Self>, Error> {
        let mut bone_index = HashMap::with_capacity(bones.len());
        for (index, bone) in bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= index {
                    return Err(Error::InvalidValue {
                        message: format!(
                            "bone '{}' must come after its parent (index {parent})",
                            bone.name
                        ),
                    });
                }
            }
            if bone_index.insert(bone.name.clone(), index).is_some() {
                return Err(Error::InvalidValue {
                    message: format!("duplicate bone name '{}'", bone.name),
                });
            }
        }
        Ok(Arc::new(Self { bones, bone_index }))
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bone_index.get(name).copied()
    }
}

/// A named timestamp in a source.
#[derive(Clone, Debug, PartialEq)]
pub struct TextKey {
    pub time: f32,
    pub label: String,
}

impl TextKey {
    pub fn new(time: f32, label: impl Into<String>) -> Self {
        Self {
            time,
            label: label.into(),
        }
    }
}

/// Markers ordered by time. Labels may repeat; keys sharing a time keep their input order.
#[derive(Clone, Debug, Default)]
pub struct TextKeyMap {
    keys: Vec<TextKey>,
}

impl TextKeyMap {
    pub fn new(mut keys: Vec<TextKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn keys(&self) -> &[TextKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TextKey> {
        self.keys.get(index)
    }

    /// Index of the first key strictly after `time`.
    pub fn upper_bound(&self, time: f32) -> usize {
        self.keys.partition_point(|k| k.time <= time)
    }

    /// Index of the first key at or after `time`.
    pub fn lower_bound(&self, time: f32) -> usize {
        self.keys.partition_point(|k| k.time < time)
    }

    /// Index of the first key belonging to `group` (labelled `"<group>: ..."`).
    pub fn find_group_start(&self, group: &str) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| group_suffix(&k.label, group).is_some())
    }

    /// Index of the first key at or after `from` whose label is exactly `label`.
    pub fn find_label_from(&self, from: usize, label: &str) -> Option<usize> {
        self.keys
            .iter()
            .skip(from)
            .position(|k| k.label == label)
            .map(|offset| from + offset)
    }
}

/// Returns the part of `label` after `"<group>: "`, if the label belongs to `group`.
pub(crate) fn group_suffix<'a>(label: &'a str, group: &str) -> Option<&'a str> {
    label.strip_prefix(group)?.strip_prefix(": ")
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Curve {
    #[default]
    Linear,
    Stepped,
}

#[derive(Clone, Debug)]
pub struct Vec3Frame {
    pub time: f32,
    pub value: Vec3,
    pub curve: Curve,
}

#[derive(Clone, Debug)]
pub struct QuatFrame {
    pub time: f32,
    pub value: Quat,
    pub curve: Curve,
}

#[derive(Clone, Debug)]
pub struct FloatFrame {
    pub time: f32,
    pub value: f32,
    pub curve: Curve,
}

/// Keyframes driving one bone. Empty channels leave that part of the bone at rest.
#[derive(Clone, Debug, Default)]
pub struct NodeTrack {
    pub bone: String,
    pub translations: Vec<Vec3Frame>,
    pub rotations: Vec<QuatFrame>,
    pub scales: Vec<FloatFrame>,
}

impl NodeTrack {
    pub fn new(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            ..Self::default()
        }
    }

    pub fn translation_at(&self, time: f32) -> Option<Vec3> {
        sample(&self.translations, time, |f| f.time, |f| f.curve, |f| f.value, Vec3::lerp)
    }

    pub fn rotation_at(&self, time: f32) -> Option<Quat> {
        sample(&self.rotations, time, |f| f.time, |f| f.curve, |f| f.value, Quat::slerp)
    }

    pub fn scale_at(&self, time: f32) -> Option<f32> {
        sample(
            &self.scales,
            time,
            |f| f.time,
            |f| f.curve,
            |f| f.value,
            |a, b, t| a + (b - a) * t,
        )
    }
}

fn sample<F, T: Copy>(
    frames: &[F],
    time: f32,
    frame_time: impl Fn(&F) -> f32,
    frame_curve: impl Fn(&F) -> Curve,
    frame_value: impl Fn(&F) -> T,
    lerp: impl Fn(T, T, f32) -> T,
) -> Option<T> {
    let first = frames.first()?;
    let index = frames.partition_point(|f| frame_time(f) <= time);
    if index == 0 {
        return Some(frame_value(first));
    }
    let prev = &frames[index - 1];
    let Some(next) = frames.get(index) else {
        return Some(frame_value(prev));
    };
    let denom = frame_time(next) - frame_time(prev);
    if denom.abs() <= 1.0e-12 {
        return Some(frame_value(next));
    }
    match frame_curve(prev) {
        Curve::Stepped => Some(frame_value(prev)),
        Curve::Linear => {
            let t = (time - frame_time(prev)) / denom;
            Some(lerp(frame_value(prev), frame_value(next), t))
        }
    }
}

/// Keyframes and markers for one animation source, as supplied by a loader.
#[derive(Clone, Debug, Default)]
pub struct SourceData {
    pub text_keys: TextKeyMap,
    pub tracks: Vec<NodeTrack>,
}
