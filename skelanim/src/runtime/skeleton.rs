use crate::{Region, SkeletonData};
use glam::{Affine3A, Quat, Vec3};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Bone {
    data_index: usize,
    parent: Option<usize>,
    region: Region,

    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,

    pub world: Affine3A,
}

impl Bone {
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    pub fn region(&self) -> Region {
        self.region
    }

    fn local(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }
}

/// Per-actor skeleton instance: local pose and world transforms over a shared hierarchy.
#[derive(Clone, Debug)]
pub struct Skeleton {
    data: Arc<SkeletonData>,
    pub bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        let mut bones: Vec<Bone> = Vec::with_capacity(data.bones.len());
        for (index, bone) in data.bones.iter().enumerate() {
            let inherited = bone
                .parent
                .map(|parent| bones[parent].region)
                .unwrap_or(Region::LowerBody);
            let region = Region::from_root_bone_name(&bone.name).unwrap_or(inherited);
            bones.push(Bone {
                data_index: index,
                parent: bone.parent,
                region,
                translation: bone.translation,
                rotation: bone.rotation,
                scale: bone.scale,
                world: Affine3A::IDENTITY,
            });
        }
        let mut skeleton = Self { data, bones };
        skeleton.update_world_transform();
        skeleton
    }

    pub fn data(&self) -> &Arc<SkeletonData> {
        &self.data
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.data.find_bone(name)
    }

    pub fn bone_name(&self, index: usize) -> &str {
        &self.data.bones[self.bones[index].data_index].name
    }

    /// Region a bone is animated under.
    pub fn detect_region(&self, index: usize) -> Region {
        self.bones[index].region
    }

    pub fn set_to_setup_pose(&mut self) {
        for index in 0..self.bones.len() {
            self.reset_bone(index);
        }
    }

    /// Returns every bone in `region` to its rest pose.
    pub fn reset_region(&mut self, region: Region) {
        for index in 0..self.bones.len() {
            if self.bones[index].region == region {
                self.reset_bone(index);
            }
        }
    }

    pub(crate) fn reset_bone(&mut self, index: usize) {
        let rest = &self.data.bones[self.bones[index].data_index];
        let bone = &mut self.bones[index];
        bone.translation = rest.translation;
        bone.rotation = rest.rotation;
        bone.scale = rest.scale;
    }

    pub(crate) fn rest_translation(&self, index: usize) -> Vec3 {
        self.data.bones[self.bones[index].data_index].translation
    }

    pub fn update_world_transform(&mut self) {
        for index in 0..self.bones.len() {
            let local = self.bones[index].local();
            self.bones[index].world = match self.bones[index].parent {
                Some(parent) => self.bones[parent].world * local,
                None => local,
            };
        }
    }

    pub fn world_translation(&self, index: usize) -> Vec3 {
        self.bones[index].world.translation.into()
    }
}
