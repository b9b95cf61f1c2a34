use crate::{Error, NUM_REGIONS, NodeTrack, Skeleton, SourceData, TextKeyMap};
use std::collections::HashMap;

/// A track bound to a bone of the current skeleton root.
#[derive(Clone, Debug)]
pub struct NodeController {
    pub bone: usize,
    pub track: NodeTrack,
}

/// A loaded animation source. Immutable once built and shared by every state playing from it.
#[derive(Debug)]
pub struct AnimSource {
    pub path: String,
    pub text_keys: TextKeyMap,
    controllers: [Vec<NodeController>; NUM_REGIONS],
}

impl AnimSource {
    /// Binds `data` against `skeleton`, filing each track under its bone's region.
    ///
    /// Tracks naming bones the skeleton does not have are dropped.
    pub fn bind(path: impl Into<String>, data: SourceData, skeleton: &Skeleton) -> Self {
        let path = path.into();
        let mut controllers: [Vec<NodeController>; NUM_REGIONS] = Default::default();
        for track in data.tracks {
            let Some(bone) = skeleton.find_bone(&track.bone) else {
                log::warn!(
                    "animation source '{path}' has keyframes for unknown bone '{}'",
                    track.bone
                );
                continue;
            };
            let region = skeleton.detect_region(bone);
            controllers[region.index()].push(NodeController { bone, track });
        }
        Self {
            path,
            text_keys: data.text_keys,
            controllers,
        }
    }

    pub fn controllers(&self, region: crate::Region) -> &[NodeController] {
        &self.controllers[region.index()]
    }

    /// Controller driving `bone`, searched in `region`.
    pub fn controller_for(&self, region: crate::Region, bone: usize) -> Option<&NodeController> {
        self.controllers(region).iter().find(|c| c.bone == bone)
    }
}

/// Supplies keyframe data for a model's keyframe file.
pub trait SourceLoader {
    /// Loads the source at `path`. `Ok(None)` means the model ships no keyframes.
    fn load(&self, path: &str) -> Result<Option<SourceData>, Error>;
}

/// Loader over sources that are already in memory, keyed by keyframe path.
#[derive(Clone, Debug, Default)]
pub struct MemorySourceLoader {
    sources: HashMap<String, SourceData>,
}

impl MemorySourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: SourceData) {
        self.sources.insert(path.into(), data);
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load(&self, path: &str) -> Result<Option<SourceData>, Error> {
        Ok(self.sources.get(path).cloned())
    }
}

/// Keyframe file for a model: the extension becomes `.kf` and the file name gains an `x`
/// prefix (`meshes/base_anim.nif` -> `meshes/xbase_anim.kf`).
pub fn keyframe_path(model: &str) -> String {
    let (dir, file) = match model.rfind(['/', '\\']) {
        Some(sep) => model.split_at(sep + 1),
        None => ("", model),
    };
    let stem = match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    };
    format!("{dir}x{stem}.kf")
}
