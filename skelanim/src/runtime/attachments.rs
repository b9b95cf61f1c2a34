use std::collections::HashMap;

/// Identity of an externally owned movable object. The engine never owns the object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectId(pub u64);

/// A bone of one particular skeleton root.
///
/// Valid until the next skeleton-root replacement; resolving it afterwards is a bug in the
/// caller and panics.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeHandle {
    pub(crate) bone: usize,
    pub(crate) generation: u32,
}

impl NodeHandle {
    pub fn bone_index(&self) -> usize {
        self.bone
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Where an object hangs off the skeleton. Same validity rules as [`NodeHandle`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TagPoint {
    pub node: NodeHandle,
}

#[derive(Clone, Debug)]
struct AttachmentEntry {
    bone_name: String,
    tag: TagPoint,
}

/// Object to bone back-references. Cleared as a whole when the skeleton root is replaced.
#[derive(Clone, Debug, Default)]
pub struct AttachmentTable {
    entries: HashMap<ObjectId, AttachmentEntry>,
}

impl AttachmentTable {
    pub fn attach(&mut self, object: ObjectId, bone_name: &str, tag: TagPoint) {
        self.entries.insert(
            object,
            AttachmentEntry {
                bone_name: bone_name.to_string(),
                tag,
            },
        );
    }

    /// Removes `object`; does nothing if it is not attached.
    pub fn detach(&mut self, object: ObjectId) -> Option<TagPoint> {
        self.entries.remove(&object).map(|entry| entry.tag)
    }

    pub fn bone_name(&self, object: ObjectId) -> Option<&str> {
        self.entries
            .get(&object)
            .map(|entry| entry.bone_name.as_str())
    }

    pub fn tag_point(&self, object: ObjectId) -> Option<TagPoint> {
        self.entries.get(&object).map(|entry| entry.tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn invalidate_all(&mut self) {
        self.entries.clear();
    }
}
