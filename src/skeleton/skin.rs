use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::assets::MeshBone;

/// A bone that deforms mesh vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinJoint {
    pub name: String,
    /// Mesh space to bone-local bind space.
    pub offset_matrix: Mat4,
}

/// Maps bone names to skin indices (the joint ids stored in vertices).
///
/// Indices are handed out in first-seen order starting at `0`. A name seen
/// again keeps its index and its first offset matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinBinding {
    joints: Vec<SkinJoint>,
    lookup: FxHashMap<String, usize>,
}

impl SkinBinding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the distinct bones of a mesh in the order the mesh lists them.
    #[must_use]
    pub fn from_bones(bones: &[MeshBone]) -> Self {
        let mut binding = Self::new();
        for bone in bones {
            binding.register(&bone.name, bone.offset_matrix);
        }
        binding
    }

    /// Returns the skin index of `name`, assigning the next free one if the
    /// name is new. An existing entry is never overwritten.
    pub fn register(&mut self, name: &str, offset_matrix: Mat4) -> usize {
        if let Some(&index) = self.lookup.get(name) {
            return index;
        }

        let index = self.joints.len();
        self.joints.push(SkinJoint {
            name: name.to_string(),
            offset_matrix,
        });
        self.lookup.insert(name.to_string(), index);
        index
    }

    #[inline]
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Skin index and offset matrix of `name`.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<(usize, &Mat4)> {
        let index = self.index_of(name)?;
        Some((index, &self.joints[index].offset_matrix))
    }

    /// Joints in skin-index order.
    #[must_use]
    pub fn joints(&self) -> &[SkinJoint] {
        &self.joints
    }

    /// Bone names in skin-index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|joint| joint.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}
