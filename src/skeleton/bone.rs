use glam::Mat4;

use crate::assets::SceneNode;

/// One node of the bone hierarchy.
///
/// The tree mirrors the imported scene graph one to one, including nodes
/// that never influence a vertex (pivots, the scene root, mesh holders).
/// Children are owned; there is no stored parent link, use
/// [`BoneNode::parent_of`] to look one up.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneNode {
    pub name: String,
    /// Bind-pose transform relative to the parent bone.
    pub local_transform: Mat4,
    pub children: Vec<BoneNode>,
}

impl BoneNode {
    #[must_use]
    pub fn new(name: impl Into<String>, local_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            local_transform,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<BoneNode>) -> Self {
        self.children = children;
        self
    }

    /// Builds a tree with the same shape, order and transforms as `node`.
    #[must_use]
    pub fn from_scene(node: &SceneNode) -> Self {
        Self {
            name: node.name.clone(),
            local_transform: node.transform,
            children: node.children.iter().map(Self::from_scene).collect(),
        }
    }

    /// Depth-first, pre-order traversal starting at `self`.
    #[must_use]
    pub fn iter(&self) -> BoneIter<'_> {
        BoneIter { stack: vec![self] }
    }

    /// Number of nodes in this subtree, `self` included.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BoneNode> {
        self.iter().find(|bone| bone.name == name)
    }

    #[must_use]
    pub fn parent_of(&self, name: &str) -> Option<&BoneNode> {
        self.iter()
            .find(|bone| bone.children.iter().any(|child| child.name == name))
    }

    /// Bind-pose world transform of the first node called `name`, composing
    /// local transforms from `self` downward.
    #[must_use]
    pub fn bind_world_transform(&self, name: &str) -> Option<Mat4> {
        self.bind_world_transform_from(name, Mat4::IDENTITY)
    }

    fn bind_world_transform_from(&self, name: &str, parent: Mat4) -> Option<Mat4> {
        let world = parent * self.local_transform;
        if self.name == name {
            return Some(world);
        }
        self.children
            .iter()
            .find_map(|child| child.bind_world_transform_from(name, world))
    }
}

impl<'a> IntoIterator for &'a BoneNode {
    type Item = &'a BoneNode;
    type IntoIter = BoneIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over a [`BoneNode`] subtree.
pub struct BoneIter<'a> {
    stack: Vec<&'a BoneNode>,
}

impl<'a> Iterator for BoneIter<'a> {
    type Item = &'a BoneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let bone = self.stack.pop()?;
        self.stack.extend(bone.children.iter().rev());
        Some(bone)
    }
}
