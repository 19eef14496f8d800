use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::animation::tracks::Keyframe;
use crate::errors::{LoadError, Result};

/// Turns a file on disk into an [`ImportedScene`].
pub trait SceneImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene>;
}

/// One node of the imported scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }
}

/// A single bone influence on one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// A bone as listed by a mesh: its name, its offset (inverse bind) matrix and
/// the vertices it influences.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBone {
    pub name: String,
    /// Mesh space to bone-local bind space.
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Triangulated mesh data with per-bone vertex weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// May be shorter than `positions`; missing entries read as zero.
    pub uvs: Vec<Vec2>,
    /// May be shorter than `positions`; missing entries read as zero.
    pub normals: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub bones: Vec<MeshBone>,
}

/// Keyframes of one animated node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChannel {
    pub node_name: String,
    pub position_keys: Vec<Keyframe<Vec3>>,
    pub rotation_keys: Vec<Keyframe<Quat>>,
    pub scale_keys: Vec<Keyframe<Vec3>>,
}

impl NodeChannel {
    #[must_use]
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedAnimation {
    pub name: String,
    /// Length in ticks.
    pub duration: f32,
    /// `0` when the source does not declare a rate.
    pub ticks_per_second: f32,
    pub channels: Vec<NodeChannel>,
}

/// Fully owned result of importing one asset file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedScene {
    /// Where the scene came from, used in error messages.
    pub source: String,
    pub root: SceneNode,
    pub meshes: Vec<ImportedMesh>,
    pub animations: Vec<ImportedAnimation>,
}

impl ImportedScene {
    pub fn first_mesh(&self) -> Result<&ImportedMesh> {
        self.meshes
            .first()
            .ok_or_else(|| LoadError::NoMesh(self.source.clone()))
    }

    pub fn first_animation(&self) -> Result<&ImportedAnimation> {
        self.animations
            .first()
            .ok_or_else(|| LoadError::NoAnimation(self.source.clone()))
    }
}
