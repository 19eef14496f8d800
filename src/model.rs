//! Skinned mesh data ready for GPU upload.

use std::mem::{offset_of, size_of};
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{IVec4, Vec2, Vec3, Vec4};

use crate::assets::{GltfImporter, ImportedMesh, ImportedScene, SceneImporter};
use crate::avatar::Avatar;
use crate::errors::{LoadError, Result};
use crate::settings::PoseSettings;
use crate::skeleton::SkinBinding;

/// Bone influences kept per vertex.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// Interleaved vertex layout consumed by the skinning shader.
///
/// Field order and byte offsets are part of the contract; see
/// [`Vertex::layout`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
    /// Skin indices; unused slots are `0` with weight `0`.
    pub joint_ids: IVec4,
    /// Copied as imported, not renormalized.
    pub weights: Vec4,
}

/// One vertex attribute: float/int component count, stride and byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub components: u32,
    pub stride: usize,
    pub offset: usize,
}

impl Vertex {
    /// Attribute descriptions in shader location order.
    #[must_use]
    pub const fn layout() -> [VertexAttribute; 5] {
        const STRIDE: usize = size_of::<Vertex>();
        [
            VertexAttribute {
                components: 3,
                stride: STRIDE,
                offset: offset_of!(Vertex, position),
            },
            VertexAttribute {
                components: 2,
                stride: STRIDE,
                offset: offset_of!(Vertex, uv),
            },
            VertexAttribute {
                components: 3,
                stride: STRIDE,
                offset: offset_of!(Vertex, normal),
            },
            VertexAttribute {
                components: 4,
                stride: STRIDE,
                offset: offset_of!(Vertex, joint_ids),
            },
            VertexAttribute {
                components: 4,
                stride: STRIDE,
                offset: offset_of!(Vertex, weights),
            },
        ]
    }
}

/// A loaded asset: flat vertex/index arrays for rendering plus the imported
/// scene they came from.
///
/// The model owns everything the importer produced; dropping it releases all
/// of it.
#[derive(Debug, Clone)]
pub struct Model {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    skin: SkinBinding,
    scene: ImportedScene,
}

impl Model {
    /// Loads the first mesh of a glTF file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(&GltfImporter, path)
    }

    pub fn load_with(importer: &impl SceneImporter, path: impl AsRef<Path>) -> Result<Self> {
        let scene = importer.import(path.as_ref())?;
        Self::from_scene(scene)
    }

    /// Builds GPU arrays from the scene's first mesh.
    pub fn from_scene(scene: ImportedScene) -> Result<Self> {
        let mesh = scene.first_mesh()?;
        let skin = SkinBinding::from_bones(&mesh.bones);
        let vertices = build_vertices(mesh, &skin)?;
        let indices: Vec<u32> = mesh.faces.iter().flatten().copied().collect();

        log::debug!(
            "Model {}: {} vertices, {} triangles, {} bones",
            scene.source,
            vertices.len(),
            mesh.faces.len(),
            skin.len()
        );

        Ok(Self {
            vertices,
            indices,
            skin,
            scene,
        })
    }

    #[must_use]
    pub fn scene(&self) -> &ImportedScene {
        &self.scene
    }

    /// The mesh the vertex arrays were built from.
    #[must_use]
    pub fn mesh(&self) -> &ImportedMesh {
        // `from_scene` only succeeds with at least one mesh
        &self.scene.meshes[0]
    }

    /// Name to skin index mapping used for `Vertex::joint_ids`.
    #[must_use]
    pub fn skin(&self) -> &SkinBinding {
        &self.skin
    }

    #[must_use]
    pub fn avatar(&self) -> Avatar {
        self.avatar_with_settings(PoseSettings::default())
    }

    #[must_use]
    pub fn avatar_with_settings(&self, settings: PoseSettings) -> Avatar {
        Avatar::with_settings(&self.scene, self.mesh(), settings)
    }

    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Interleaves mesh attributes and packs up to [`MAX_BONE_INFLUENCES`] bone
/// influences per vertex, in the order the mesh lists its bones.
///
/// A slot counts as free while its weight is `0.0`; influences that find no
/// free slot are dropped.
pub fn build_vertices(mesh: &ImportedMesh, skin: &SkinBinding) -> Result<Vec<Vertex>> {
    let mut vertices: Vec<Vertex> = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            uv: mesh.uvs.get(i).copied().unwrap_or_default(),
            normal: mesh.normals.get(i).copied().unwrap_or_default(),
            ..Default::default()
        })
        .collect();

    let mut dropped = 0_usize;

    for bone in &mesh.bones {
        let Some(bone_index) = skin.index_of(&bone.name) else {
            continue;
        };

        for influence in &bone.weights {
            let vertex_id = influence.vertex_id as usize;
            let Some(vertex) = vertices.get_mut(vertex_id) else {
                return Err(LoadError::IndexOutOfBounds {
                    context: format!(
                        "vertex weight of bone '{}' in mesh '{}'",
                        bone.name, mesh.name
                    ),
                    index: vertex_id,
                });
            };

            match (0..MAX_BONE_INFLUENCES).find(|&k| vertex.weights[k] == 0.0) {
                Some(k) => {
                    vertex.joint_ids[k] = bone_index as i32;
                    vertex.weights[k] = influence.weight;
                }
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        log::warn!(
            "Mesh '{}': dropped {dropped} bone influences beyond {MAX_BONE_INFLUENCES} per vertex",
            mesh.name
        );
    }

    Ok(vertices)
}
