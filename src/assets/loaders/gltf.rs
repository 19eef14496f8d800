//! glTF 2.0 importer.
//!
//! Converts a `.gltf` (external or embedded buffers) or `.glb` file into an
//! [`ImportedScene`]:
//!
//! - The default scene becomes the node tree. Several scene roots are
//!   gathered under a synthetic identity node named `gltf_root`.
//! - The first mesh attached to a node (preferring skinned nodes) becomes
//!   the mesh list, one [`ImportedMesh`] per triangle primitive.
//! - Skin joints that influence at least one vertex become [`MeshBone`]s,
//!   in joint order, with their inverse bind matrix as offset.
//! - Every animation becomes an [`ImportedAnimation`] with one channel per
//!   target node. Time is stored in seconds (`ticks_per_second = 1`).

use std::fs;
use std::io::BufReader;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use glam::{Mat4, Quat, Vec2, Vec3};
use gltf::animation::Interpolation;
use gltf::animation::util::ReadOutputs;
use rustc_hash::FxHashMap;

use crate::animation::tracks::Keyframe;
use crate::assets::scene::{
    ImportedAnimation, ImportedMesh, ImportedScene, MeshBone, NodeChannel, SceneImporter,
    SceneNode, VertexWeight,
};
use crate::errors::{LoadError, Result};

/// Name given to the synthetic node that parents several scene roots.
pub const SYNTHETIC_ROOT_NAME: &str = "gltf_root";

/// Stateless glTF importer. All intermediate data is dropped when
/// [`SceneImporter::import`] returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let gltf = gltf::Gltf::from_reader(reader)?;

        let base_path = path.parent().unwrap_or(Path::new("./"));
        let buffers = load_buffers(&gltf, base_path)?;

        let source = path.display().to_string();
        let loader = GltfSceneLoader {
            document: &gltf.document,
            buffers: &buffers,
        };

        let scene = ImportedScene {
            root: loader.load_hierarchy(&source)?,
            meshes: loader.load_meshes()?,
            animations: loader.load_animations(),
            source,
        };

        log::debug!(
            "Imported {}: {} meshes, {} bones, {} animations",
            scene.source,
            scene.meshes.len(),
            scene.meshes.first().map_or(0, |m| m.bones.len()),
            scene.animations.len()
        );

        Ok(scene)
    }
}

fn load_buffers(gltf: &gltf::Gltf, base_path: &Path) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or(LoadError::MissingBuffer { index: buffer.index() })?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
            gltf::buffer::Source::Uri(uri) => fs::read(base_path.join(uri))?,
        };

        if data.len() < buffer.length() {
            return Err(LoadError::MissingBuffer { index: buffer.index() });
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| LoadError::DataUri("only base64 data URIs are supported".to_string()))?;
    Ok(BASE64.decode(payload)?)
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), ToString::to_string)
}

/// Borrowed view over a parsed document and its resolved buffers.
struct GltfSceneLoader<'a> {
    document: &'a gltf::Document,
    buffers: &'a [Vec<u8>],
}

impl GltfSceneLoader<'_> {
    fn buffer_data(&self, buffer: gltf::Buffer) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(Vec::as_slice)
    }

    // --- Hierarchy ---

    fn load_hierarchy(&self, source: &str) -> Result<SceneNode> {
        let scene = self
            .document
            .default_scene()
            .or_else(|| self.document.scenes().next())
            .ok_or_else(|| LoadError::NoScene(source.to_string()))?;

        let mut roots: Vec<SceneNode> = scene.nodes().map(|node| build_node(&node)).collect();

        let root = if roots.len() == 1 {
            roots.remove(0)
        } else {
            SceneNode::new(SYNTHETIC_ROOT_NAME, Mat4::IDENTITY).with_children(roots)
        };
        Ok(root)
    }

    // --- Mesh & Skin ---

    fn load_meshes(&self) -> Result<Vec<ImportedMesh>> {
        let mesh_node = self
            .document
            .nodes()
            .find(|n| n.mesh().is_some() && n.skin().is_some())
            .or_else(|| self.document.nodes().find(|n| n.mesh().is_some()));

        let Some(node) = mesh_node else {
            return Ok(Vec::new());
        };
        let Some(mesh) = node.mesh() else {
            return Ok(Vec::new());
        };

        let mesh_count = self.document.meshes().count();
        if mesh_count > 1 {
            log::warn!(
                "glTF contains {mesh_count} meshes, only '{}' is imported",
                mesh.name().unwrap_or("unnamed")
            );
        }

        let mut meshes = Vec::new();
        for (primitive_index, primitive) in mesh.primitives().enumerate() {
            if !matches!(primitive.mode(), gltf::mesh::Mode::Triangles) {
                log::warn!(
                    "Skipping primitive {primitive_index} of mesh {}: mode {:?} is not triangles",
                    mesh.index(),
                    primitive.mode()
                );
                continue;
            }

            let name = match mesh.name() {
                Some(name) => format!("{name}_{primitive_index}"),
                None => format!("Mesh_{}_{primitive_index}", mesh.index()),
            };
            meshes.push(self.load_primitive(name, &primitive, node.skin().as_ref())?);
        }

        Ok(meshes)
    }

    fn load_primitive(
        &self,
        name: String,
        primitive: &gltf::Primitive,
        skin: Option<&gltf::Skin>,
    ) -> Result<ImportedMesh> {
        let reader = primitive.reader(|buffer| self.buffer_data(buffer));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or(LoadError::MissingAttribute { attribute: "POSITION" })?
            .map(Vec3::from_array)
            .collect();
        let vertex_count = positions.len();

        let normals = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let uvs = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().map(Vec2::from_array).collect())
            .unwrap_or_default();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..vertex_count as u32).collect(),
        };
        let faces = indices
            .chunks_exact(3)
            .map(|face| [face[0], face[1], face[2]])
            .collect();

        // Per-joint influence lists, in joint order
        let mut bones = Vec::new();
        if let Some(skin) = skin {
            let joints: Vec<gltf::Node> = skin.joints().collect();
            let skin_reader = skin.reader(|buffer| self.buffer_data(buffer));
            let inverse_bind_matrices: Vec<Mat4> = skin_reader
                .read_inverse_bind_matrices()
                .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
                .unwrap_or_default();

            let mut joint_weights: Vec<Vec<VertexWeight>> = vec![Vec::new(); joints.len()];
            if let (Some(joint_ids), Some(weights)) =
                (reader.read_joints(0), reader.read_weights(0))
            {
                let influences = joint_ids.into_u16().zip(weights.into_f32());
                for (vertex_id, (ids, ws)) in influences.enumerate() {
                    for (&joint, &weight) in ids.iter().zip(ws.iter()) {
                        if weight == 0.0 {
                            continue;
                        }
                        let slot = joint_weights.get_mut(usize::from(joint)).ok_or_else(|| {
                            LoadError::IndexOutOfBounds {
                                context: format!(
                                    "joint of vertex {vertex_id} in skin {}",
                                    skin.index()
                                ),
                                index: usize::from(joint),
                            }
                        })?;
                        slot.push(VertexWeight {
                            vertex_id: vertex_id as u32,
                            weight,
                        });
                    }
                }
            }

            bones = joints
                .iter()
                .zip(joint_weights)
                .enumerate()
                .filter(|(_, (_, weights))| !weights.is_empty())
                .map(|(i, (joint, weights))| MeshBone {
                    name: node_name(joint),
                    offset_matrix: inverse_bind_matrices.get(i).copied().unwrap_or(Mat4::IDENTITY),
                    weights,
                })
                .collect();
        }

        Ok(ImportedMesh {
            name,
            positions,
            uvs,
            normals,
            faces,
            bones,
        })
    }

    // --- Animation ---

    fn load_animations(&self) -> Vec<ImportedAnimation> {
        // Rest pose per node, used for properties a clip leaves untouched
        let rest_pose: Vec<_> = self
            .document
            .nodes()
            .map(|node| node.transform().decomposed())
            .collect();

        let mut animations = Vec::new();

        for anim in self.document.animations() {
            let mut channels: Vec<NodeChannel> = Vec::new();
            let mut channel_nodes: Vec<usize> = Vec::new();
            let mut node_to_channel: FxHashMap<usize, usize> = FxHashMap::default();
            let mut duration = 0.0_f32;

            for (channel_index, channel) in anim.channels().enumerate() {
                let reader = channel.reader(|buffer| self.buffer_data(buffer));
                let node = channel.target().node();

                let Some(inputs) = reader.read_inputs() else {
                    log::warn!(
                        "Animation {} channel {channel_index} has no input times",
                        anim.index()
                    );
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                duration = times.iter().copied().fold(duration, f32::max);

                let cubic = matches!(channel.sampler().interpolation(), Interpolation::CubicSpline);
                if cubic {
                    log::warn!(
                        "Animation {} channel {channel_index}: cubic spline keys blended linearly",
                        anim.index()
                    );
                }

                let slot = *node_to_channel.entry(node.index()).or_insert_with(|| {
                    channels.push(NodeChannel::new(node_name(&node)));
                    channel_nodes.push(node.index());
                    channels.len() - 1
                });
                let target = &mut channels[slot];

                match reader.read_outputs() {
                    Some(ReadOutputs::Translations(iter)) => {
                        target.position_keys = keyframes(&times, iter.map(Vec3::from_array), cubic);
                    }
                    Some(ReadOutputs::Rotations(iter)) => {
                        target.rotation_keys =
                            keyframes(&times, iter.into_f32().map(Quat::from_array), cubic);
                    }
                    Some(ReadOutputs::Scales(iter)) => {
                        target.scale_keys = keyframes(&times, iter.map(Vec3::from_array), cubic);
                    }
                    Some(ReadOutputs::MorphTargetWeights(_)) => {
                        log::warn!(
                            "Animation {} channel {channel_index}: morph weights unsupported",
                            anim.index()
                        );
                    }
                    None => {
                        log::warn!(
                            "Animation {} channel {channel_index} has no output values",
                            anim.index()
                        );
                    }
                }
            }

            for (channel, &node_index) in channels.iter_mut().zip(&channel_nodes) {
                let (t, r, s) = rest_pose[node_index];
                if channel.position_keys.is_empty() {
                    channel.position_keys.push(Keyframe::new(0.0, Vec3::from_array(t)));
                }
                if channel.rotation_keys.is_empty() {
                    channel.rotation_keys.push(Keyframe::new(0.0, Quat::from_array(r)));
                }
                if channel.scale_keys.is_empty() {
                    channel.scale_keys.push(Keyframe::new(0.0, Vec3::from_array(s)));
                }
            }

            animations.push(ImportedAnimation {
                name: anim
                    .name()
                    .map_or_else(|| format!("Animation_{}", anim.index()), ToString::to_string),
                duration,
                ticks_per_second: 1.0,
                channels,
            });
        }

        animations
    }
}

fn build_node(node: &gltf::Node) -> SceneNode {
    SceneNode {
        name: node_name(node),
        transform: Mat4::from_cols_array_2d(&node.transform().matrix()),
        children: node.children().map(|child| build_node(&child)).collect(),
    }
}

/// Pairs times with output values. Cubic-spline outputs are stored as
/// `(in_tangent, value, out_tangent)` triples; only the value is kept.
fn keyframes<T: Copy>(
    times: &[f32],
    values: impl Iterator<Item = T>,
    cubic: bool,
) -> Vec<Keyframe<T>> {
    let (stride, offset) = if cubic { (3, 1) } else { (1, 0) };
    let values: Vec<T> = values.collect();

    times
        .iter()
        .enumerate()
        .filter_map(|(i, &time)| {
            values
                .get(i * stride + offset)
                .map(|&value| Keyframe::new(time, value))
        })
        .collect()
}
