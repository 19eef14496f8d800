//! Pose evaluation.
//!
//! An [`Avatar`] owns a bone hierarchy, the skin binding of one mesh and
//! the matrices produced by the last evaluation. Each call to
//! [`Avatar::calculate_pose`] walks the hierarchy depth-first from the root:
//!
//! 1. Animated bones sample their channel (`T * R * S`); static bones keep
//!    their bind transform.
//! 2. `world = parent_world * local`.
//! 3. Skinning bones write `global_inverse * world * offset` to their slot.
//!
//! Blended rotations are rigid only with
//! [`RotationBlend::Nlerp`](crate::RotationBlend::Nlerp); the default
//! `Lerp` reproduces keys exactly but distorts poses between them.
//!
//! Clips are only read, so one [`AnimationClip`] can drive any number of
//! avatars.

use glam::Mat4;

use crate::animation::AnimationClip;
use crate::assets::{ImportedMesh, ImportedScene};
use crate::settings::{PoseSettings, RotationBlend};
use crate::skeleton::{BoneNode, SkinBinding};

/// Output of the last pose evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseState {
    /// Skinning matrices, indexed by skin index.
    pub final_matrices: Vec<Mat4>,
    /// Inverse of the scene root's world transform.
    pub global_inverse_transform: Mat4,
}

/// A skinned character ready to be posed.
#[derive(Debug, Clone)]
pub struct Avatar {
    root: BoneNode,
    skin: SkinBinding,
    pose: PoseState,
    settings: PoseSettings,
}

impl Avatar {
    #[must_use]
    pub fn new(scene: &ImportedScene, mesh: &ImportedMesh) -> Self {
        Self::with_settings(scene, mesh, PoseSettings::default())
    }

    #[must_use]
    pub fn with_settings(
        scene: &ImportedScene,
        mesh: &ImportedMesh,
        settings: PoseSettings,
    ) -> Self {
        Self::from_parts(
            BoneNode::from_scene(&scene.root),
            SkinBinding::from_bones(&mesh.bones),
            settings,
        )
    }

    /// Builds an avatar from an already constructed hierarchy and binding.
    ///
    /// `root.local_transform` is the scene root's world transform.
    #[must_use]
    pub fn from_parts(root: BoneNode, skin: SkinBinding, settings: PoseSettings) -> Self {
        let pose = PoseState {
            final_matrices: vec![Mat4::IDENTITY; skin.len()],
            global_inverse_transform: root.local_transform.inverse(),
        };

        log::debug!(
            "Avatar '{}': {} nodes, {} skinning bones",
            root.name,
            root.bone_count(),
            skin.len()
        );

        Self {
            root,
            skin,
            pose,
            settings,
        }
    }

    /// Poses the avatar at `time` seconds of `clip` (looping).
    pub fn calculate_pose(&mut self, time: f32, clip: &AnimationClip) {
        let ticks = clip.local_time(time);

        self.pose.final_matrices.fill(Mat4::IDENTITY);

        let ctx = PoseContext {
            clip,
            skin: &self.skin,
            time: ticks,
            rotation_blend: self.settings.rotation_blend,
            global_inverse: self.pose.global_inverse_transform,
        };
        process_node_hierarchy(&ctx, &self.root, &Mat4::IDENTITY, &mut self.pose.final_matrices);
    }

    /// Skinning matrices from the last [`calculate_pose`](Self::calculate_pose),
    /// indexed by skin index. Identity before the first evaluation.
    #[must_use]
    pub fn final_matrices(&self) -> &[Mat4] {
        &self.pose.final_matrices
    }

    /// [`final_matrices`](Self::final_matrices) as raw bytes for a uniform or
    /// storage buffer upload.
    #[must_use]
    pub fn matrix_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pose.final_matrices)
    }

    #[must_use]
    pub fn pose(&self) -> &PoseState {
        &self.pose
    }

    #[must_use]
    pub fn global_inverse_transform(&self) -> Mat4 {
        self.pose.global_inverse_transform
    }

    #[must_use]
    pub fn root(&self) -> &BoneNode {
        &self.root
    }

    #[must_use]
    pub fn skin(&self) -> &SkinBinding {
        &self.skin
    }

    #[must_use]
    pub fn settings(&self) -> &PoseSettings {
        &self.settings
    }

    pub fn set_rotation_blend(&mut self, blend: RotationBlend) {
        self.settings.rotation_blend = blend;
    }
}

/// Read-only inputs shared by every step of one traversal.
struct PoseContext<'a> {
    clip: &'a AnimationClip,
    skin: &'a SkinBinding,
    time: f32,
    rotation_blend: RotationBlend,
    global_inverse: Mat4,
}

fn process_node_hierarchy(
    ctx: &PoseContext,
    node: &BoneNode,
    parent_transform: &Mat4,
    out: &mut [Mat4],
) {
    let local = match ctx.clip.channel(&node.name) {
        Some(channel) => {
            channel.local_transform(ctx.time, ctx.rotation_blend, &node.local_transform)
        }
        None => node.local_transform,
    };

    let world = *parent_transform * local;

    if let Some((index, offset)) = ctx.skin.get(&node.name) {
        out[index] = ctx.global_inverse * world * *offset;
    }

    for child in &node.children {
        process_node_hierarchy(ctx, child, &world, out);
    }
}
