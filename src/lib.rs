//! Skeletal animation evaluator for skinned meshes.
//!
//! Given a bone hierarchy and a keyframed [`AnimationClip`], an [`Avatar`]
//! computes one skinning matrix per bone that influences the mesh, ready to
//! be uploaded next to the [`Model`] vertex buffer.
//!
//! ```rust,ignore
//! use myth_avatar::{AnimationClip, Model};
//!
//! let model = Model::load("assets/character.gltf")?;
//! let walk = AnimationClip::load("assets/walk.gltf")?;
//! let mut avatar = model.avatar();
//!
//! avatar.calculate_pose(elapsed_seconds, &walk);
//! queue.write_buffer(&joint_buffer, 0, avatar.matrix_bytes());
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod settings;
pub mod assets;
pub mod animation;
pub mod skeleton;
pub mod avatar;
pub mod model;

pub use errors::{LoadError, Result};
pub use settings::{PoseSettings, RotationBlend, DEFAULT_TICKS_PER_SECOND};
pub use assets::{GltfImporter, ImportedScene, SceneImporter};
pub use animation::{AnimationClip, BoneChannel, Keyframe, KeyframeTrack};
pub use skeleton::{BoneNode, SkinBinding};
pub use avatar::{Avatar, PoseState};
pub use model::{Model, Vertex, VertexAttribute, MAX_BONE_INFLUENCES};
