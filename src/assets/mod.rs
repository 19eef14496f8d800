//! Asset import boundary.
//!
//! Everything the evaluator needs from a 3D file is described by the plain
//! data types in [`scene`]. Importers produce an [`ImportedScene`] that owns
//! all of its data, so nothing borrowed from the underlying file format
//! outlives the import call.

pub mod scene;
pub mod loaders;

pub use scene::{
    ImportedAnimation, ImportedMesh, ImportedScene, MeshBone, NodeChannel, SceneImporter,
    SceneNode, VertexWeight,
};
pub use loaders::GltfImporter;
