//! Error Types
//!
//! This module defines the error types returned while building avatars,
//! models and animation clips from imported assets.
//!
//! # Overview
//!
//! [`LoadError`] covers every construction-time failure:
//! - File I/O errors
//! - glTF parsing and buffer errors
//! - Structurally incomplete scenes (no mesh, no animation, ...)
//!
//! Pose evaluation itself never fails once an [`Avatar`](crate::Avatar) and
//! an [`AnimationClip`](crate::AnimationClip) have been built.
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_avatar::errors::Result;
//! use myth_avatar::Model;
//!
//! fn load() -> Result<Model> {
//!     Model::load("assets/character.gltf")
//! }
//! ```

use thiserror::Error;

/// Failure while importing an asset or building runtime data from it.
///
/// No partially built object is ever handed back alongside this error:
/// callers either get a complete value or a `LoadError`.
#[derive(Error, Debug)]
pub enum LoadError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// glTF parsing or validation error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// A buffer referenced by the document could not be resolved.
    #[error("Missing buffer data (buffer index: {index})")]
    MissingBuffer {
        /// The glTF buffer index
        index: usize,
    },

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A vertex attribute the importer requires is absent.
    #[error("Missing vertex attribute: {attribute}")]
    MissingAttribute {
        /// Attribute name, e.g. `POSITION`
        attribute: &'static str,
    },

    /// An index stored in the asset points outside the data it refers to.
    #[error("Index out of bounds: {context} (index: {index})")]
    IndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // Scene Content Errors
    // ========================================================================
    /// The file contains no scene graph to build a bone hierarchy from.
    #[error("Asset has no scene: {0}")]
    NoScene(String),

    /// The file contains no mesh.
    #[error("Asset has no mesh: {0}")]
    NoMesh(String),

    /// The file contains no animation clip.
    #[error("Asset has no animation: {0}")]
    NoAnimation(String),
}

impl From<gltf::Error> for LoadError {
    fn from(err: gltf::Error) -> Self {
        LoadError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, LoadError>`.
pub type Result<T> = std::result::Result<T, LoadError>;
