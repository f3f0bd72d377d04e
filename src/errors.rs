//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ForgeError`] covers all failure modes including:
//! - Asset parsing failures (surfaced verbatim to the user)
//! - Precondition failures (no active model, stale node handles, unsupported geometry)
//! - Export and serialization errors
//!
//! Every edit operation validates its inputs before touching the registry, so an
//! `Err` always means "nothing changed".
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, ForgeError>`.
//!
//! ```rust,ignore
//! use forge::errors::{ForgeError, Result};
//!
//! fn bake(registry: &mut Registry) -> Result<()> {
//!     registry.bake_origin(OriginMode::Center)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the forge core.
#[derive(Error, Debug)]
pub enum ForgeError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// Malformed or unsupported asset bytes.
    #[error("Failed to load '{name}': {reason}")]
    Load {
        /// File name as supplied by the caller
        name: String,
        /// Human readable reason, shown verbatim
        reason: String,
    },

    /// glTF parsing error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(#[from] gltf::Error),

    /// Base64 decoding error (embedded data URIs).
    #[cfg(feature = "gltf")]
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    // ========================================================================
    // Precondition Errors
    // ========================================================================
    /// An operation needs an active model but none is selected.
    #[error("No active model")]
    NoActiveModel,

    /// The referenced model id is not registered.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A node handle does not resolve inside the model.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The referenced node is not a mesh.
    #[error("Target is not a mesh: {0}")]
    NotAMesh(String),

    /// The referenced node is not a bone.
    #[error("Target is not a bone: {0}")]
    NotABone(String),

    /// The geometry cannot be processed by the requested operation.
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// The material cannot receive the requested edit.
    #[error("Unsupported material: {0}")]
    UnsupportedMaterial(String),

    /// The bounding box is empty or non-finite.
    #[error("Degenerate bounding box: {0}")]
    DegenerateBounds(String),

    /// Argument outside of the accepted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Re-parenting would make a node its own ancestor.
    #[error("Hierarchy cycle: {0}")]
    HierarchyCycle(String),

    /// The model has no skeleton to drive an animation.
    #[error("Model has no skeleton: {0}")]
    NoSkeleton(String),

    /// The supplied file carried no animation clips.
    #[error("No animations in this file")]
    NoAnimations,

    // ========================================================================
    // Export & Serialization Errors
    // ========================================================================
    /// Export request could not be built or the exporter failed.
    #[error("Export error: {0}")]
    Export(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, ForgeError>`.
pub type Result<T> = std::result::Result<T, ForgeError>;
