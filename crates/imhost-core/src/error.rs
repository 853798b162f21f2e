//! Error types for imhost.

use thiserror::Error;

use crate::owner::{ContextIndex, OwnerKey};

/// The main error type for imhost operations.
#[derive(Error, Debug)]
pub enum ImHostError {
    /// A font configuration could not be turned into atlas glyphs.
    #[error("invalid font config '{name}': {reason}")]
    InvalidFontConfig { name: String, reason: String },

    /// A font atlas was requested with no fonts in it.
    #[error("font atlas has no fonts")]
    EmptyFontAtlas,

    /// The owner has no context index of its own.
    #[error("owner {0:?} is outside the context index range")]
    OwnerOutOfRange(OwnerKey),

    /// A surface slot maps outside the context index range.
    #[error("surface slot {0} is outside the context index range")]
    SlotOutOfRange(ContextIndex),

    /// No context is registered under the given index.
    #[error("context {0} not found")]
    ContextNotFound(ContextIndex),

    /// Draw data was produced for a different frame than the one being painted.
    #[error("stale draw data: expected frame {expected}, got {actual}")]
    StaleDrawData { expected: u64, actual: u64 },

    /// A draw command referenced a texture that is neither current nor pending release.
    #[error("unknown texture {0}")]
    UnknownTexture(u64),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for imhost operations.
pub type Result<T> = std::result::Result<T, ImHostError>;
