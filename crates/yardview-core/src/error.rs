//! Error handling for YardView
//!
//! The scene engine only fails at setup time: obtaining a GL context and
//! creating the GPU objects the compositor needs. Everything after setup
//! degrades to a no-op instead of erroring (missing targets resolve to
//! nothing, degenerate framing yields no camera).
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Scene engine error type
///
/// Represents failures while mounting or driving the render pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No usable rendering context could be obtained
    #[error("Rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// A shader failed to compile or link
    #[error("Shader error: {0}")]
    Shader(String),

    /// A GPU buffer or vertex array could not be created
    #[error("Buffer creation error: {0}")]
    Buffer(String),

    /// An offscreen framebuffer could not be created or is incomplete
    #[error("Framebuffer error: {0}")]
    Framebuffer(String),

    /// The pipeline has not been set up, or has already been torn down
    #[error("Render pipeline not initialized")]
    NotInitialized,

    /// Generic scene error
    #[error("Scene error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

impl SceneError {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        SceneError::Other {
            message: msg.into(),
        }
    }

    /// Check if this error happened while building the GPU side of the pipeline
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            SceneError::ContextUnavailable(_)
                | SceneError::Shader(_)
                | SceneError::Buffer(_)
                | SceneError::Framebuffer(_)
        )
    }
}

/// Errors raised while interpreting equipment snapshots and layer tables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A color string is not `#RRGGBB` or `#RGB`
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// A layer id does not exist in the layer table
    #[error("Unknown layer '{0}'")]
    UnknownLayer(String),
}

/// Result type using SceneError
pub type Result<T> = std::result::Result<T, SceneError>;
