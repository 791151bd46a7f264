/// Error types for scene construction
use thiserror::Error;

use crate::scene::NodeId;

/// Failure to read a transformation string as a 4x4 matrix
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixFormatError {
    #[error("token `{token}` in \"{text}\" is not a number")]
    InvalidToken { text: String, token: String },

    #[error("expected 16 values in \"{text}\", found {found}")]
    WrongCount { text: String, found: usize },
}

impl MatrixFormatError {
    /// The full transformation string that failed to parse
    pub fn text(&self) -> &str {
        match self {
            Self::InvalidToken { text, .. } | Self::WrongCount { text, .. } => text,
        }
    }
}

/// Errors raised while building or querying a scene tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("node `{node}` has a malformed transformation: {source}")]
    Format {
        node: String,
        text: String,
        #[source]
        source: MatrixFormatError,
    },

    #[error("node `{node}`: geometry type <{tag}> not supported")]
    UnsupportedGeometry { node: String, tag: String },

    #[error("node `{node}` has a zero-length forward axis")]
    DegenerateRotation { node: String },

    #[error("no node with id {0:?} in this tree")]
    UnknownNode(NodeId),

    #[error("tree already has a root; pass a parent to attach a subtree")]
    RootExists,
}

pub type Result<T> = std::result::Result<T, SceneError>;
