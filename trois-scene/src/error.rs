use thiserror::Error;
use trois_math::MathError;

use crate::NodeId;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node {0} is not in the scene graph")]
    NodeNotFound(NodeId),

    #[error("node {0} is not a {1}")]
    WrongKind(NodeId, &'static str),

    #[error("adding node {child} under {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },

    #[error("attribute `{name}` has no value at index {index}")]
    MissingAttribute { name: String, index: usize },

    #[error("attribute `{name}` expects {expected} components")]
    AttributeArity { name: String, expected: usize },

    #[error("face {face} references vertex {index} but the geometry has {len}")]
    VertexIndexOutOfRange { face: usize, index: usize, len: usize },

    #[error(transparent)]
    Math(#[from] MathError),
}

pub type Result<T> = std::result::Result<T, SceneError>;
