/// Error types for the object-model layer.
use crate::opc::OpcError;
use thiserror::Error;

/// Result type for object-model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Error types for the object-model layer.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Part-store error (unresolved relationship id, missing part, ...)
    #[error("OPC error: {0}")]
    Opc(#[from] OpcError),

    /// Operation on a shape that has been removed from its tree
    #[error("Shape has been removed: {0}")]
    Removed(String),

    /// Mutation through a resource whose owner is no longer live
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Tree operation addressed a shape id that is not in the tree
    #[error("Shape not found: id {0}")]
    ShapeNotFound(u32),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error from the backing byte storage, propagated unmodified
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for ModelError {
    fn from(err: quick_xml::Error) -> Self {
        ModelError::Xml(err.to_string())
    }
}
