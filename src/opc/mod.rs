//! Part-store layer: parts, partnames, and relationships.
//!
//! This layer holds the package's content units in memory and implements the
//! relationship graph between them: resolution of relationship ids within an
//! owning scope, allocation of new parts under collision-free ids, and
//! rebinding of relationships when a resource is forked. Physical container
//! handling (zip reading and writing) lives outside this crate.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod rel;

pub use error::OpcError;
pub use package::Package;
pub use packuri::PackUri;
pub use part::Part;
pub use rel::{Relationship, Relationships};
