use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackUri;
/// Relationship-related objects for the part store.
///
/// This module provides types for managing relationships between parts,
/// including internal and external relationships. Relationship ids are short
/// random tokens, unique within their owning scope.
use rand::RngExt;
use rand::distr::Alphanumeric;
use std::collections::HashMap;

/// Number of random characters in a generated relationship id.
const RID_TOKEN_LEN: usize = 6;

/// A single relationship from a source part to a target.
///
/// Identified by an rId (relationship id) unique within the source part's
/// scope. Can be either internal (pointing to another part by partname) or
/// external (pointing to an external URL).
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship id (e.g., "rIdQm3xZ1")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - an absolute partname or an external URL
    target: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(r_id: String, reltype: String, target: String, is_external: bool) -> Self {
        Self {
            r_id,
            reltype,
            target,
            is_external,
        }
    }

    /// Get the relationship id.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    ///
    /// For internal relationships, this is an absolute partname.
    /// For external relationships, this is a URL.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackUri> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackUri::new(self.target.as_str()).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source part.
///
/// Uses a HashMap for O(1) lookup by relationship id.
#[derive(Debug, Default)]
pub struct Relationships {
    /// Map of relationship id to Relationship
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self {
            rels: HashMap::new(),
        }
    }

    /// Add a relationship under an explicit id.
    ///
    /// # Returns
    /// Reference to the newly added relationship
    pub fn add(
        &mut self,
        r_id: String,
        reltype: String,
        target: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(r_id.clone(), reltype, target, is_external);
        self.rels.insert(r_id.clone(), rel);
        // Safe to unwrap since we just inserted it
        self.rels.get(r_id.as_str()).unwrap()
    }

    /// Add an internal relationship under a freshly generated id.
    ///
    /// # Returns
    /// The generated relationship id
    pub fn add_with_generated_id(&mut self, reltype: &str, target: &str) -> String {
        let r_id = self.generate_rid();
        self.add(r_id.clone(), reltype.to_string(), target.to_string(), false);
        r_id
    }

    /// Get a relationship by its id.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Repoint an existing relationship at a different target part.
    ///
    /// The relationship id and type are unchanged; only the target moves.
    pub fn rebind(&mut self, r_id: &str, target: &str) -> Result<()> {
        let rel = self
            .rels
            .get_mut(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))?;
        if rel.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "Cannot rebind external relationship '{}'",
                r_id
            )));
        }
        rel.target = target.to_string();
        Ok(())
    }

    /// Generate a relationship id unused in this collection.
    ///
    /// Ids are short random tokens, so a candidate can collide with an
    /// existing id; generation retries with a new candidate until an unused
    /// one is found. Callers never observe a collision.
    fn generate_rid(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let mut r_id = String::with_capacity(3 + RID_TOKEN_LEN);
            r_id.push_str("rId");
            for _ in 0..RID_TOKEN_LEN {
                r_id.push(rng.sample(Alphanumeric) as char);
            }
            if !self.rels.contains_key(&r_id) {
                return r_id;
            }
        }
    }

    /// Get an iterator over all relationships.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Remove a relationship by its id.
    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        self.rels.remove(r_id)
    }
}
