/// The in-memory part store.
///
/// This module provides the main Package type: all parts of a presentation
/// package indexed by partname, with relationship-scoped addressing, part
/// allocation, and relationship rebinding. The physical container (zip
/// reading and writing) is the concern of a separate packaging engine; this
/// store only guarantees that relationship ids stay consistent and
/// resolvable while the object model mutates it.
use crate::opc::constants::{default_extension, relationship_type};
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackUri;
use crate::opc::part::Part;
use std::collections::HashMap;

/// All parts of a presentation package, indexed by partname.
///
/// Every part owns its own relationship collection; a relationship id is
/// meaningful only within the scope of the part that holds it.
#[derive(Debug, Default)]
pub struct Package {
    /// All parts in the package, indexed by partname
    parts: HashMap<String, Part>,
}

impl Package {
    /// Create a new empty package.
    pub fn new() -> Self {
        Self {
            parts: HashMap::new(),
        }
    }

    /// Add a part to the package, replacing any part with the same partname.
    pub fn add_part(&mut self, part: Part) {
        let partname = part.partname().as_str().to_string();
        self.parts.insert(partname, part);
    }

    /// Get a part by its partname.
    pub fn get_part(&self, partname: &PackUri) -> Result<&Part> {
        self.parts
            .get(partname.as_str())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get a mutable reference to a part by its partname.
    pub fn get_part_mut(&mut self, partname: &PackUri) -> Result<&mut Part> {
        self.parts
            .get_mut(partname.as_str())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Resolve a relationship id within a scope part to the target part.
    ///
    /// # Arguments
    /// * `scope` - Partname of the part that owns the relationship
    /// * `r_id` - The relationship id to resolve
    ///
    /// # Errors
    /// `PartNotFound` when the id does not resolve within the scope, or the
    /// target part is missing from the package.
    pub fn part_by_rid(&self, scope: &PackUri, r_id: &str) -> Result<&Part> {
        let partname = self.target_of(scope, r_id)?;
        self.get_part(&partname)
    }

    /// Get the target partname of a relationship id within a scope part.
    pub fn target_of(&self, scope: &PackUri, r_id: &str) -> Result<PackUri> {
        let scope_part = self.get_part(scope)?;
        let rel = scope_part.rels().get(r_id).ok_or_else(|| {
            OpcError::PartNotFound(format!("'{}' does not resolve in {}", r_id, scope))
        })?;
        rel.target_partname()
    }

    /// Count internal relationships anywhere in the package targeting a part.
    ///
    /// A part is shared when more than one relationship targets it. The count
    /// is computed fresh on every call; sharing changes with every clone,
    /// rebind, and removal, so it must never be cached across mutations.
    pub fn ref_count(&self, partname: &PackUri) -> usize {
        self.parts
            .values()
            .flat_map(|part| part.rels().iter())
            .filter(|rel| !rel.is_external() && rel.target() == partname.as_str())
            .count()
    }

    /// Allocate a new empty media part for the given content type.
    ///
    /// The partname is the first free name under `/ppt/media/`.
    pub fn allocate_part(&mut self, content_type: &str) -> Result<PackUri> {
        let template = format!("/ppt/media/image%d.{}", default_extension(content_type));
        let partname = self.next_partname(&template)?;
        self.add_part(Part::new(partname.clone(), content_type, Vec::new()));
        Ok(partname)
    }

    /// Allocate a new media part and relate the scope part to it.
    ///
    /// A fresh relationship id is generated for the scope; id generation
    /// retries internally on collision and never surfaces an error.
    ///
    /// # Returns
    /// The new part's partname and the relationship id that reaches it from
    /// `scope`.
    pub fn allocate_related(
        &mut self,
        scope: &PackUri,
        content_type: &str,
    ) -> Result<(PackUri, String)> {
        // The scope is checked before any store mutation, so a missing scope
        // leaves the package untouched.
        self.get_part(scope)?;
        let partname = self.allocate_part(content_type)?;
        let scope_part = self.get_part_mut(scope)?;
        let r_id = scope_part
            .rels_mut()
            .add_with_generated_id(relationship_type::IMAGE, partname.as_str());
        Ok((partname, r_id))
    }

    /// Repoint a relationship in a scope part at a different target part.
    ///
    /// The target part must already exist in the package.
    pub fn rebind(&mut self, scope: &PackUri, r_id: &str, target: &PackUri) -> Result<()> {
        if !self.contains_part(target) {
            return Err(OpcError::PartNotFound(target.to_string()));
        }
        self.get_part_mut(scope)?
            .rels_mut()
            .rebind(r_id, target.as_str())
    }

    /// Find the next available partname for a part template.
    ///
    /// # Arguments
    /// * `template` - A format string with a %d placeholder for the number
    pub fn next_partname(&self, template: &str) -> Result<PackUri> {
        let mut n = 1u32;
        loop {
            let candidate = template.replace("%d", &n.to_string());
            if !self.parts.contains_key(&candidate) {
                return PackUri::new(candidate).map_err(OpcError::InvalidPackUri);
            }
            n += 1;
            if n > 10000 {
                // Safety limit to prevent infinite loops
                return Err(OpcError::InvalidPackUri(
                    "Too many parts, cannot find next partname".to_string(),
                ));
            }
        }
    }

    /// Check if a part exists in the package.
    pub fn contains_part(&self, partname: &PackUri) -> bool {
        self.parts.contains_key(partname.as_str())
    }

    /// Get an iterator over all parts in the package.
    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Get the number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::constants::content_type;

    fn slide_uri() -> PackUri {
        PackUri::new("/ppt/slides/slide1.xml").unwrap()
    }

    fn package_with_slide() -> Package {
        let mut pkg = Package::new();
        pkg.add_part(Part::new(
            slide_uri(),
            content_type::PML_SLIDE,
            b"<p:sld/>".to_vec(),
        ));
        pkg
    }

    #[test]
    fn test_resolve_by_rid() {
        let mut pkg = package_with_slide();
        let (partname, r_id) = pkg.allocate_related(&slide_uri(), content_type::PNG).unwrap();

        let part = pkg.part_by_rid(&slide_uri(), &r_id).unwrap();
        assert_eq!(part.partname(), &partname);
        assert_eq!(part.content_type(), "image/png");
    }

    #[test]
    fn test_resolve_missing_rid_is_part_not_found() {
        let pkg = package_with_slide();
        let err = pkg.part_by_rid(&slide_uri(), "rIdNope11").unwrap_err();
        assert!(matches!(err, OpcError::PartNotFound(_)));
    }

    #[test]
    fn test_allocate_part_numbers_sequentially() {
        let mut pkg = package_with_slide();
        let first = pkg.allocate_part(content_type::PNG).unwrap();
        let second = pkg.allocate_part(content_type::PNG).unwrap();

        assert_eq!(first.as_str(), "/ppt/media/image1.png");
        assert_eq!(second.as_str(), "/ppt/media/image2.png");
    }

    #[test]
    fn test_allocate_related_generates_distinct_rids() {
        let mut pkg = package_with_slide();
        let (_, rid1) = pkg.allocate_related(&slide_uri(), content_type::PNG).unwrap();
        let (_, rid2) = pkg.allocate_related(&slide_uri(), content_type::PNG).unwrap();
        assert_ne!(rid1, rid2);
    }

    #[test]
    fn test_ref_count_spans_all_scopes() {
        let mut pkg = package_with_slide();
        let slide2 = PackUri::new("/ppt/slides/slide2.xml").unwrap();
        pkg.add_part(Part::new(
            slide2.clone(),
            content_type::PML_SLIDE,
            b"<p:sld/>".to_vec(),
        ));

        let (image, _) = pkg.allocate_related(&slide_uri(), content_type::PNG).unwrap();
        assert_eq!(pkg.ref_count(&image), 1);

        pkg.get_part_mut(&slide2)
            .unwrap()
            .rels_mut()
            .add_with_generated_id(relationship_type::IMAGE, image.as_str());
        assert_eq!(pkg.ref_count(&image), 2);
    }

    #[test]
    fn test_rebind_moves_resolution() {
        let mut pkg = package_with_slide();
        let (original, r_id) = pkg.allocate_related(&slide_uri(), content_type::PNG).unwrap();
        let other = pkg.allocate_part(content_type::PNG).unwrap();

        pkg.rebind(&slide_uri(), &r_id, &other).unwrap();
        assert_eq!(pkg.part_by_rid(&slide_uri(), &r_id).unwrap().partname(), &other);
        assert_eq!(pkg.ref_count(&original), 0);
    }

    #[test]
    fn test_rebind_requires_existing_target() {
        let mut pkg = package_with_slide();
        let (_, r_id) = pkg.allocate_related(&slide_uri(), content_type::PNG).unwrap();
        let missing = PackUri::new("/ppt/media/image99.png").unwrap();

        let err = pkg.rebind(&slide_uri(), &r_id, &missing).unwrap_err();
        assert!(matches!(err, OpcError::PartNotFound(_)));
    }
}
