/// The ordered shape container of a slide.
use crate::drawing::SlideImage;
use crate::error::{ModelError, Result};
use crate::markup;
use crate::opc::{PackUri, Package};
use crate::shapes::SHAPE_ELEMENTS;
use crate::shapes::base::{ShapeId, ShapeNode};
use crate::shapes::cloner;
use crate::shared::RemovalFlag;

/// The ordered container of shape nodes under a slide.
///
/// Built by walking the slide part's `p:spTree`. Nodes keep their document
/// order, which is the z-order: the first node renders backmost. Removed
/// nodes stay addressable (so later operations on them can fail with
/// `Removed`) but are excluded from enumeration and z-order changes.
///
/// # Examples
///
/// ```rust,ignore
/// let mut tree = ShapeTree::from_slide(&pkg, &slide)?;
/// for shape in tree.enumerate() {
///     println!("{} ({:?})", shape.name(), shape.kind());
/// }
/// ```
#[derive(Debug)]
pub struct ShapeTree {
    /// Partname of the slide part this tree was built from
    scope: PackUri,
    /// All nodes in z-order, including removed ones
    nodes: Vec<ShapeNode>,
    /// Embed relationship of the slide background picture, if any
    background_rid: Option<String>,
}

impl ShapeTree {
    /// Build the shape tree of a slide part.
    pub fn from_slide(pkg: &Package, slide: &PackUri) -> Result<Self> {
        let part = pkg.get_part(slide)?;

        let background_rid = match markup::first_subtree(part.blob(), b"bg")? {
            Some(bg) => markup::first_embed_rid(&bg, b"blip")?,
            None => None,
        };

        let sp_tree = markup::first_subtree(part.blob(), b"spTree")?
            .ok_or_else(|| ModelError::Xml(format!("no shape tree in {}", slide)))?;

        let mut nodes = Vec::new();
        for subtree in markup::child_subtrees(&sp_tree, SHAPE_ELEMENTS)? {
            nodes.push(ShapeNode::from_markup(slide.clone(), subtree)?);
        }

        Ok(Self {
            scope: slide.clone(),
            nodes,
            background_rid,
        })
    }

    /// Get the partname of the slide part this tree was built from.
    #[inline]
    pub fn scope(&self) -> &PackUri {
        &self.scope
    }

    /// Iterate the live shapes in z-order (backmost first).
    pub fn enumerate(&self) -> impl Iterator<Item = &ShapeNode> {
        self.nodes.iter().filter(|node| !node.is_removed())
    }

    /// Get the number of live shapes.
    pub fn len(&self) -> usize {
        self.enumerate().count()
    }

    /// Check whether the tree has no live shapes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a live shape by its numeric id.
    pub fn find_by_id(&self, id: ShapeId) -> Option<&ShapeNode> {
        self.enumerate().find(|node| node.id() == id)
    }

    /// Find a live shape by its name. Returns the first match.
    pub fn find_by_name(&self, name: &str) -> Option<&ShapeNode> {
        self.enumerate().find(|node| node.name() == name)
    }

    /// Get mutable access to a live shape by its id.
    ///
    /// # Errors
    /// `ShapeNotFound` for an id this tree has never held; `Removed` for a
    /// node that has been removed.
    pub fn node_mut(&mut self, id: ShapeId) -> Result<&mut ShapeNode> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id() == id)
            .ok_or(ModelError::ShapeNotFound(id.0))?;
        node.ensure_live()?;
        Ok(node)
    }

    /// Append a shape node at the top of the z-order.
    ///
    /// # Returns
    /// The id of the appended node.
    pub fn append(&mut self, node: ShapeNode) -> ShapeId {
        let id = node.id();
        self.nodes.push(node);
        id
    }

    /// Remove a shape from the tree.
    ///
    /// The node becomes permanently inert: it disappears from enumeration
    /// and every later read or mutation through it fails with `Removed`.
    pub fn remove(&mut self, id: ShapeId) -> Result<()> {
        let node = self.find_any(id)?;
        node.ensure_live()?;
        node.mark_removed();
        Ok(())
    }

    /// Move a shape to the backmost position of the z-order.
    ///
    /// The node becomes the first rendered shape; the relative order of all
    /// other nodes is preserved.
    pub fn send_to_back(&mut self, id: ShapeId) -> Result<()> {
        let pos = self
            .nodes
            .iter()
            .position(|node| node.id() == id)
            .ok_or(ModelError::ShapeNotFound(id.0))?;
        self.nodes[pos].ensure_live()?;

        let node = self.nodes.remove(pos);
        self.nodes.insert(0, node);
        Ok(())
    }

    /// Deep-copy a shape of this tree and append the copy.
    ///
    /// The copy gets the next unused id in this tree's id space, a name that
    /// collides with no existing shape name, and its own freshly allocated
    /// parts for every embedded resource; it shares nothing with its source.
    pub fn duplicate(&mut self, pkg: &mut Package, id: ShapeId) -> Result<ShapeId> {
        let (xml, name) = {
            let source = self.find_any(id)?;
            source.ensure_live()?;
            (source.xml().to_vec(), source.name().to_string())
        };
        let node = cloner::clone_shape(pkg, &self.scope, &xml, &name, self)?;
        Ok(self.append(node))
    }

    /// Deep-copy a shape from another tree into `target`.
    ///
    /// Embedded resources are copied into parts of the target tree's scope,
    /// so the copy shares nothing with the source tree's slide.
    pub fn copy_into(
        pkg: &mut Package,
        source: &ShapeNode,
        target: &mut ShapeTree,
    ) -> Result<ShapeId> {
        source.ensure_live()?;
        let node = cloner::clone_shape(
            pkg,
            source.scope(),
            source.xml(),
            source.name(),
            target,
        )?;
        Ok(target.append(node))
    }

    /// Get the slide's background picture, if the slide has one.
    pub fn background_image(&self) -> Option<SlideImage> {
        self.background_rid
            .as_ref()
            .map(|r_id| SlideImage::new(self.scope.clone(), r_id.clone(), RemovalFlag::new()))
    }

    /// Next unused numeric shape id, counting live and removed nodes.
    pub(crate) fn next_shape_id(&self) -> u32 {
        self.nodes
            .iter()
            .map(|node| node.id().0)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Check whether any node (live or removed) carries the given name.
    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.nodes.iter().any(|node| node.name() == name)
    }

    /// Find a node by id, including removed nodes.
    fn find_any(&self, id: ShapeId) -> Result<&ShapeNode> {
        self.nodes
            .iter()
            .find(|node| node.id() == id)
            .ok_or(ModelError::ShapeNotFound(id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::Part;
    use crate::opc::constants::{content_type, namespace};
    use crate::shapes::base::ShapeKind;

    fn slide_uri() -> PackUri {
        PackUri::new("/ppt/slides/slide1.xml").unwrap()
    }

    fn slide_xml(body: &str) -> Vec<u8> {
        format!(
            r#"<p:sld xmlns:a="{}" xmlns:p="{}" xmlns:r="{}"><p:cSld>{}</p:cSld></p:sld>"#,
            namespace::DRAWINGML,
            namespace::PRESENTATIONML,
            namespace::OFC_RELATIONSHIPS,
            body
        )
        .into_bytes()
    }

    fn tree_from(body: &str) -> (Package, ShapeTree) {
        let mut pkg = Package::new();
        pkg.add_part(Part::new(slide_uri(), content_type::PML_SLIDE, slide_xml(body)));
        let tree = ShapeTree::from_slide(&pkg, &slide_uri()).unwrap();
        (pkg, tree)
    }

    const TWO_SHAPES: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/></p:nvSpPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content 2"/></p:nvSpPr></p:sp></p:spTree>"#;

    #[test]
    fn test_from_slide_walks_shape_elements() {
        let (_, tree) = tree_from(TWO_SHAPES);
        let names: Vec<&str> = tree.enumerate().map(|node| node.name()).collect();
        assert_eq!(names, vec!["Title 1", "Content 2"]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.scope(), &slide_uri());
    }

    #[test]
    fn test_find_by_id_and_name() {
        let (_, tree) = tree_from(TWO_SHAPES);
        assert_eq!(tree.find_by_id(ShapeId(3)).unwrap().name(), "Content 2");
        assert_eq!(tree.find_by_name("Title 1").unwrap().id(), ShapeId(2));
        assert!(tree.find_by_id(ShapeId(42)).is_none());
        assert!(tree.find_by_name("Nope").is_none());
    }

    #[test]
    fn test_remove_makes_node_inert_and_absent() {
        // A removed node leaves enumeration and every later operation on it
        // fails with Removed.
        let (_, mut tree) = tree_from(TWO_SHAPES);
        tree.remove(ShapeId(2)).unwrap();

        assert_eq!(tree.len(), 1);
        assert!(tree.find_by_id(ShapeId(2)).is_none());
        assert!(matches!(
            tree.node_mut(ShapeId(2)).unwrap_err(),
            ModelError::Removed(_)
        ));
        assert!(matches!(
            tree.remove(ShapeId(2)).unwrap_err(),
            ModelError::Removed(_)
        ));
        assert!(matches!(
            tree.send_to_back(ShapeId(2)).unwrap_err(),
            ModelError::Removed(_)
        ));
    }

    #[test]
    fn test_removed_node_blocks_derived_reads() {
        let (_, mut tree) = tree_from(TWO_SHAPES);
        tree.remove(ShapeId(2)).unwrap();

        // Reach the node through the slab it is still part of.
        let node = tree.nodes.iter_mut().find(|n| n.id() == ShapeId(2)).unwrap();
        assert!(matches!(node.fill().unwrap_err(), ModelError::Removed(_)));
        assert!(matches!(
            node.text_frame().unwrap_err(),
            ModelError::Removed(_)
        ));
    }

    #[test]
    fn test_unknown_id_is_shape_not_found() {
        let (mut pkg, mut tree) = tree_from(TWO_SHAPES);
        assert!(matches!(
            tree.node_mut(ShapeId(42)).unwrap_err(),
            ModelError::ShapeNotFound(42)
        ));
        assert!(matches!(
            tree.duplicate(&mut pkg, ShapeId(42)).unwrap_err(),
            ModelError::ShapeNotFound(42)
        ));
    }

    #[test]
    fn test_send_to_back_preserves_relative_order() {
        let body = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="A"/></p:nvSpPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="B"/></p:nvSpPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="4" name="C"/></p:nvSpPr></p:sp></p:spTree>"#;
        let (_, mut tree) = tree_from(body);

        tree.send_to_back(ShapeId(4)).unwrap();
        let names: Vec<&str> = tree.enumerate().map(|node| node.name()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_background_image() {
        let body = r#"<p:bg><p:bgPr><a:blipFill><a:blip r:embed="rIdBg0001"/></a:blipFill></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#;
        let (mut pkg, tree) = tree_from(body);

        let image_part = pkg.allocate_part(content_type::PNG).unwrap();
        pkg.get_part_mut(&image_part).unwrap().set_blob(b"bg".to_vec());
        pkg.get_part_mut(&slide_uri())
            .unwrap()
            .rels_mut()
            .add(
                "rIdBg0001".to_string(),
                crate::opc::constants::relationship_type::IMAGE.to_string(),
                image_part.as_str().to_string(),
                false,
            );

        let mut background = tree.background_image().unwrap();
        assert_eq!(background.read(&pkg).unwrap().as_slice(), b"bg");

        let (_, plain) = tree_from(TWO_SHAPES);
        assert!(plain.background_image().is_none());
    }

    #[test]
    fn test_group_children_stay_inside_their_group() {
        let body = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/><p:grpSp><p:nvGrpSpPr><p:cNvPr id="5" name="Group 4"/></p:nvGrpSpPr><p:sp><p:nvSpPr><p:cNvPr id="6" name="Inner 5"/></p:nvSpPr></p:sp></p:grpSp></p:spTree>"#;
        let (_, tree) = tree_from(body);

        assert_eq!(tree.len(), 1);
        let group = tree.find_by_id(ShapeId(5)).unwrap();
        assert_eq!(group.kind(), ShapeKind::Group);
        assert!(tree.find_by_id(ShapeId(6)).is_none());
    }
}
