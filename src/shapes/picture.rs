/// Picture (image) shape implementation.
use crate::drawing::SlideImage;
use crate::error::Result;
use crate::markup;
use crate::opc::{OpcError, PackUri, Package};
use crate::shapes::base::{ShapeKind, ShapeNode};

/// A typed view over a picture shape.
///
/// Pictures display images on slides. The binary image is reached through
/// the blip's embed relationship; an SVG picture additionally carries a
/// vector part next to its raster fallback.
///
/// # Examples
///
/// ```rust,ignore
/// if let Some(mut picture) = node.picture()? {
///     let bytes = picture.image().read(&pkg)?;
/// }
/// ```
#[derive(Debug)]
pub struct Picture {
    /// Partname of the slide part the picture's relationships resolve in
    scope: PackUri,
    /// The raster image behind the blip's embed relationship
    image: SlideImage,
    /// Embed relationship of the vector part, for SVG pictures
    svg_rid: Option<String>,
}

impl Picture {
    /// Build a picture view over a shape node.
    ///
    /// Returns `None` for nodes that are not pictures. A picture without an
    /// embedded image relationship is malformed and fails with `PartNotFound`.
    pub(crate) fn from_node(node: &ShapeNode) -> Result<Option<Self>> {
        if node.kind() != ShapeKind::Picture {
            return Ok(None);
        }
        let r_id = markup::first_embed_rid(node.xml(), b"blip")?.ok_or_else(|| {
            OpcError::PartNotFound("image relationship not found in picture".to_string())
        })?;
        let svg_rid = markup::first_embed_rid(node.xml(), b"svgBlip")?;

        Ok(Some(Self {
            scope: node.scope().clone(),
            image: SlideImage::new(node.scope().clone(), r_id, node.removal_flag()),
            svg_rid,
        }))
    }

    /// Get the picture's image for reading or writing bytes.
    #[inline]
    pub fn image(&mut self) -> &mut SlideImage {
        &mut self.image
    }

    /// Consume the view, keeping only the image.
    #[inline]
    pub fn into_image(self) -> SlideImage {
        self.image
    }

    /// Check whether this picture carries SVG content.
    #[inline]
    pub fn has_svg(&self) -> bool {
        self.svg_rid.is_some()
    }

    /// Get the SVG content of this picture.
    ///
    /// Returns `None` if the picture is not an SVG graphic.
    pub fn svg_content(&self, pkg: &Package) -> Result<Option<String>> {
        match &self.svg_rid {
            Some(r_id) => {
                let part = pkg.part_by_rid(&self.scope, r_id)?;
                Ok(Some(String::from_utf8_lossy(part.blob()).into_owned()))
            },
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::Part;
    use crate::opc::constants::{content_type, relationship_type};

    fn scope() -> PackUri {
        PackUri::new("/ppt/slides/slide1.xml").unwrap()
    }

    fn pic_xml(r_id: &str) -> Vec<u8> {
        format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture 4"/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/></p:blipFill></p:pic>"#,
            r_id
        )
        .into_bytes()
    }

    fn package_with_image(bytes: &[u8]) -> (Package, String) {
        let mut pkg = Package::new();
        pkg.add_part(Part::new(scope(), content_type::PML_SLIDE, b"<p:sld/>".to_vec()));
        let (partname, r_id) = pkg.allocate_related(&scope(), content_type::PNG).unwrap();
        pkg.get_part_mut(&partname).unwrap().set_blob(bytes.to_vec());
        (pkg, r_id)
    }

    #[test]
    fn test_picture_reads_blip_image() {
        let (pkg, r_id) = package_with_image(b"raster");
        let node = ShapeNode::from_markup(scope(), pic_xml(&r_id)).unwrap();

        let mut picture = node.picture().unwrap().unwrap();
        assert_eq!(picture.image().read(&pkg).unwrap().as_slice(), b"raster");
        assert!(!picture.has_svg());
        assert_eq!(picture.svg_content(&pkg).unwrap(), None);
    }

    #[test]
    fn test_picture_without_blip_is_malformed() {
        let xml = br#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture 4"/></p:nvPicPr><p:blipFill/></p:pic>"#;
        let node = ShapeNode::from_markup(scope(), xml.to_vec()).unwrap();
        assert!(node.picture().is_err());
    }

    #[test]
    fn test_non_picture_node_has_no_picture_view() {
        let xml = br#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Box"/></p:nvSpPr></p:sp>"#;
        let node = ShapeNode::from_markup(scope(), xml.to_vec()).unwrap();
        assert!(node.picture().unwrap().is_none());
    }

    #[test]
    fn test_svg_content() {
        let (mut pkg, r_id) = package_with_image(b"raster");
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        let svg_part = pkg.allocate_part(content_type::SVG).unwrap();
        pkg.get_part_mut(&svg_part).unwrap().set_blob(svg.to_vec());
        let svg_rid = pkg
            .get_part_mut(&scope())
            .unwrap()
            .rels_mut()
            .add_with_generated_id(relationship_type::IMAGE, svg_part.as_str());

        let xml = format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture 4"/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"><a:extLst><a:ext uri="{{96DAC541-7B7A-43D3-8B79-37D633B846F1}}"><asvg:svgBlip r:embed="{}"/></a:ext></a:extLst></a:blip></p:blipFill></p:pic>"#,
            r_id, svg_rid
        );
        let node = ShapeNode::from_markup(scope(), xml.into_bytes()).unwrap();

        let picture = node.picture().unwrap().unwrap();
        assert!(picture.has_svg());
        assert_eq!(
            picture.svg_content(&pkg).unwrap().unwrap(),
            String::from_utf8_lossy(svg)
        );
    }
}
