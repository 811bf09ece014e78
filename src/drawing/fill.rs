/// Shape and cell fill implementation.
use crate::drawing::image::SlideImage;
use crate::error::{ModelError, Result};
use crate::markup;
use crate::opc::constants::content_type;
use crate::opc::{PackUri, Package};
use crate::shared::RemovalFlag;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Fill type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillType {
    /// No fill, or no fill element present
    NoFill,
    /// Solid color fill
    Solid,
    /// Gradient fill
    Gradient,
    /// Pattern fill
    Pattern,
    /// Picture fill backed by an image part
    Picture,
}

/// The concrete fill variant, with the data that applies to it.
#[derive(Debug)]
pub enum FillKind {
    /// No fill
    NoFill,
    /// Solid fill; the hex color is absent for theme-relative colors
    Solid(Option<String>),
    /// Gradient fill
    Gradient,
    /// Pattern fill
    Pattern,
    /// Picture fill
    Picture(SlideImage),
}

/// A shape or table-cell fill.
///
/// Derived from a properties element (`spPr` or `tcPr`). Queries for an
/// aspect that does not apply to the concrete variant (the color of a
/// picture fill, the image of a solid fill) return `None` rather than
/// erroring; "not applicable" is a legitimate state, not a fault.
#[derive(Debug)]
pub struct ShapeFill {
    /// Partname of the part the fill's relationships resolve in
    scope: PackUri,
    /// Removal token of the owning shape
    owner: RemovalFlag,
    kind: FillKind,
}

impl ShapeFill {
    /// Parse a fill from a properties subtree (`spPr` or `tcPr`).
    ///
    /// The first fill element wins. Outline (`a:ln`) subtrees carry their own
    /// fill elements and are skipped entirely. A missing fill element yields
    /// `NoFill`.
    pub(crate) fn from_properties(
        scope: PackUri,
        owner: RemovalFlag,
        props_xml: &[u8],
    ) -> Result<Self> {
        let kind = parse_fill_kind(props_xml, &scope, &owner)?;
        Ok(Self { scope, owner, kind })
    }

    /// Get the fill type.
    pub fn fill_type(&self) -> FillType {
        match self.kind {
            FillKind::NoFill => FillType::NoFill,
            FillKind::Solid(_) => FillType::Solid,
            FillKind::Gradient => FillType::Gradient,
            FillKind::Pattern => FillType::Pattern,
            FillKind::Picture(_) => FillType::Picture,
        }
    }

    /// Get the solid color as a hex string (e.g., "FF0000").
    ///
    /// Returns `None` if the fill is not solid, or the color is theme-relative.
    pub fn hex_solid_color(&self) -> Option<&str> {
        match &self.kind {
            FillKind::Solid(color) => color.as_deref(),
            _ => None,
        }
    }

    /// Get the picture image. Returns `None` if the fill is not a picture.
    pub fn picture(&self) -> Option<&SlideImage> {
        match &self.kind {
            FillKind::Picture(image) => Some(image),
            _ => None,
        }
    }

    /// Get mutable access to the picture image for reading or writing bytes.
    ///
    /// Returns `None` if the fill is not a picture.
    pub fn picture_mut(&mut self) -> Option<&mut SlideImage> {
        match &mut self.kind {
            FillKind::Picture(image) => Some(image),
            _ => None,
        }
    }

    /// Set a picture fill from image bytes.
    ///
    /// Writing through an existing picture fill follows the copy-on-write
    /// contract of [`SlideImage::write`]. Any other variant switches to a
    /// picture fill backed by a freshly allocated image part related to this
    /// fill's scope.
    pub fn set_picture(&mut self, pkg: &mut Package, bytes: &[u8]) -> Result<()> {
        if self.owner.is_removed() {
            return Err(ModelError::InvalidState(
                "cannot set fill picture on a removed shape".to_string(),
            ));
        }

        match &mut self.kind {
            FillKind::Picture(image) => image.write(pkg, bytes),
            _ => {
                let (partname, r_id) = pkg.allocate_related(&self.scope, content_type::PNG)?;
                pkg.get_part_mut(&partname)?.set_blob(bytes.to_vec());
                self.kind = FillKind::Picture(SlideImage::new(
                    self.scope.clone(),
                    r_id,
                    self.owner.clone(),
                ));
                Ok(())
            },
        }
    }
}

/// Find the first fill element in a properties subtree and parse it.
fn parse_fill_kind(
    props_xml: &[u8],
    scope: &PackUri,
    owner: &RemovalFlag,
) -> Result<FillKind> {
    let mut reader = Reader::from_reader(props_xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    // True while inside an a:ln subtree; outline fills must not be picked up.
    let mut in_outline = false;
    // Set once a solidFill element is open; its srgbClr decides the color.
    let mut in_solid = false;

    loop {
        let event = reader.read_event_into(&mut buf);
        let (e, is_start) = match &event {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if in_outline {
                    if name.as_ref() == b"ln" {
                        in_outline = false;
                    }
                } else if in_solid && name.as_ref() == b"solidFill" {
                    // Solid fill closed without an explicit rgb color.
                    return Ok(FillKind::Solid(None));
                }
                buf.clear();
                continue;
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {
                buf.clear();
                continue;
            },
        };

        let name = e.local_name();
        let name = name.as_ref();

        if in_outline {
            // Skipped wholesale; a:ln never nests another a:ln.
        } else if name == b"ln" {
            in_outline = is_start;
        } else if in_solid {
            if name == b"srgbClr" {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"val" {
                        return Ok(FillKind::Solid(Some(
                            String::from_utf8_lossy(&attr.value).into_owned(),
                        )));
                    }
                }
            }
        } else {
            match name {
                b"noFill" => return Ok(FillKind::NoFill),
                b"solidFill" if is_start => in_solid = true,
                b"solidFill" => return Ok(FillKind::Solid(None)),
                b"gradFill" => return Ok(FillKind::Gradient),
                b"pattFill" => return Ok(FillKind::Pattern),
                b"blipFill" => {
                    return match markup::first_embed_rid(props_xml, b"blip")? {
                        Some(r_id) => Ok(FillKind::Picture(SlideImage::new(
                            scope.clone(),
                            r_id,
                            owner.clone(),
                        ))),
                        // A blip fill without an embedded image resolves to
                        // nothing this model can address.
                        None => Ok(FillKind::NoFill),
                    };
                },
                _ => {},
            }
        }
        buf.clear();
    }

    Ok(FillKind::NoFill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::Part;
    use crate::opc::constants::content_type as ct;

    fn scope() -> PackUri {
        PackUri::new("/ppt/slides/slide1.xml").unwrap()
    }

    fn fill_from(xml: &[u8]) -> ShapeFill {
        ShapeFill::from_properties(scope(), RemovalFlag::new(), xml).unwrap()
    }

    #[test]
    fn test_solid_fill_color() {
        let fill = fill_from(
            br#"<p:spPr><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></p:spPr>"#,
        );
        assert_eq!(fill.fill_type(), FillType::Solid);
        assert_eq!(fill.hex_solid_color(), Some("FF0000"));
        assert!(fill.picture().is_none());
    }

    #[test]
    fn test_theme_relative_solid_fill_has_no_hex() {
        let fill = fill_from(
            br#"<p:spPr><a:solidFill><a:schemeClr val="accent1"/></a:solidFill></p:spPr>"#,
        );
        assert_eq!(fill.fill_type(), FillType::Solid);
        assert_eq!(fill.hex_solid_color(), None);
    }

    #[test]
    fn test_no_fill_and_absent_fill() {
        assert_eq!(fill_from(b"<p:spPr><a:noFill/></p:spPr>").fill_type(), FillType::NoFill);
        assert_eq!(fill_from(b"<p:spPr/>").fill_type(), FillType::NoFill);
    }

    #[test]
    fn test_gradient_and_pattern() {
        assert_eq!(
            fill_from(b"<p:spPr><a:gradFill><a:gsLst/></a:gradFill></p:spPr>").fill_type(),
            FillType::Gradient
        );
        assert_eq!(
            fill_from(br#"<p:spPr><a:pattFill prst="pct5"/></p:spPr>"#).fill_type(),
            FillType::Pattern
        );
    }

    #[test]
    fn test_picture_fill_resolves_blip() {
        let fill = fill_from(
            br#"<a:tcPr><a:blipFill><a:blip r:embed="rIdPic123"/></a:blipFill></a:tcPr>"#,
        );
        assert_eq!(fill.fill_type(), FillType::Picture);
        assert_eq!(fill.picture().unwrap().r_id(), "rIdPic123");
    }

    #[test]
    fn test_outline_fill_is_not_the_shape_fill() {
        // The a:ln subtree carries its own solidFill; the shape itself has none.
        let fill = fill_from(
            br#"<p:spPr><a:ln w="12700"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln></p:spPr>"#,
        );
        assert_eq!(fill.fill_type(), FillType::NoFill);
    }

    #[test]
    fn test_set_picture_installs_image_part() {
        let mut pkg = Package::new();
        pkg.add_part(Part::new(scope(), ct::PML_SLIDE, b"<p:sld/>".to_vec()));

        let mut fill = fill_from(b"<p:spPr><a:noFill/></p:spPr>");
        fill.set_picture(&mut pkg, b"\x89PNG....").unwrap();

        assert_eq!(fill.fill_type(), FillType::Picture);
        let image = fill.picture_mut().unwrap();
        assert_eq!(image.read(&pkg).unwrap().as_slice(), b"\x89PNG....");
        assert_eq!(image.content_type(&pkg).unwrap(), "image/png");
    }

    #[test]
    fn test_set_picture_on_removed_shape_fails() {
        let mut pkg = Package::new();
        pkg.add_part(Part::new(scope(), ct::PML_SLIDE, b"<p:sld/>".to_vec()));

        let owner = RemovalFlag::new();
        let mut fill =
            ShapeFill::from_properties(scope(), owner.clone(), b"<p:spPr/>").unwrap();
        owner.mark_removed();

        let err = fill.set_picture(&mut pkg, b"bytes").unwrap_err();
        assert!(matches!(err, ModelError::InvalidState(_)));
    }
}
