/// Base shape types for the slide object model.
use crate::drawing::ShapeFill;
use crate::error::{ModelError, Result};
use crate::markup;
use crate::opc::PackUri;
use crate::shapes::picture::Picture;
use crate::shapes::table::Table;
use crate::shapes::textframe::TextFrame;
use crate::shared::{Memo, RemovalFlag};
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt;

/// Identity of a shape within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shape kind enumeration.
///
/// A closed tagged variant; capabilities like "has fill" and "has text frame"
/// are derived from the kind instead of a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A text-bearing shape (p:sp)
    AutoShape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table (p:graphicFrame with a:tbl)
    Table,
    /// A group shape (p:grpSp)
    Group,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Unknown or unsupported shape type
    Unknown,
}

/// Shape geometry (position and size) in EMUs.
#[derive(Debug, Clone, Copy)]
struct ShapeGeometry {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

/// A shape node in a slide's shape tree.
///
/// Owns the shape's markup subtree, its identity (numeric id and name), and
/// the lazily derived views over the markup (fill, text frame, geometry).
/// Once removed from its tree a node is permanently inert: every operation
/// that depends on live backing storage fails with `Removed`.
#[derive(Debug)]
pub struct ShapeNode {
    /// Numeric shape id from `p:cNvPr`
    id: u32,
    /// Shape name from `p:cNvPr`
    name: String,
    /// Shape kind
    kind: ShapeKind,
    /// Partname of the slide part this shape belongs to
    scope: PackUri,
    /// Raw XML bytes of the shape subtree
    xml: Vec<u8>,
    /// Removal token, shared with views derived from this node
    removed: RemovalFlag,
    /// Lazily derived fill
    fill: Memo<ShapeFill>,
    /// Lazily derived text frame; a cached `None` is permanent
    text_frame: Memo<Option<TextFrame>>,
    /// Lazily parsed position and size
    geometry: Memo<ShapeGeometry>,
}

impl ShapeNode {
    /// Build a shape node from its markup subtree.
    ///
    /// Kind, id, and name are parsed up front; everything else is derived
    /// lazily on access.
    pub fn from_markup(scope: PackUri, xml: Vec<u8>) -> Result<Self> {
        let kind = detect_kind(&xml)?;
        let (id, name) = parse_identity(&xml)?;
        Ok(Self {
            id,
            name,
            kind,
            scope,
            xml,
            removed: RemovalFlag::new(),
            fill: Memo::new(),
            text_frame: Memo::new(),
            geometry: Memo::new(),
        })
    }

    /// Get the shape id.
    #[inline]
    pub fn id(&self) -> ShapeId {
        ShapeId(self.id)
    }

    /// Get the shape name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the shape kind.
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Get the partname of the slide part this shape belongs to.
    #[inline]
    pub fn scope(&self) -> &PackUri {
        &self.scope
    }

    /// Get the raw markup subtree of this shape.
    #[inline]
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    /// Check whether this shape has been removed from its tree.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed.is_removed()
    }

    /// Get a clone of the removal token for derived views.
    pub(crate) fn removal_flag(&self) -> RemovalFlag {
        self.removed.clone()
    }

    /// Mark this shape as removed. Removal is permanent.
    pub(crate) fn mark_removed(&self) {
        self.removed.mark_removed();
    }

    /// Fail with `Removed` if this shape is no longer live.
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.removed.is_removed() {
            return Err(ModelError::Removed(format!(
                "'{}' (id {})",
                self.name, self.id
            )));
        }
        Ok(())
    }

    /// Check if this shape kind carries a fill.
    #[inline]
    pub fn has_fill(&self) -> bool {
        matches!(self.kind, ShapeKind::AutoShape | ShapeKind::Picture)
    }

    /// Check if this shape kind carries a text frame.
    #[inline]
    pub fn has_text_frame(&self) -> bool {
        self.kind == ShapeKind::AutoShape
    }

    /// Check if this shape is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        let mut reader = Reader::from_reader(&self.xml[..]);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"ph" {
                        return true;
                    }
                },
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {},
            }
        }

        false
    }

    /// Get the shape's fill, derived from its `spPr` element on first access.
    ///
    /// Returns `None` for shape kinds that carry no fill.
    pub fn fill(&mut self) -> Result<Option<&mut ShapeFill>> {
        self.ensure_live()?;
        if !self.has_fill() {
            return Ok(None);
        }
        if !self.fill.is_cached() {
            let props = markup::first_subtree(&self.xml, b"spPr")?.unwrap_or_default();
            let fill =
                ShapeFill::from_properties(self.scope.clone(), self.removed.clone(), &props)?;
            self.fill.get_or_insert_with(|| fill);
        }
        Ok(self.fill.get_mut())
    }

    /// Get the shape's text frame.
    ///
    /// On first access the backing text body is inspected; a frame is
    /// constructed only if at least one run holds non-empty text. The result
    /// of that first check sticks: a body that was empty stays reported as
    /// absent even if the markup later gains text through another path.
    pub fn text_frame(&mut self) -> Result<Option<&TextFrame>> {
        self.ensure_live()?;
        if !self.has_text_frame() {
            return Ok(None);
        }
        if !self.text_frame.is_cached() {
            let frame = match markup::first_subtree(&self.xml, b"txBody")? {
                Some(body) if TextFrame::body_has_content(&body)? => {
                    Some(TextFrame::new(body))
                },
                _ => None,
            };
            self.text_frame.get_or_insert_with(|| frame);
        }
        Ok(self.text_frame.get().and_then(|frame| frame.as_ref()))
    }

    /// Extract the shape's text content, if it has a text frame.
    pub fn text(&mut self) -> Result<Option<String>> {
        match self.text_frame()? {
            Some(frame) => Ok(Some(frame.text()?)),
            None => Ok(None),
        }
    }

    /// Get the shapes nested in a group shape, in render order.
    ///
    /// Returns `None` for shapes that are not groups. The returned nodes are
    /// independent views over the group's markup; a directly nested group
    /// stays one node and can be unpacked the same way.
    pub fn group_shapes(&self) -> Result<Option<Vec<ShapeNode>>> {
        self.ensure_live()?;
        if self.kind != ShapeKind::Group {
            return Ok(None);
        }
        let mut children = Vec::new();
        for subtree in markup::child_subtrees(&self.xml, crate::shapes::SHAPE_ELEMENTS)? {
            children.push(ShapeNode::from_markup(self.scope.clone(), subtree)?);
        }
        Ok(Some(children))
    }

    /// Get a picture view over this shape.
    ///
    /// Returns `None` for shapes that are not pictures.
    pub fn picture(&self) -> Result<Option<Picture>> {
        self.ensure_live()?;
        Picture::from_node(self)
    }

    /// Get the table carried by this shape.
    ///
    /// Returns `None` for shapes that are not tables.
    pub fn table(&self) -> Result<Option<Table>> {
        self.ensure_live()?;
        Table::from_node(self)
    }

    /// Get the X position (left edge) in EMUs.
    pub fn left(&mut self) -> Result<i64> {
        self.ensure_geometry()?;
        Ok(self.geometry.get().unwrap().x)
    }

    /// Get the Y position (top edge) in EMUs.
    pub fn top(&mut self) -> Result<i64> {
        self.ensure_geometry()?;
        Ok(self.geometry.get().unwrap().y)
    }

    /// Get the width in EMUs.
    pub fn width(&mut self) -> Result<i64> {
        self.ensure_geometry()?;
        Ok(self.geometry.get().unwrap().cx)
    }

    /// Get the height in EMUs.
    pub fn height(&mut self) -> Result<i64> {
        self.ensure_geometry()?;
        Ok(self.geometry.get().unwrap().cy)
    }

    /// Replace the backing markup subtree of this shape.
    ///
    /// Structurally replaced backing data invalidates the derived fill and
    /// geometry views; they recompute on next access. The text-frame check is
    /// one-shot and is not re-run (see [`ShapeNode::text_frame`]). Identity
    /// (id, name, kind) is kept.
    pub fn replace_markup(&mut self, xml: Vec<u8>) -> Result<()> {
        self.ensure_live()?;
        self.xml = xml;
        self.fill.reset();
        self.geometry.reset();
        Ok(())
    }

    /// Ensure geometry is parsed and cached.
    fn ensure_geometry(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.geometry.is_cached() {
            return Ok(());
        }

        let mut reader = Reader::from_reader(&self.xml[..]);
        reader.config_mut().trim_text(true);

        let mut geometry = ShapeGeometry {
            x: 0,
            y: 0,
            cx: 0,
            cy: 0,
        };

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let tag_name = e.local_name();

                    if tag_name.as_ref() == b"off" {
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"x" => {
                                    geometry.x =
                                        atoi_simd::parse::<i64, false, false>(&attr.value).unwrap_or(0);
                                },
                                b"y" => {
                                    geometry.y =
                                        atoi_simd::parse::<i64, false, false>(&attr.value).unwrap_or(0);
                                },
                                _ => {},
                            }
                        }
                    } else if tag_name.as_ref() == b"ext" {
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"cx" => {
                                    geometry.cx =
                                        atoi_simd::parse::<i64, false, false>(&attr.value).unwrap_or(0);
                                },
                                b"cy" => {
                                    geometry.cy =
                                        atoi_simd::parse::<i64, false, false>(&attr.value).unwrap_or(0);
                                },
                                _ => {},
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {},
            }
        }

        self.geometry.get_or_insert_with(|| geometry);
        Ok(())
    }
}

/// Determine the shape kind from the root element of a subtree.
fn detect_kind(xml: &[u8]) -> Result<ShapeKind> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(match e.local_name().as_ref() {
                    b"sp" => ShapeKind::AutoShape,
                    b"pic" => ShapeKind::Picture,
                    b"graphicFrame" => {
                        if memmem::find(xml, b"a:tbl").is_some() {
                            ShapeKind::Table
                        } else {
                            ShapeKind::Unknown
                        }
                    },
                    b"grpSp" => ShapeKind::Group,
                    b"cxnSp" => ShapeKind::Connector,
                    _ => ShapeKind::Unknown,
                });
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(ShapeKind::Unknown)
}

/// Parse the numeric id and name from the first `cNvPr` element.
fn parse_identity(xml: &[u8]) -> Result<(u32, String)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"cNvPr" {
                    let mut id = 0u32;
                    let mut name = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"id" => {
                                id = atoi_simd::parse::<u32, false, false>(&attr.value).unwrap_or(0);
                            },
                            b"name" => {
                                name = String::from_utf8_lossy(&attr.value).into_owned();
                            },
                            _ => {},
                        }
                    }
                    return Ok((id, name));
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok((0, String::new()))
}
