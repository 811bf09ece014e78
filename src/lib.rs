//! Quince - an in-memory object model for PowerPoint presentations
//!
//! This library maps a presentation package - XML part trees and binary
//! blobs connected by relationship ids - into a navigable, mutable graph of
//! shapes, fills, tables, and text frames, while keeping the package's
//! relationship graph consistent under edits.
//!
//! # Features
//!
//! - **Part store**: relationship-scoped addressing, part allocation with
//!   collision-free ids, and relationship rebinding
//! - **Copy-on-write images**: writing through one owner of a shared image
//!   part never changes the bytes another owner reads
//! - **Lazy derived views**: fills, text frames, and table grids are
//!   computed from the backing markup on first access
//! - **Structural cloning**: duplicated shapes share nothing with their
//!   source
//!
//! # Example - Walking a slide's shapes
//!
//! ```
//! use quince::opc::constants::content_type;
//! use quince::{PackUri, Package, Part, ShapeTree};
//!
//! # fn main() -> quince::Result<()> {
//! let slide = PackUri::new("/ppt/slides/slide1.xml").expect("valid partname");
//! let markup = br#"<p:sld><p:cSld><p:spTree>
//!     <p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/>
//!     <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/></p:nvSpPr>
//!     <p:txBody><a:p><a:r><a:t>Hello</a:t></a:r></a:p></p:txBody></p:sp>
//! </p:spTree></p:cSld></p:sld>"#;
//!
//! let mut pkg = Package::new();
//! pkg.add_part(Part::new(slide.clone(), content_type::PML_SLIDE, markup.to_vec()));
//!
//! let mut tree = ShapeTree::from_slide(&pkg, &slide)?;
//! for shape in tree.enumerate() {
//!     println!("{} ({:?})", shape.name(), shape.kind());
//! }
//!
//! let title = tree.find_by_name("Title 1").expect("present").id();
//! let text = tree.node_mut(title)?.text()?;
//! assert_eq!(text.as_deref(), Some("Hello"));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Setting a picture's image
//!
//! ```no_run
//! use quince::{PackUri, Package, ShapeTree};
//!
//! # fn main() -> quince::Result<()> {
//! # let mut pkg = Package::new();
//! let slide = PackUri::new("/ppt/slides/slide1.xml").expect("valid partname");
//! let mut tree = ShapeTree::from_slide(&pkg, &slide)?;
//!
//! let id = tree.enumerate().next().expect("a shape").id();
//! if let Some(mut picture) = tree.node_mut(id)?.picture()? {
//!     // A shared image part is forked automatically; other owners keep
//!     // reading their original bytes.
//!     picture.image().write(&mut pkg, &std::fs::read("logo.png")?)?;
//! }
//! # Ok(())
//! # }
//! ```

/// Error types for the object-model layer
pub mod error;

/// Part store: parts, partnames, and relationships
pub mod opc;

/// Shared building blocks: memoization cells and removal tokens
pub mod shared;

/// Drawing-layer resources: images and fills
pub mod drawing;

/// Shape object model: trees, nodes, pictures, tables, text frames
pub mod shapes;

mod markup;

// Re-export commonly used types for convenience
pub use drawing::{FillKind, FillType, ShapeFill, SlideImage};
pub use error::{ModelError, Result};
pub use opc::{PackUri, Package, Part};
pub use shapes::{
    Paragraph, Picture, ShapeId, ShapeKind, ShapeNode, ShapeTree, Table, TableCell, TableRow,
    TextFrame,
};
