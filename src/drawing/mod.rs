//! Drawing-layer resources: images and fills.
//!
//! Images are shared resources: several owners across the package may
//! reference the same image part, and writes through one owner must never
//! change the bytes observable by another. Fills are the tagged variant
//! shapes and table cells expose for their background.

pub mod fill;
pub mod image;

pub use fill::{FillKind, FillType, ShapeFill};
pub use image::SlideImage;
