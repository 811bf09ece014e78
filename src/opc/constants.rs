/// Constant values related to the packaging conventions this model sits on.
///
/// This module contains content type URIs (like MIME-types) that specify a
/// part's format, XML namespaces, and relationship types.

/// Content type URIs (like MIME-types) that specify a part's format
pub mod content_type {
    // Image content types
    pub const BMP: &str = "image/bmp";
    pub const GIF: &str = "image/gif";
    pub const JPEG: &str = "image/jpeg";
    pub const PNG: &str = "image/png";
    pub const SVG: &str = "image/svg+xml";
    pub const TIFF: &str = "image/tiff";

    // PresentationML content types
    pub const PML_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

    // Generic XML
    pub const XML: &str = "application/xml";
}

/// XML namespace URIs used in presentation markup
pub mod namespace {
    /// DrawingML main namespace (the `a:` prefix)
    pub const DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Office relationships namespace (the `r:` prefix)
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// PresentationML namespace (the `p:` prefix)
    pub const PRESENTATIONML: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";
}

/// Relationship type URIs
pub mod relationship_type {
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}

/// Get the conventional filename extension for a content type.
///
/// Used when choosing a partname for a newly allocated media part. Falls back
/// to "bin" for content types without a conventional extension.
pub fn default_extension(content_type: &str) -> &'static str {
    match content_type {
        content_type::BMP => "bmp",
        content_type::GIF => "gif",
        content_type::JPEG => "jpg",
        content_type::PNG => "png",
        content_type::SVG => "svg",
        content_type::TIFF => "tiff",
        content_type::XML => "xml",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension() {
        assert_eq!(default_extension(content_type::PNG), "png");
        assert_eq!(default_extension(content_type::JPEG), "jpg");
        assert_eq!(default_extension("application/octet-stream"), "bin");
    }
}
