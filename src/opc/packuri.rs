/// Provides the PackUri value type for addressing parts within a package.
///
/// A PackUri is a part name: it always begins with a forward slash and uses
/// forward slashes as path separators. It gives access to components like the
/// base URI (directory), filename, and extension.
use std::fmt;

/// A part name within a presentation package (e.g., "/ppt/slides/slide1.xml").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackUri {
    /// The full pack URI string
    uri: String,
}

impl PackUri {
    /// Create a new PackUri from a string.
    ///
    /// # Arguments
    /// * `uri` - The URI string, which must begin with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackUri must begin with slash, got '{}'", uri));
        }
        Ok(PackUri { uri })
    }

    /// Get the URI as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Get the base URI (directory portion) of this PackUri.
    ///
    /// For example, "/ppt/media" for "/ppt/media/image1.png".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackUri.
    ///
    /// For example, "slide1.xml" for "/ppt/slides/slide1.xml".
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the extension portion of this PackUri, without the leading period.
    ///
    /// For example, "png" for "/ppt/media/image1.png".
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Get the partname index for tuple partnames, or None for singletons.
    ///
    /// For example, returns 21 for "/ppt/slides/slide21.xml" and None for
    /// "/ppt/presentation.xml".
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let name_part = match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        };

        let digits_at = name_part
            .bytes()
            .rposition(|b| !b.is_ascii_digit())
            .map(|pos| pos + 1)?;
        if digits_at >= name_part.len() {
            return None;
        }
        atoi_simd::parse::<u32, false, false>(&name_part.as_bytes()[digits_at..]).ok()
    }
}

impl fmt::Display for PackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_leading_slash() {
        assert!(PackUri::new("/ppt/slides/slide1.xml").is_ok());
        assert!(PackUri::new("ppt/slides/slide1.xml").is_err());
    }

    #[test]
    fn test_components() {
        let uri = PackUri::new("/ppt/media/image12.png").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/media");
        assert_eq!(uri.filename(), "image12.png");
        assert_eq!(uri.ext(), "png");
        assert_eq!(uri.idx(), Some(12));
    }

    #[test]
    fn test_singleton_has_no_idx() {
        let uri = PackUri::new("/ppt/presentation.xml").unwrap();
        assert_eq!(uri.idx(), None);
    }

    #[test]
    fn test_root_level_part() {
        let uri = PackUri::new("/thumbnail.jpeg").unwrap();
        assert_eq!(uri.base_uri(), "/");
        assert_eq!(uri.filename(), "thumbnail.jpeg");
        assert_eq!(uri.ext(), "jpeg");
    }
}
