use crate::opc::packuri::PackUri;
use crate::opc::rel::Relationships;
/// Objects related to package parts.
///
/// Parts are the fundamental units of content in a package. Each part has a
/// unique partname (PackUri), a content type, a payload of raw bytes (XML
/// markup or binary data), and may have relationships to other parts.
use std::sync::Arc;

/// A part in a presentation package.
///
/// The payload is held behind an `Arc` so that memoized readers can share it
/// without copying; replacing the payload swaps the `Arc` and leaves earlier
/// snapshots untouched.
#[derive(Debug)]
pub struct Part {
    /// The partname (URI) of this part
    partname: PackUri,

    /// The content type of this part
    content_type: String,

    /// The payload of this part (shared via Arc for efficiency)
    blob: Arc<Vec<u8>>,

    /// Relationships from this part to other parts
    rels: Relationships,
}

impl Part {
    /// Create a new part.
    ///
    /// # Arguments
    /// * `partname` - The partname (URI) of this part
    /// * `content_type` - The content type of this part
    /// * `blob` - The payload of this part
    pub fn new<S: Into<String>>(partname: PackUri, content_type: S, blob: Vec<u8>) -> Self {
        Self {
            partname,
            content_type: content_type.into(),
            blob: Arc::new(blob),
            rels: Relationships::new(),
        }
    }

    /// Get the partname of this part.
    #[inline]
    pub fn partname(&self) -> &PackUri {
        &self.partname
    }

    /// Get the content type of this part.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Get the payload of this part.
    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Get a shared handle to the payload of this part.
    ///
    /// The handle stays valid (with the bytes it was taken with) even if the
    /// part's payload is later replaced.
    #[inline]
    pub fn blob_arc(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.blob)
    }

    /// Replace the payload of this part in place.
    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = Arc::new(blob);
    }

    /// Check if this part holds XML content, based on its content type.
    #[inline]
    pub fn is_xml(&self) -> bool {
        self.content_type.ends_with("+xml") || self.content_type.ends_with("/xml")
    }

    /// Get the relationships for this part.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Get mutable access to the relationships for this part.
    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::constants::content_type;

    #[test]
    fn test_binary_part() {
        let partname = PackUri::new("/ppt/media/image1.png").unwrap();
        let content = vec![0x89, 0x50, 0x4E, 0x47]; // PNG header
        let part = Part::new(partname, content_type::PNG, content.clone());

        assert_eq!(part.content_type(), "image/png");
        assert_eq!(part.blob(), content.as_slice());
        assert!(!part.is_xml());
    }

    #[test]
    fn test_xml_part() {
        let partname = PackUri::new("/ppt/slides/slide1.xml").unwrap();
        let part = Part::new(partname, content_type::PML_SLIDE, b"<p:sld/>".to_vec());
        assert!(part.is_xml());
    }

    #[test]
    fn test_set_blob_leaves_snapshots_untouched() {
        let partname = PackUri::new("/ppt/media/image1.png").unwrap();
        let mut part = Part::new(partname, content_type::PNG, b"old".to_vec());

        let snapshot = part.blob_arc();
        part.set_blob(b"new".to_vec());

        assert_eq!(snapshot.as_slice(), b"old");
        assert_eq!(part.blob(), b"new");
    }
}
