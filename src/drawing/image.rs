/// Image resources reached through slide relationships.
use crate::error::{ModelError, Result};
use crate::opc::{PackUri, Package};
use crate::shared::{Memo, RemovalFlag};
use std::sync::Arc;

/// One owner's view of an image part, addressed by `(scope, rId)`.
///
/// Several owners across the package may reference the same part. Reads are
/// memoized; writes honor the copy-on-write contract: writing through a
/// shared owner forks the part first, so the bytes observable by every other
/// owner never change.
///
/// # Examples
///
/// ```rust,ignore
/// let mut image = picture.into_image();
/// let bytes = image.read(&pkg)?;
/// image.write(&mut pkg, &new_bytes)?;
/// ```
#[derive(Debug)]
pub struct SlideImage {
    /// Partname of the part that owns the relationship
    scope: PackUri,
    /// The owner's relationship id for the image part
    r_id: String,
    /// Removal token of the owning shape
    owner: RemovalFlag,
    /// Memoized payload; cleared by every write
    cache: Memo<Arc<Vec<u8>>>,
}

impl SlideImage {
    /// Create an image view over an existing relationship.
    pub(crate) fn new(scope: PackUri, r_id: String, owner: RemovalFlag) -> Self {
        Self {
            scope,
            r_id,
            owner,
            cache: Memo::new(),
        }
    }

    /// Get the relationship id this view resolves through.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the partname of the backing image part.
    pub fn partname(&self, pkg: &Package) -> Result<PackUri> {
        Ok(pkg.target_of(&self.scope, &self.r_id)?)
    }

    /// Get the content type (MIME) of the backing image part.
    pub fn content_type(&self, pkg: &Package) -> Result<String> {
        Ok(pkg
            .part_by_rid(&self.scope, &self.r_id)?
            .content_type()
            .to_string())
    }

    /// Get the image bytes.
    ///
    /// The first call resolves the backing part and caches its payload;
    /// later calls return the cached bytes until the next `write`.
    pub fn read(&mut self, pkg: &Package) -> Result<Arc<Vec<u8>>> {
        if let Some(bytes) = self.cache.get() {
            return Ok(Arc::clone(bytes));
        }
        let bytes = pkg.part_by_rid(&self.scope, &self.r_id)?.blob_arc();
        Ok(Arc::clone(self.cache.get_or_insert_with(|| bytes)))
    }

    /// Replace the image bytes observable through this owner.
    ///
    /// Sharing is decided from the current relationship census, never from a
    /// cached one. When the backing part is referenced by more than one
    /// relationship anywhere in the package, the part is forked first: a new
    /// part with the same content type is allocated and this owner's
    /// relationship is rebound to it, leaving every other owner on the
    /// original part with its original bytes. A sole owner writes in place.
    ///
    /// The read cache is cleared before returning, so a subsequent `read`
    /// sees the new bytes.
    pub fn write(&mut self, pkg: &mut Package, bytes: &[u8]) -> Result<()> {
        if self.owner.is_removed() {
            return Err(ModelError::InvalidState(
                "cannot set image on a removed shape".to_string(),
            ));
        }

        let target = pkg.target_of(&self.scope, &self.r_id)?;
        if pkg.ref_count(&target) > 1 {
            let content_type = pkg.get_part(&target)?.content_type().to_string();
            let forked = pkg.allocate_part(&content_type)?;
            pkg.rebind(&self.scope, &self.r_id, &forked)?;
            pkg.get_part_mut(&forked)?.set_blob(bytes.to_vec());
        } else {
            pkg.get_part_mut(&target)?.set_blob(bytes.to_vec());
        }

        self.cache.reset();
        Ok(())
    }
}
