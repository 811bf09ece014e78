/// Structural cloning of shape subtrees.
///
/// A clone is a deep copy: the markup subtree is duplicated with a fresh id
/// and a collision-free name, and every embedded binary resource is forked
/// into a freshly allocated part in the destination scope. Forking happens
/// unconditionally, so a clone never shares a part with its source or with
/// any other existing owner.
use crate::error::Result;
use crate::markup;
use crate::opc::{PackUri, Package};
use crate::shapes::base::ShapeNode;
use crate::shapes::tree::ShapeTree;
use memchr::memmem;

/// Deep-copy a shape subtree for insertion into `target`.
///
/// The caller appends the returned node; this function only builds it and
/// allocates the forked parts.
pub(crate) fn clone_shape(
    pkg: &mut Package,
    source_scope: &PackUri,
    source_xml: &[u8],
    source_name: &str,
    target: &ShapeTree,
) -> Result<ShapeNode> {
    let id = target.next_shape_id();
    let name = free_name(source_name, target);

    let xml = rewrite_identity(source_xml.to_vec(), id, &name);
    let xml = fork_embedded_parts(pkg, source_scope, target.scope(), xml)?;

    ShapeNode::from_markup(target.scope().clone(), xml)
}

/// Pick a shape name that collides with no name in the target tree.
fn free_name(base: &str, target: &ShapeTree) -> String {
    if !target.contains_name(base) {
        return base.to_string();
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{} {}", base, n);
        if !target.contains_name(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Fork every embedded resource referenced from the subtree.
///
/// For each distinct `r:embed` relationship id (the shape's own blip and any
/// descendant's, e.g. pictures inside a group): resolve the part in the
/// source scope, copy its bytes into a freshly allocated part related to the
/// target scope, and rewrite the copy's embed attributes to the fresh id.
fn fork_embedded_parts(
    pkg: &mut Package,
    source_scope: &PackUri,
    target_scope: &PackUri,
    mut xml: Vec<u8>,
) -> Result<Vec<u8>> {
    for r_id in markup::all_embed_rids(&xml)? {
        let source_part = pkg.part_by_rid(source_scope, &r_id)?;
        let content_type = source_part.content_type().to_string();
        let bytes = source_part.blob_arc();

        let (partname, new_rid) = pkg.allocate_related(target_scope, &content_type)?;
        pkg.get_part_mut(&partname)?.set_blob(bytes.to_vec());

        let old_attr = format!(r#"embed="{}""#, r_id);
        let new_attr = format!(r#"embed="{}""#, new_rid);
        xml = replace_all(&xml, old_attr.as_bytes(), new_attr.as_bytes());
    }
    Ok(xml)
}

/// Set the id and name attributes of the subtree's first `cNvPr` element.
fn rewrite_identity(xml: Vec<u8>, id: u32, name: &str) -> Vec<u8> {
    let Some(tag_pos) = memmem::find(&xml, b"cNvPr") else {
        return xml;
    };
    // The id replacement leaves everything before the tag name untouched, so
    // the tag position stays valid for the name replacement.
    let xml = replace_attr_in_tag(xml, tag_pos, b"id", id.to_string().as_bytes());
    replace_attr_in_tag(xml, tag_pos, b"name", name.as_bytes())
}

/// Replace the value of an attribute within the tag starting at `tag_pos`.
fn replace_attr_in_tag(xml: Vec<u8>, tag_pos: usize, attr: &[u8], value: &[u8]) -> Vec<u8> {
    let Some(end_off) = xml[tag_pos..].iter().position(|&b| b == b'>') else {
        return xml;
    };
    let tag_end = tag_pos + end_off;

    let mut pattern = Vec::with_capacity(attr.len() + 3);
    pattern.push(b' ');
    pattern.extend_from_slice(attr);
    pattern.extend_from_slice(b"=\"");

    let Some(rel_pos) = memmem::find(&xml[tag_pos..tag_end], &pattern) else {
        return xml;
    };
    let value_start = tag_pos + rel_pos + pattern.len();
    let Some(quote_off) = xml[value_start..tag_end].iter().position(|&b| b == b'"') else {
        return xml;
    };
    let value_end = value_start + quote_off;

    let mut out = Vec::with_capacity(xml.len() - (value_end - value_start) + value.len());
    out.extend_from_slice(&xml[..value_start]);
    out.extend_from_slice(value);
    out.extend_from_slice(&xml[value_end..]);
    out
}

/// Replace every occurrence of `needle` in `haystack`.
fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut last = 0;
    for pos in memmem::find_iter(haystack, needle) {
        out.extend_from_slice(&haystack[last..pos]);
        out.extend_from_slice(replacement);
        last = pos + needle.len();
    }
    out.extend_from_slice(&haystack[last..]);
    out
}
