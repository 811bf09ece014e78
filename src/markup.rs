//! Crate-internal helpers for cutting subtrees out of slide markup.
//!
//! The object model keeps each shape, table row, cell, and text body as an
//! owned byte subtree cut from its parent part. Extraction re-serializes
//! events with their attributes intact, so a cut subtree can be parsed again
//! (and cloned) without the surrounding document. Matching is by local name;
//! prefixes are preserved in the output but never inspected.

use crate::error::{ModelError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Re-serialize a start or empty tag with its attributes.
fn push_tag(out: &mut Vec<u8>, e: &BytesStart, empty: bool) {
    out.push(b'<');
    out.extend_from_slice(e.name().as_ref());
    for attr in e.attributes().flatten() {
        out.push(b' ');
        out.extend_from_slice(attr.key.as_ref());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(&attr.value);
        out.push(b'"');
    }
    if empty {
        out.extend_from_slice(b"/>");
    } else {
        out.push(b'>');
    }
}

/// Extract every non-overlapping subtree whose root local name is in `targets`.
///
/// Subtrees are returned in document order. A match inside an already
/// captured subtree is not reported separately; it stays part of the outer
/// capture.
pub(crate) fn subtrees(xml: &[u8], targets: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
    collect_subtrees(xml, targets, false)
}

/// Like [`subtrees`], but the document's root element is never a candidate.
///
/// Needed when the container's own local name is in `targets` (a group shape
/// holding nested shapes).
pub(crate) fn child_subtrees(xml: &[u8], targets: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
    collect_subtrees(xml, targets, true)
}

fn collect_subtrees(xml: &[u8], targets: &[&[u8]], skip_root: bool) -> Result<Vec<Vec<u8>>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut found = Vec::new();
    let mut current = Vec::new();
    let mut capturing = false;
    let mut depth = 0usize;
    let mut root_pending = skip_root;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if root_pending {
                    root_pending = false;
                } else if capturing {
                    depth += 1;
                    push_tag(&mut current, &e, false);
                } else if targets.iter().any(|t| e.local_name().as_ref() == *t) {
                    capturing = true;
                    depth = 1;
                    current.clear();
                    push_tag(&mut current, &e, false);
                }
            },
            Ok(Event::Empty(e)) => {
                if root_pending {
                    // An empty root has no children.
                    root_pending = false;
                } else if capturing {
                    push_tag(&mut current, &e, true);
                } else if targets.iter().any(|t| e.local_name().as_ref() == *t) {
                    let mut single = Vec::new();
                    push_tag(&mut single, &e, true);
                    found.push(single);
                }
            },
            Ok(Event::End(e)) => {
                if capturing {
                    current.extend_from_slice(b"</");
                    current.extend_from_slice(e.name().as_ref());
                    current.push(b'>');

                    depth -= 1;
                    if depth == 0 {
                        found.push(current.clone());
                        capturing = false;
                    }
                }
            },
            Ok(Event::Text(e)) if capturing => {
                current.extend_from_slice(e.as_ref());
            },
            Ok(Event::CData(e)) if capturing => {
                current.extend_from_slice(b"<![CDATA[");
                current.extend_from_slice(e.as_ref());
                current.extend_from_slice(b"]]>");
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(found)
}

/// Extract the first subtree whose root local name matches `target`.
pub(crate) fn first_subtree(xml: &[u8], target: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(subtrees(xml, &[target])?.into_iter().next())
}

/// Get the `r:embed` attribute of the first element with the given local name.
///
/// Used to find the image relationship of a `blip` or `svgBlip` element.
pub(crate) fn first_embed_rid(xml: &[u8], element: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == element {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"embed" {
                            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(None)
}

/// Collect every distinct `r:embed` relationship id in a subtree, in document
/// order.
pub(crate) fn all_embed_rids(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut rids: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"embed" {
                        let rid = String::from_utf8_lossy(&attr.value).into_owned();
                        if !rids.contains(&rid) {
                            rids.push(rid);
                        }
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(rids)
}
