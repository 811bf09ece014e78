/// Text frame for accessing text content in shapes and table cells.
use crate::error::{ModelError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// A text frame containing text content.
///
/// Text frames are derived from a `txBody` element and provide access to the
/// paragraphs and text within it. A frame is only constructed for a body
/// that actually carries run text; see [`TextFrame::body_has_content`].
///
/// # Examples
///
/// ```rust,ignore
/// if let Some(frame) = cell.text_frame()? {
///     println!("Cell text: {}", frame.text()?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TextFrame {
    /// Raw XML bytes of the text body
    xml: Vec<u8>,
}

impl TextFrame {
    /// Create a TextFrame over a text body subtree.
    pub(crate) fn new(xml: Vec<u8>) -> Self {
        Self { xml }
    }

    /// Check whether a text body has any run-level content.
    ///
    /// True when at least one `a:t` element inside an `a:r` run holds
    /// non-empty text. Paragraph properties, line breaks, and empty runs do
    /// not count.
    pub(crate) fn body_has_content(xml: &[u8]) -> Result<bool> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut run_depth = 0usize;
        let mut in_text = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"r" => run_depth += 1,
                    b"t" if run_depth > 0 => in_text = true,
                    _ => {},
                },
                Ok(Event::Text(e)) if in_text => {
                    if !e.as_ref().is_empty() {
                        return Ok(true);
                    }
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(ModelError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(false)
    }

    /// Extract all text from this text frame.
    ///
    /// Paragraphs are joined with newlines.
    pub fn text(&self) -> Result<String> {
        let mut text = String::new();
        for (i, para) in self.paragraphs()?.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(&para.text()?);
        }
        Ok(text)
    }

    /// Get the paragraphs in this text frame.
    pub fn paragraphs(&self) -> Result<Vec<Paragraph>> {
        Ok(crate::markup::subtrees(&self.xml, &[b"p"])?
            .into_iter()
            .map(Paragraph::new)
            .collect())
    }

}

/// A paragraph in a text frame.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Raw XML bytes for this paragraph
    xml: Vec<u8>,
}

impl Paragraph {
    /// Create a new Paragraph from XML bytes.
    pub(crate) fn new(xml: Vec<u8>) -> Self {
        Self { xml }
    }

    /// Extract all text from this paragraph.
    pub fn text(&self) -> Result<String> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        reader.config_mut().trim_text(true);

        let mut text = String::new();
        let mut in_text_element = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text_element = true;
                    }
                },
                Ok(Event::Text(e)) if in_text_element => {
                    let t = std::str::from_utf8(e.as_ref())
                        .map_err(|e| ModelError::Xml(e.to_string()))?;
                    text.push_str(t);
                },
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text_element = false;
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(ModelError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"<p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>Hello</a:t></a:r></a:p><a:p><a:r><a:t>World</a:t></a:r></a:p></p:txBody>"#;

    #[test]
    fn test_text_joins_paragraphs() {
        let frame = TextFrame::new(BODY.to_vec());
        assert_eq!(frame.text().unwrap(), "Hello\nWorld");
        assert_eq!(frame.paragraphs().unwrap().len(), 2);
    }

    #[test]
    fn test_body_with_run_text_has_content() {
        assert!(TextFrame::body_has_content(BODY).unwrap());
    }

    #[test]
    fn test_empty_body_has_no_content() {
        let body = br#"<p:txBody><a:bodyPr/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>"#;
        assert!(!TextFrame::body_has_content(body).unwrap());
    }

    #[test]
    fn test_text_outside_runs_does_not_count() {
        // An a:t only counts inside an a:r run; a field's own a:t does not
        // make the body a text frame candidate on its own.
        let body = br#"<p:txBody><a:p><a:fld id="{1}"><a:t>1</a:t></a:fld></a:p></p:txBody>"#;
        assert!(!TextFrame::body_has_content(body).unwrap());
    }

    #[test]
    fn test_empty_run_text_does_not_count() {
        let body = br#"<p:txBody><a:p><a:r><a:t></a:t></a:r></a:p></p:txBody>"#;
        assert!(!TextFrame::body_has_content(body).unwrap());
    }
}
