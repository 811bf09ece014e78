/// Table shape implementation.
use crate::drawing::ShapeFill;
use crate::error::{ModelError, Result};
use crate::markup;
use crate::opc::PackUri;
use crate::shapes::base::{ShapeKind, ShapeNode};
use crate::shapes::textframe::TextFrame;
use crate::shared::{Memo, RemovalFlag};
use quick_xml::Reader;
use quick_xml::events::Event;

/// A table carried by a graphic-frame shape.
///
/// The grid is extracted from the `a:tbl` subtree up front: rows contain
/// cells, and each cell derives its text frame and fill lazily from its own
/// markup.
///
/// # Examples
///
/// ```rust,ignore
/// if let Some(mut table) = node.table()? {
///     for row in table.rows_mut() {
///         for cell in row.cells_mut() {
///             println!("merged: {}", cell.is_merged());
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Table {
    rows: Vec<TableRow>,
}

impl Table {
    /// Build a table view over a shape node.
    ///
    /// Returns `None` for nodes that are not tables.
    pub(crate) fn from_node(node: &ShapeNode) -> Result<Option<Self>> {
        if node.kind() != ShapeKind::Table {
            return Ok(None);
        }
        let tbl = markup::first_subtree(node.xml(), b"tbl")?
            .ok_or_else(|| ModelError::Xml("table not found in graphic frame".to_string()))?;

        let mut rows = Vec::new();
        for (row_idx, row_xml) in markup::subtrees(&tbl, &[b"tr"])?.into_iter().enumerate() {
            let mut cells = Vec::new();
            for (col_idx, cell_xml) in
                markup::subtrees(&row_xml, &[b"tc"])?.into_iter().enumerate()
            {
                cells.push(TableCell::new(
                    row_idx,
                    col_idx,
                    cell_xml,
                    node.scope().clone(),
                    node.removal_flag(),
                )?);
            }
            rows.push(TableRow { cells });
        }

        Ok(Some(Self { rows }))
    }

    /// Get the number of rows in the table.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns in the table.
    ///
    /// Returns the number of cells in the first row, or 0 for an empty table.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.cell_count())
    }

    /// Get all rows in the table.
    #[inline]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Get mutable access to all rows in the table.
    #[inline]
    pub fn rows_mut(&mut self) -> &mut [TableRow] {
        &mut self.rows
    }

    /// Get a specific cell by row and column index.
    ///
    /// Indices are zero-based. Returns `None` when out of bounds.
    pub fn cell(&self, row_idx: usize, col_idx: usize) -> Option<&TableCell> {
        self.rows.get(row_idx).and_then(|row| row.cells.get(col_idx))
    }

    /// Get mutable access to a specific cell by row and column index.
    pub fn cell_mut(&mut self, row_idx: usize, col_idx: usize) -> Option<&mut TableCell> {
        self.rows
            .get_mut(row_idx)
            .and_then(|row| row.cells.get_mut(col_idx))
    }
}

/// A row in a table.
#[derive(Debug)]
pub struct TableRow {
    cells: Vec<TableCell>,
}

impl TableRow {
    /// Get the number of cells in this row.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get all cells in this row.
    #[inline]
    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    /// Get mutable access to all cells in this row.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [TableCell] {
        &mut self.cells
    }
}

/// A cell in a table.
///
/// Carries its raw merge-span attributes, parsed from the cell's own `a:tc`
/// element, and derives its text frame and fill lazily.
#[derive(Debug)]
pub struct TableCell {
    /// Zero-based row index
    row: usize,
    /// Zero-based column index
    col: usize,
    /// Raw XML bytes for this cell
    xml: Vec<u8>,
    /// gridSpan attribute (columns covered by a horizontal merge origin)
    grid_span: Option<u32>,
    /// rowSpan attribute (rows covered by a vertical merge origin)
    row_span: Option<u32>,
    /// hMerge marker (continuation of a horizontal merge)
    h_merge: bool,
    /// vMerge marker (continuation of a vertical merge)
    v_merge: bool,
    /// Partname of the slide part the cell's relationships resolve in
    scope: PackUri,
    /// Removal token of the owning table shape
    owner: RemovalFlag,
    /// Lazily derived text frame; a cached `None` is permanent
    text_frame: Memo<Option<TextFrame>>,
    /// Lazily derived fill
    fill: Memo<ShapeFill>,
}

impl TableCell {
    /// Build a cell from its markup subtree.
    pub(crate) fn new(
        row: usize,
        col: usize,
        xml: Vec<u8>,
        scope: PackUri,
        owner: RemovalFlag,
    ) -> Result<Self> {
        let (grid_span, row_span, h_merge, v_merge) = parse_span_attrs(&xml)?;
        Ok(Self {
            row,
            col,
            xml,
            grid_span,
            row_span,
            h_merge,
            v_merge,
            scope,
            owner,
            text_frame: Memo::new(),
            fill: Memo::new(),
        })
    }

    /// Get the zero-based row index.
    #[inline]
    pub fn row_index(&self) -> usize {
        self.row
    }

    /// Get the zero-based column index.
    #[inline]
    pub fn column_index(&self) -> usize {
        self.col
    }

    /// Get the gridSpan attribute, if present.
    #[inline]
    pub fn grid_span(&self) -> Option<u32> {
        self.grid_span
    }

    /// Get the rowSpan attribute, if present.
    #[inline]
    pub fn row_span(&self) -> Option<u32> {
        self.row_span
    }

    /// Check whether this cell belongs to a merged region.
    ///
    /// A pure function of the cell's own raw attributes: true iff any of
    /// gridSpan, rowSpan, hMerge, or vMerge is present. Sibling cells are
    /// never inspected.
    pub fn is_merged(&self) -> bool {
        self.grid_span.is_some() || self.row_span.is_some() || self.h_merge || self.v_merge
    }

    /// Get the cell's text frame.
    ///
    /// On first access the cell's text body is inspected; a frame is
    /// constructed only if at least one run holds non-empty text. The result
    /// of that first check sticks: a body that was empty stays reported as
    /// absent even if the markup later gains text through another path.
    pub fn text_frame(&mut self) -> Result<Option<&TextFrame>> {
        self.ensure_live()?;
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

    /// Extract the cell's text content.
    ///
    /// Returns an empty string for a cell without a text frame.
    pub fn text(&mut self) -> Result<String> {
        match self.text_frame()? {
            Some(frame) => frame.text(),
            None => Ok(String::new()),
        }
    }

    /// Get the cell's fill, derived from its `tcPr` element on first access.
    pub fn fill(&mut self) -> Result<&mut ShapeFill> {
        self.ensure_live()?;
        if !self.fill.is_cached() {
            let props = markup::first_subtree(&self.xml, b"tcPr")?.unwrap_or_default();
            let fill =
                ShapeFill::from_properties(self.scope.clone(), self.owner.clone(), &props)?;
            self.fill.get_or_insert_with(|| fill);
        }
        // Safe to unwrap since the cell was just filled
        Ok(self.fill.get_mut().unwrap())
    }

    /// Replace the backing markup subtree of this cell.
    ///
    /// The raw merge-span attributes and the derived fill follow the new
    /// markup. The text-frame check is one-shot and is not re-run (see
    /// [`TableCell::text_frame`]).
    pub fn replace_markup(&mut self, xml: Vec<u8>) -> Result<()> {
        self.ensure_live()?;
        let (grid_span, row_span, h_merge, v_merge) = parse_span_attrs(&xml)?;
        self.xml = xml;
        self.grid_span = grid_span;
        self.row_span = row_span;
        self.h_merge = h_merge;
        self.v_merge = v_merge;
        self.fill.reset();
        Ok(())
    }

    /// Fail with `Removed` if the owning table shape is no longer live.
    fn ensure_live(&self) -> Result<()> {
        if self.owner.is_removed() {
            return Err(ModelError::Removed(format!(
                "table cell ({}, {})",
                self.row, self.col
            )));
        }
        Ok(())
    }
}

/// Parse the merge-span attributes from the cell's own root element.
fn parse_span_attrs(xml: &[u8]) -> Result<(Option<u32>, Option<u32>, bool, bool)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let mut grid_span = None;
                let mut row_span = None;
                let mut h_merge = false;
                let mut v_merge = false;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"gridSpan" => {
                            grid_span = atoi_simd::parse::<u32, false, false>(&attr.value).ok();
                        },
                        b"rowSpan" => {
                            row_span = atoi_simd::parse::<u32, false, false>(&attr.value).ok();
                        },
                        b"hMerge" => h_merge = true,
                        b"vMerge" => v_merge = true,
                        _ => {},
                    }
                }
                return Ok((grid_span, row_span, h_merge, v_merge));
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelError::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok((None, None, false, false))
}
