use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::{CellMut, TableCell};
use crate::merge::MergeError;
use crate::node::{Namespace, NodeId, XmlElement};
use crate::props::HeightRule;
use crate::row::{CtRow, TableRow};

/// Errors that can occur when mutating a table's row sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row index {index} is out of range for a table with {len} rows")]
    RowOutOfRange { index: usize, len: usize },
    #[error("insert position {pos} is out of range for a table with {len} rows")]
    PositionOutOfRange { pos: usize, len: usize },
}

/// The kind of document part a table (and therefore its cells) lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyType {
    #[default]
    Document,
    Header,
    Footer,
    Footnote,
    TableCell,
    ContentControl,
}

/// A table node (`<w:tbl>`) as produced by a reader, before it is wrapped in a [`Table`].
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtTbl {
    /// Namespace declarations on the table element.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Namespace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbl_pr: Option<XmlElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbl_grid: Option<XmlElement>,
    /// Other table-level children (bookmarks, `w:customXml` rows, ...), kept after the grid.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<XmlElement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<CtRow>,
}

/// A table: an ordered sequence of rows sharing a body context.
#[derive(Debug)]
pub struct Table {
    id: NodeId,
    body: BodyType,
    namespaces: Vec<Namespace>,
    tbl_pr: Option<XmlElement>,
    tbl_grid: Option<XmlElement>,
    other: Vec<XmlElement>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(body: BodyType) -> Self {
        Self::from_node(CtTbl::default(), body)
    }

    pub fn from_node(node: CtTbl, body: BodyType) -> Self {
        let id = NodeId::fresh();
        let rows = node
            .rows
            .into_iter()
            .map(|row| TableRow::new(row, id, body))
            .collect();
        Self {
            id,
            body,
            namespaces: node.namespaces,
            tbl_pr: node.tbl_pr,
            tbl_grid: node.tbl_grid,
            other: node.other,
            rows,
        }
    }

    pub fn into_node(self) -> CtTbl {
        CtTbl {
            namespaces: self.namespaces,
            tbl_pr: self.tbl_pr,
            tbl_grid: self.tbl_grid,
            other: self.other,
            rows: self.rows.into_iter().map(TableRow::into_node).collect(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn body(&self) -> BodyType {
        self.body
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn tbl_pr(&self) -> Option<&XmlElement> {
        self.tbl_pr.as_ref()
    }

    pub fn tbl_grid(&self) -> Option<&XmlElement> {
        self.tbl_grid.as_ref()
    }

    pub fn other_elements(&self) -> &[XmlElement] {
        &self.other
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows.len()).then_some(RowRef { table: self, index })
    }

    pub fn row_mut(&mut self, index: usize) -> Option<RowMut<'_>> {
        self.rows.get_mut(index).map(|row| RowMut { row })
    }

    /// Position of the row whose node is `id`.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    /// Append a new row with as many empty cells as the first row has.
    pub fn create_row(&mut self) -> RowMut<'_> {
        let columns = self.rows.first().map_or(0, TableRow::cell_count);
        let mut row = self.add_row_node(CtRow::new());
        for _ in 0..columns {
            row.create_cell();
        }
        row
    }

    /// Wrap `node` as a row of this table and append it.
    pub fn add_row_node(&mut self, node: CtRow) -> RowMut<'_> {
        let row = TableRow::new(node, self.id, self.body);
        self.push_row(row)
    }

    /// Append `row`, re-binding it to this table if it came from another one.
    pub fn add_row(&mut self, mut row: TableRow) -> RowMut<'_> {
        row.rebind(self.id, self.body);
        self.push_row(row)
    }

    /// Insert `row` at `pos` (`pos == row_count()` appends).
    pub fn add_row_at(&mut self, mut row: TableRow, pos: usize) -> Result<RowMut<'_>, TableError> {
        let len = self.rows.len();
        if pos > len {
            return Err(TableError::PositionOutOfRange { pos, len });
        }
        row.rebind(self.id, self.body);
        log::debug!("inserting row {:?} at position {pos}", row.id());
        self.rows.insert(pos, row);
        Ok(RowMut {
            row: &mut self.rows[pos],
        })
    }

    /// Detach the row at `index`. The returned row can be added to another table.
    pub fn remove_row(&mut self, index: usize) -> Option<TableRow> {
        if index >= self.rows.len() {
            return None;
        }
        Some(self.rows.remove(index))
    }

    /// Deep-copy the row at `index` and append the copy.
    pub fn clone_row(&mut self, index: usize) -> Result<RowMut<'_>, TableError> {
        let pos = self.rows.len();
        self.clone_row_at(index, pos)
    }

    /// Deep-copy the row at `index` and insert the copy at `pos`.
    ///
    /// The copy shares no nodes with its source and builds its own cell list on first use.
    pub fn clone_row_at(&mut self, index: usize, pos: usize) -> Result<RowMut<'_>, TableError> {
        let len = self.rows.len();
        let source = self
            .rows
            .get(index)
            .ok_or(TableError::RowOutOfRange { index, len })?;
        if pos > len {
            return Err(TableError::PositionOutOfRange { pos, len });
        }
        let copy = TableRow::new(source.node().copy(), self.id, self.body);
        log::debug!("cloning row {index} to position {pos}");
        self.add_row_at(copy, pos)
    }

    /// Whether the row at `index` repeats as a header on each page.
    ///
    /// Header rows must be contiguous from the top of the table: a row repeats only if its
    /// own `w:tblHeader` flag and the flag of every row above it are set.
    pub fn is_repeat_header(&self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        let mut repeat = false;
        for (pos, row) in self.rows.iter().enumerate() {
            repeat = row.repeat_header_flag();
            if pos == index || !repeat {
                break;
            }
        }
        repeat
    }

    fn push_row(&mut self, row: TableRow) -> RowMut<'_> {
        self.rows.push(row);
        let last = self.rows.len() - 1;
        RowMut {
            row: &mut self.rows[last],
        }
    }
}

/// A row borrowed together with its table, for queries that depend on sibling rows.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowRef<'a> {
    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn row(&self) -> &'a TableRow {
        &self.table.rows[self.index]
    }

    /// See [`Table::is_repeat_header`].
    pub fn is_repeat_header(&self) -> bool {
        self.table.is_repeat_header(self.index)
    }
}

impl Deref for RowRef<'_> {
    type Target = TableRow;

    fn deref(&self) -> &TableRow {
        self.row()
    }
}

/// A row of a table borrowed for editing.
///
/// Everything a [`TableRow`] can change about itself is available here, but the row cannot
/// be replaced wholesale: it stays bound to its table. Reads go through `Deref`.
#[derive(Debug)]
pub struct RowMut<'a> {
    row: &'a mut TableRow,
}

impl RowMut<'_> {
    pub fn create_cell(&mut self) -> TableCell {
        self.row.create_cell()
    }

    pub fn add_cell_at_end(&mut self) -> TableCell {
        self.row.add_cell_at_end()
    }

    pub fn remove_cell(&mut self, pos: usize) -> Option<TableCell> {
        self.row.remove_cell(pos)
    }

    pub fn merge_cells(&mut self, start: usize, end: usize) -> Result<(), MergeError> {
        self.row.merge_cells(start, end)
    }

    pub fn cell_mut(&mut self, pos: usize) -> Option<CellMut<'_>> {
        self.row.cell_mut(pos)
    }

    pub fn set_height(&mut self, height: u32) {
        self.row.set_height(height);
    }

    pub fn set_height_rule(&mut self, rule: HeightRule) {
        self.row.set_height_rule(rule);
    }

    pub fn set_cant_split_row(&mut self, split: bool) {
        self.row.set_cant_split_row(split);
    }

    pub fn set_repeat_header(&mut self, repeat: bool) {
        self.row.set_repeat_header(repeat);
    }
}

impl Deref for RowMut<'_> {
    type Target = TableRow;

    fn deref(&self) -> &TableRow {
        self.row
    }
}
