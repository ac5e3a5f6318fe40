use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::cell::{CellMut, CellRef, CtTc, TableCell};
use crate::node::{NodeId, XmlElement};
use crate::props::{HeightRule, TrPr};
use crate::sdt::{CtSdtCell, SdtCellRef};
use crate::table::BodyType;

/// A direct child of `<w:tr>`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum RowItem {
    Cell(CtTc),
    SdtCell(CtSdtCell),
    /// Anything else (`w:customXml`, bookmarks, permission ranges, ...), kept verbatim.
    Other(XmlElement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowItemKind {
    Cell,
    SdtCell,
    Other,
}

impl RowItem {
    pub fn kind(&self) -> RowItemKind {
        match self {
            RowItem::Cell(_) => RowItemKind::Cell,
            RowItem::SdtCell(_) => RowItemKind::SdtCell,
            RowItem::Other(_) => RowItemKind::Other,
        }
    }

    /// Deep copy; nodes in the copy get fresh identities.
    pub fn copy(&self) -> Self {
        match self {
            RowItem::Cell(tc) => RowItem::Cell(tc.copy()),
            RowItem::SdtCell(sdt) => RowItem::SdtCell(sdt.copy()),
            RowItem::Other(el) => RowItem::Other(el.clone()),
        }
    }
}

/// A table row node (`<w:tr>`).
///
/// Structural mutators are crate-private: once a node is wrapped in a [`TableRow`] its
/// cells only change through the row, which keeps the row's cell cache in step.
#[derive(Debug, Serialize, Deserialize)]
pub struct CtRow {
    #[serde(skip, default = "NodeId::fresh")]
    id: NodeId,
    /// Attributes of `<w:tr>` itself (`w:rsidR`, `w14:paraId`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attrs: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tbl_pr_ex: Option<XmlElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tr_pr: Option<TrPr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items: Vec<RowItem>,
}

impl PartialEq for CtRow {
    fn eq(&self, other: &Self) -> bool {
        self.attrs == other.attrs
            && self.tbl_pr_ex == other.tbl_pr_ex
            && self.tr_pr == other.tr_pr
            && self.items == other.items
    }
}

impl Default for CtRow {
    fn default() -> Self {
        Self::new()
    }
}

impl CtRow {
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), None, None, Vec::new())
    }

    pub fn from_parts(
        attrs: Vec<(String, String)>,
        tbl_pr_ex: Option<XmlElement>,
        tr_pr: Option<TrPr>,
        items: Vec<RowItem>,
    ) -> Self {
        Self {
            id: NodeId::fresh(),
            attrs,
            tbl_pr_ex,
            tr_pr,
            items,
        }
    }

    /// Split the node back into the pieces [`CtRow::from_parts`] takes.
    pub fn into_parts(
        self,
    ) -> (
        Vec<(String, String)>,
        Option<XmlElement>,
        Option<TrPr>,
        Vec<RowItem>,
    ) {
        (self.attrs, self.tbl_pr_ex, self.tr_pr, self.items)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn tbl_pr_ex(&self) -> Option<&XmlElement> {
        self.tbl_pr_ex.as_ref()
    }

    pub fn is_set_tr_pr(&self) -> bool {
        self.tr_pr.is_some()
    }

    pub fn tr_pr(&self) -> Option<&TrPr> {
        self.tr_pr.as_ref()
    }

    pub(crate) fn tr_pr_or_insert(&mut self) -> &mut TrPr {
        self.tr_pr.get_or_insert_with(TrPr::default)
    }

    /// All direct children in document order.
    pub fn items(&self) -> &[RowItem] {
        &self.items
    }

    /// Direct `<w:tc>` children in document order.
    pub fn tcs(&self) -> impl Iterator<Item = &CtTc> {
        self.items.iter().filter_map(|item| match item {
            RowItem::Cell(tc) => Some(tc),
            _ => None,
        })
    }

    pub fn size_of_tc_array(&self) -> usize {
        self.tcs().count()
    }

    pub fn tc(&self, pos: usize) -> Option<&CtTc> {
        self.tcs().nth(pos)
    }

    pub(crate) fn tc_mut(&mut self, pos: usize) -> Option<&mut CtTc> {
        self.items
            .iter_mut()
            .filter_map(|item| match item {
                RowItem::Cell(tc) => Some(tc),
                _ => None,
            })
            .nth(pos)
    }

    pub(crate) fn add_new_tc(&mut self) -> &CtTc {
        self.items.push(RowItem::Cell(CtTc::new()));
        match self.items.last() {
            Some(RowItem::Cell(tc)) => tc,
            _ => unreachable!("a cell was just appended"),
        }
    }

    pub(crate) fn remove_tc(&mut self, pos: usize) -> Option<CtTc> {
        let item_index = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches!(item, RowItem::Cell(_)))
            .nth(pos)
            .map(|(idx, _)| idx)?;
        match self.items.remove(item_index) {
            RowItem::Cell(tc) => Some(tc),
            _ => unreachable!("index was selected from cell items"),
        }
    }

    /// Deep copy: equal content, fresh identities throughout.
    pub fn copy(&self) -> Self {
        Self::from_parts(
            self.attrs.clone(),
            self.tbl_pr_ex.clone(),
            self.tr_pr.clone(),
            self.items.iter().map(RowItem::copy).collect(),
        )
    }
}

/// One entry of [`TableRow::all_row_content`].
#[derive(Debug, Clone, Copy)]
pub enum RowContent<'a> {
    Cell(CellRef<'a>),
    SdtCell(SdtCellRef<'a>),
}

impl<'a> RowContent<'a> {
    pub fn kind(&self) -> RowItemKind {
        match self {
            RowContent::Cell(_) => RowItemKind::Cell,
            RowContent::SdtCell(_) => RowItemKind::SdtCell,
        }
    }

    /// Position among all of the row node's children.
    pub fn item_index(&self) -> usize {
        match self {
            RowContent::Cell(cell) => cell.item_index(),
            RowContent::SdtCell(sdt) => sdt.item_index(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            RowContent::Cell(cell) => cell.node_id(),
            RowContent::SdtCell(sdt) => sdt.node_id(),
        }
    }

    pub fn row(&self) -> &'a TableRow {
        match self {
            RowContent::Cell(cell) => cell.row(),
            RowContent::SdtCell(sdt) => sdt.row(),
        }
    }

    pub fn row_id(&self) -> NodeId {
        self.row().id()
    }

    pub fn text(&self) -> String {
        match self {
            RowContent::Cell(cell) => cell.text(),
            RowContent::SdtCell(sdt) => sdt.text(),
        }
    }
}

/// A structural change to a row's plain cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellChange {
    Append,
    Remove(usize),
}

/// A row of a [`crate::Table`].
///
/// Rows mostly carry sizing and split/header flags; content lives in the cells. The
/// plain-cell list is built on first access and kept in step with the node by every
/// structural change.
#[derive(Debug)]
pub struct TableRow {
    node: CtRow,
    table: NodeId,
    body: BodyType,
    cells: OnceCell<Vec<TableCell>>,
}

impl TableRow {
    pub(crate) fn new(node: CtRow, table: NodeId, body: BodyType) -> Self {
        Self {
            node,
            table,
            body,
            cells: OnceCell::new(),
        }
    }

    /// Attach to a (possibly different) table; cached handles carry the body, so they
    /// are dropped and rebuilt lazily.
    pub(crate) fn rebind(&mut self, table: NodeId, body: BodyType) {
        self.table = table;
        self.body = body;
        self.cells = OnceCell::new();
    }

    pub fn node(&self) -> &CtRow {
        &self.node
    }

    pub fn into_node(self) -> CtRow {
        self.node
    }

    /// Identity of the underlying row node.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Identity of the owning table.
    pub fn table_id(&self) -> NodeId {
        self.table
    }

    pub fn body(&self) -> BodyType {
        self.body
    }

    /// Plain cells in document order. Cells wrapped in structured tags are not listed
    /// here; see [`TableRow::all_row_content`].
    pub fn cells(&self) -> &[TableCell] {
        self.cells.get_or_init(|| {
            log::trace!("building cell cache for row {:?}", self.node.id());
            self.node
                .tcs()
                .map(|tc| TableCell::new(tc.id(), self.node.id(), self.body))
                .collect()
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cells().len()
    }

    /// The plain cell at `pos`, or `None` past the end.
    pub fn cell(&self, pos: usize) -> Option<CellRef<'_>> {
        let handle = self.cells().get(pos)?;
        let (item_index, node) = self
            .node
            .items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match item {
                RowItem::Cell(tc) => Some((idx, tc)),
                _ => None,
            })
            .nth(pos)?;
        debug_assert_eq!(handle.node_id(), node.id());
        Some(CellRef::new(self, pos, item_index, node))
    }

    /// Edit the content and properties of the plain cell at `pos`. Adding or removing
    /// cells goes through the row.
    pub fn cell_mut(&mut self, pos: usize) -> Option<CellMut<'_>> {
        self.node.tc_mut(pos).map(CellMut::new)
    }

    /// The cached handle wrapping `node`, if it is one of this row's plain cells.
    pub fn find_cell_for(&self, node: &CtTc) -> Option<TableCell> {
        self.cells()
            .iter()
            .find(|cell| cell.node_id() == node.id())
            .copied()
    }

    /// Every cell-level child, plain or tag-wrapped, in document order. Built fresh on
    /// each call.
    pub fn all_row_content(&self) -> Vec<RowContent<'_>> {
        let mut tc_index = 0;
        self.node
            .items
            .iter()
            .enumerate()
            .filter_map(|(item_index, item)| match item {
                RowItem::Cell(tc) => {
                    let cell = CellRef::new(self, tc_index, item_index, tc);
                    tc_index += 1;
                    Some(RowContent::Cell(cell))
                }
                RowItem::SdtCell(sdt) => {
                    Some(RowContent::SdtCell(SdtCellRef::new(self, item_index, sdt)))
                }
                RowItem::Other(_) => None,
            })
            .collect()
    }

    /// Append a new empty cell.
    pub fn create_cell(&mut self) -> TableCell {
        match self.apply(CellChange::Append) {
            Some(cell) => cell,
            None => unreachable!("appending a cell always succeeds"),
        }
    }

    /// Same as [`TableRow::create_cell`].
    pub fn add_cell_at_end(&mut self) -> TableCell {
        self.create_cell()
    }

    /// Remove the plain cell at `pos`, returning its handle, or `None` (row untouched)
    /// when `pos` is past the end.
    pub fn remove_cell(&mut self, pos: usize) -> Option<TableCell> {
        self.apply(CellChange::Remove(pos))
    }

    /// The only path that adds or removes cells: node and cache change together.
    pub(crate) fn apply(&mut self, change: CellChange) -> Option<TableCell> {
        let row = self.node.id();
        let body = self.body;
        let changed = match change {
            CellChange::Append => {
                let node = self.node.add_new_tc().id();
                let cell = TableCell::new(node, row, body);
                if let Some(cells) = self.cells.get_mut() {
                    cells.push(cell);
                }
                Some(cell)
            }
            CellChange::Remove(pos) => {
                if pos >= self.node.size_of_tc_array() {
                    return None;
                }
                if let Some(cells) = self.cells.get_mut() {
                    cells.remove(pos);
                }
                self.node
                    .remove_tc(pos)
                    .map(|tc| TableCell::new(tc.id(), row, body))
            }
        };
        debug_assert!(self.cache_matches_node(), "cell cache diverged from row node");
        changed
    }

    fn cache_matches_node(&self) -> bool {
        match self.cells.get() {
            None => true,
            Some(cells) => {
                cells.len() == self.node.size_of_tc_array()
                    && cells
                        .iter()
                        .zip(self.node.tcs())
                        .all(|(cell, tc)| cell.node_id() == tc.id())
            }
        }
    }

    /// Row height from the first `w:trHeight`; 0 when there is none.
    pub fn height(&self) -> u32 {
        self.node
            .tr_pr()
            .and_then(TrPr::first_height)
            .and_then(|h| h.val)
            .unwrap_or(0)
    }

    pub fn set_height(&mut self, height: u32) {
        self.node.tr_pr_or_insert().first_height_or_insert().val = Some(height);
    }

    /// `w:hRule` of the first `w:trHeight`; [`HeightRule::Auto`] when unset.
    pub fn height_rule(&self) -> HeightRule {
        self.node
            .tr_pr()
            .and_then(TrPr::first_height)
            .and_then(|h| h.rule)
            .unwrap_or_default()
    }

    pub fn set_height_rule(&mut self, rule: HeightRule) {
        self.node.tr_pr_or_insert().first_height_or_insert().rule = Some(rule);
    }

    /// True when the row must not break across pages. A `w:cantSplit` entry without a
    /// value counts as true; no entry counts as false.
    pub fn is_cant_split_row(&self) -> bool {
        self.node
            .tr_pr()
            .and_then(TrPr::first_cant_split)
            .is_some_and(|v| v.resolve())
    }

    pub fn set_cant_split_row(&mut self, split: bool) {
        self.node.tr_pr_or_insert().first_cant_split_or_insert().val = Some(split);
    }

    /// This row's own `w:tblHeader` flag, ignoring the rows above it. Whether the row
    /// actually repeats is [`crate::Table::is_repeat_header`].
    pub fn repeat_header_flag(&self) -> bool {
        self.node
            .tr_pr()
            .and_then(TrPr::first_tbl_header)
            .is_some_and(|v| v.resolve())
    }

    /// Set this row's `w:tblHeader` flag. Other rows are not touched, so the row only
    /// repeats if every row above it does too.
    pub fn set_repeat_header(&mut self, repeat: bool) {
        self.node.tr_pr_or_insert().first_tbl_header_or_insert().val = Some(repeat);
    }
}
