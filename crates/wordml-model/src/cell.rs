use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, XmlContent, XmlElement};
use crate::props::TcPr;
use crate::row::TableRow;
use crate::table::BodyType;

/// A table cell node (`<w:tc>`).
///
/// Equality is structural: two cells with the same properties and content compare equal
/// even though they are different nodes. Use [`CtTc::id`] for identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct CtTc {
    #[serde(skip, default = "NodeId::fresh")]
    id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tc_pr: Option<TcPr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<XmlElement>,
}

impl PartialEq for CtTc {
    fn eq(&self, other: &Self) -> bool {
        self.tc_pr == other.tc_pr && self.content == other.content
    }
}

impl Default for CtTc {
    fn default() -> Self {
        Self::new()
    }
}

impl CtTc {
    /// A new cell holding one empty paragraph; a `w:tc` must end with a block element.
    pub fn new() -> Self {
        Self::from_parts(None, vec![XmlElement::new("w:p")])
    }

    pub fn from_parts(tc_pr: Option<TcPr>, content: Vec<XmlElement>) -> Self {
        Self {
            id: NodeId::fresh(),
            tc_pr,
            content,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_set_tc_pr(&self) -> bool {
        self.tc_pr.is_some()
    }

    pub fn tc_pr(&self) -> Option<&TcPr> {
        self.tc_pr.as_ref()
    }

    pub fn tc_pr_or_insert(&mut self) -> &mut TcPr {
        self.tc_pr.get_or_insert_with(TcPr::default)
    }

    /// Number of grid columns this cell spans; 1 when `w:gridSpan` is absent.
    pub fn grid_span(&self) -> u32 {
        self.tc_pr.as_ref().and_then(TcPr::grid_span).unwrap_or(1)
    }

    /// Block-level content (paragraphs, nested tables, ...).
    pub fn content(&self) -> &[XmlElement] {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Vec<XmlElement> {
        &mut self.content
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|el| el.local_name() == "p")
            .map(XmlElement::run_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the cell's content with a single paragraph holding `text`.
    pub fn set_text(&mut self, text: &str) {
        let t = XmlElement {
            name: "w:t".to_string(),
            attrs: vec![("xml:space".to_string(), "preserve".to_string())],
            children: vec![XmlContent::Text(text.to_string())],
        };
        let paragraph = XmlElement::new("w:p").with_child(XmlElement::new("w:r").with_child(t));
        self.content = vec![paragraph];
    }

    /// Deep copy with a fresh identity.
    pub fn copy(&self) -> Self {
        Self::from_parts(self.tc_pr.clone(), self.content.clone())
    }
}

/// Cached handle for a plain cell of a row.
///
/// Handles stay valid while the cell is part of its row; the node itself is reached
/// through the row (see [`TableRow::cell`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableCell {
    node: NodeId,
    row: NodeId,
    body: BodyType,
}

impl TableCell {
    pub(crate) const fn new(node: NodeId, row: NodeId, body: BodyType) -> Self {
        Self { node, row, body }
    }

    pub const fn node_id(self) -> NodeId {
        self.node
    }

    /// Identity of the owning row's node.
    pub const fn row_id(self) -> NodeId {
        self.row
    }

    pub const fn body(self) -> BodyType {
        self.body
    }
}

/// Borrowed view of a plain cell together with its row.
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    row: &'a TableRow,
    index: usize,
    item_index: usize,
    node: &'a CtTc,
}

impl<'a> CellRef<'a> {
    pub(crate) fn new(row: &'a TableRow, index: usize, item_index: usize, node: &'a CtTc) -> Self {
        Self {
            row,
            index,
            item_index,
            node,
        }
    }

    /// Position among the row's plain cells.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position among all of the row node's children.
    pub fn item_index(&self) -> usize {
        self.item_index
    }

    pub fn node(&self) -> &'a CtTc {
        self.node
    }

    pub fn node_id(&self) -> NodeId {
        self.node.id()
    }

    pub fn row(&self) -> &'a TableRow {
        self.row
    }

    pub fn handle(&self) -> TableCell {
        TableCell::new(self.node.id(), self.row.id(), self.row.body())
    }

    pub fn grid_span(&self) -> u32 {
        self.node.grid_span()
    }

    pub fn text(&self) -> String {
        self.node.text()
    }
}

/// Mutable access to a plain cell that belongs to a row.
///
/// Properties and content can be edited; the node itself cannot be replaced, so it keeps
/// the identity the row's cell list refers to.
#[derive(Debug)]
pub struct CellMut<'a> {
    node: &'a mut CtTc,
}

impl<'a> CellMut<'a> {
    pub(crate) fn new(node: &'a mut CtTc) -> Self {
        Self { node }
    }

    pub fn tc_pr_or_insert(&mut self) -> &mut TcPr {
        self.node.tc_pr_or_insert()
    }

    pub fn set_text(&mut self, text: &str) {
        self.node.set_text(text);
    }

    pub fn content_mut(&mut self) -> &mut Vec<XmlElement> {
        self.node.content_mut()
    }
}

impl Deref for CellMut<'_> {
    type Target = CtTc;

    fn deref(&self) -> &CtTc {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::TcPrItem;

    #[test]
    fn new_cell_has_one_empty_paragraph() {
        let tc = CtTc::new();
        assert_eq!(tc.content().len(), 1);
        assert_eq!(tc.content()[0].name, "w:p");
        assert_eq!(tc.text(), "");
        assert_eq!(tc.grid_span(), 1);
        assert!(!tc.is_set_tc_pr());
    }

    #[test]
    fn set_text_replaces_paragraphs() {
        let mut tc = CtTc::new();
        tc.content_mut().push(XmlElement::new("w:p"));
        tc.set_text("hello world");
        assert_eq!(tc.content().len(), 1);
        assert_eq!(tc.text(), "hello world");
    }

    #[test]
    fn text_joins_paragraphs_with_newlines() {
        let mut a = CtTc::new();
        a.set_text("one");
        let mut b = CtTc::new();
        b.set_text("two");
        let tc = CtTc::from_parts(
            None,
            vec![
                a.content()[0].clone(),
                XmlElement::new("w:tbl"),
                b.content()[0].clone(),
            ],
        );
        assert_eq!(tc.text(), "one\ntwo");
    }

    #[test]
    fn copy_is_equal_but_distinct() {
        let mut tc = CtTc::new();
        tc.tc_pr_or_insert().set_grid_span(3);
        tc.set_text("x");
        let copy = tc.copy();
        assert_eq!(copy, tc);
        assert_ne!(copy.id(), tc.id());
        assert_eq!(copy.tc_pr().map(TcPr::items), Some(&[TcPrItem::GridSpan(3)][..]));
    }
}
