use serde::{Deserialize, Serialize};

use crate::cell::CtTc;
use crate::node::{NodeId, XmlElement};
use crate::row::{RowItem, TableRow};

/// One child of `<w:sdtPr>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SdtPrItem {
    /// `<w:alias w:val>`: friendly name shown by editors.
    Alias(String),
    /// `<w:tag w:val>`: machine-readable tag.
    Tag(String),
    Other(XmlElement),
}

/// Properties of a structured document tag (`<w:sdtPr>`), kept in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdtPr {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<SdtPrItem>,
}

impl SdtPr {
    pub fn new(items: Vec<SdtPrItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[SdtPrItem] {
        &self.items
    }

    pub fn tag(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            SdtPrItem::Tag(tag) => Some(tag.as_str()),
            _ => None,
        })
    }

    pub fn alias(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            SdtPrItem::Alias(alias) => Some(alias.as_str()),
            _ => None,
        })
    }
}

/// A row-level structured document tag wrapping one or more cells (`<w:sdt>` inside
/// `<w:tr>`).
#[derive(Debug, Serialize, Deserialize)]
pub struct CtSdtCell {
    #[serde(skip, default = "NodeId::fresh")]
    id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdt_pr: Option<SdtPr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_pr: Option<XmlElement>,
    /// `<w:sdtContent>` children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<RowItem>,
}

impl PartialEq for CtSdtCell {
    fn eq(&self, other: &Self) -> bool {
        self.sdt_pr == other.sdt_pr && self.end_pr == other.end_pr && self.content == other.content
    }
}

impl CtSdtCell {
    pub fn from_parts(
        sdt_pr: Option<SdtPr>,
        end_pr: Option<XmlElement>,
        content: Vec<RowItem>,
    ) -> Self {
        Self {
            id: NodeId::fresh(),
            sdt_pr,
            end_pr,
            content,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn sdt_pr(&self) -> Option<&SdtPr> {
        self.sdt_pr.as_ref()
    }

    pub fn end_pr(&self) -> Option<&XmlElement> {
        self.end_pr.as_ref()
    }

    pub fn content(&self) -> &[RowItem] {
        &self.content
    }

    /// Every cell wrapped by this tag, including cells of nested tags.
    pub fn cells(&self) -> Vec<&CtTc> {
        let mut out = Vec::new();
        collect_cells(&self.content, &mut out);
        out
    }

    pub fn copy(&self) -> Self {
        Self::from_parts(
            self.sdt_pr.clone(),
            self.end_pr.clone(),
            self.content.iter().map(RowItem::copy).collect(),
        )
    }
}

fn collect_cells<'a>(items: &'a [RowItem], out: &mut Vec<&'a CtTc>) {
    for item in items {
        match item {
            RowItem::Cell(tc) => out.push(tc),
            RowItem::SdtCell(sdt) => collect_cells(&sdt.content, out),
            RowItem::Other(_) => {}
        }
    }
}

/// Borrowed view of a structured-tag cell together with its row.
#[derive(Debug, Clone, Copy)]
pub struct SdtCellRef<'a> {
    row: &'a TableRow,
    item_index: usize,
    node: &'a CtSdtCell,
}

impl<'a> SdtCellRef<'a> {
    pub(crate) fn new(row: &'a TableRow, item_index: usize, node: &'a CtSdtCell) -> Self {
        Self {
            row,
            item_index,
            node,
        }
    }

    pub fn item_index(&self) -> usize {
        self.item_index
    }

    pub fn node(&self) -> &'a CtSdtCell {
        self.node
    }

    pub fn node_id(&self) -> NodeId {
        self.node.id()
    }

    pub fn row(&self) -> &'a TableRow {
        self.row
    }

    pub fn tag(&self) -> Option<&'a str> {
        self.node.sdt_pr()?.tag()
    }

    pub fn title(&self) -> Option<&'a str> {
        self.node.sdt_pr()?.alias()
    }

    /// Texts of the wrapped cells joined with `\n`.
    pub fn text(&self) -> String {
        self.node
            .cells()
            .iter()
            .map(|tc| tc.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
