use serde::{Deserialize, Serialize};

use crate::node::{OnOff, XmlElement};

/// `ST_HeightRule`: how a row's `w:trHeight` value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeightRule {
    /// Size the row to its content.
    #[default]
    Auto,
    /// The height is a minimum.
    AtLeast,
    /// The height is fixed.
    Exact,
}

impl HeightRule {
    pub const fn as_str(self) -> &'static str {
        match self {
            HeightRule::Auto => "auto",
            HeightRule::AtLeast => "atLeast",
            HeightRule::Exact => "exact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(HeightRule::Auto),
            "atLeast" => Some(HeightRule::AtLeast),
            "exact" => Some(HeightRule::Exact),
            _ => None,
        }
    }
}

/// `<w:trHeight>`. Values are in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Height {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<HeightRule>,
}

/// Parse an `ST_TwipsMeasure`: a plain count of twentieths of a point, or a universal
/// measure (`0.5in`, `1.2cm`, `12pt`, ...) converted to twips and rounded.
pub fn parse_twips_measure(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(twips) = value.parse::<u32>() {
        return Some(twips);
    }
    let split = value.len().checked_sub(2)?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (number, unit) = value.split_at(split);
    let per_unit = match unit {
        "in" => 1440.0,
        "cm" => 1440.0 / 2.54,
        "mm" => 1440.0 / 25.4,
        "pt" => 20.0,
        "pc" | "pi" => 240.0,
        _ => return None,
    };
    let number: f64 = number.parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }
    let twips = (number * per_unit).round();
    (twips <= f64::from(u32::MAX)).then_some(twips as u32)
}

/// One child of `<w:trPr>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrPrItem {
    Height(Height),
    CantSplit(OnOff),
    TblHeader(OnOff),
    Other(XmlElement),
}

/// Row property group (`<w:trPr>`).
///
/// Entries are kept in document order. The schema allows each kind to repeat; readers
/// only look at the first entry of a kind and writers update that same entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrPr {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<TrPrItem>,
}

impl TrPr {
    pub fn new(items: Vec<TrPrItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TrPrItem] {
        &self.items
    }

    pub fn heights(&self) -> impl Iterator<Item = &Height> {
        self.items.iter().filter_map(|item| match item {
            TrPrItem::Height(h) => Some(h),
            _ => None,
        })
    }

    pub fn size_of_height_array(&self) -> usize {
        self.heights().count()
    }

    pub fn first_height(&self) -> Option<&Height> {
        self.heights().next()
    }

    pub fn first_cant_split(&self) -> Option<OnOff> {
        self.items.iter().find_map(|item| match item {
            TrPrItem::CantSplit(v) => Some(*v),
            _ => None,
        })
    }

    pub fn first_tbl_header(&self) -> Option<OnOff> {
        self.items.iter().find_map(|item| match item {
            TrPrItem::TblHeader(v) => Some(*v),
            _ => None,
        })
    }

    pub(crate) fn first_height_or_insert(&mut self) -> &mut Height {
        let pos = self.position_or_insert(
            |item| matches!(item, TrPrItem::Height(_)),
            || TrPrItem::Height(Height::default()),
        );
        let TrPrItem::Height(h) = &mut self.items[pos] else {
            unreachable!("position_or_insert returned a non-height entry");
        };
        h
    }

    pub(crate) fn first_cant_split_or_insert(&mut self) -> &mut OnOff {
        let pos = self.position_or_insert(
            |item| matches!(item, TrPrItem::CantSplit(_)),
            || TrPrItem::CantSplit(OnOff::default()),
        );
        let TrPrItem::CantSplit(v) = &mut self.items[pos] else {
            unreachable!("position_or_insert returned a non-cantSplit entry");
        };
        v
    }

    pub(crate) fn first_tbl_header_or_insert(&mut self) -> &mut OnOff {
        let pos = self.position_or_insert(
            |item| matches!(item, TrPrItem::TblHeader(_)),
            || TrPrItem::TblHeader(OnOff::default()),
        );
        let TrPrItem::TblHeader(v) = &mut self.items[pos] else {
            unreachable!("position_or_insert returned a non-tblHeader entry");
        };
        v
    }

    fn position_or_insert(
        &mut self,
        matches: impl Fn(&TrPrItem) -> bool,
        make: impl FnOnce() -> TrPrItem,
    ) -> usize {
        match self.items.iter().position(matches) {
            Some(pos) => pos,
            None => {
                self.items.push(make());
                self.items.len() - 1
            }
        }
    }
}

/// One child of `<w:tcPr>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TcPrItem {
    /// `<w:gridSpan w:val="n"/>`: number of grid columns the cell spans.
    GridSpan(u32),
    Other(XmlElement),
}

/// Cell property group (`<w:tcPr>`), kept in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TcPr {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<TcPrItem>,
}

impl TcPr {
    pub fn new(items: Vec<TcPrItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TcPrItem] {
        &self.items
    }

    pub fn grid_span(&self) -> Option<u32> {
        self.items.iter().find_map(|item| match item {
            TcPrItem::GridSpan(span) => Some(*span),
            TcPrItem::Other(_) => None,
        })
    }

    /// Set `w:gridSpan`, overwriting an existing entry or inserting a new one.
    ///
    /// `w:tcPr` is a schema sequence: a new span goes after `w:cnfStyle` / `w:tcW`.
    pub fn set_grid_span(&mut self, span: u32) {
        for item in &mut self.items {
            if let TcPrItem::GridSpan(existing) = item {
                *existing = span;
                return;
            }
        }
        let pos = self
            .items
            .iter()
            .position(|item| match item {
                TcPrItem::Other(el) => !matches!(el.local_name(), "cnfStyle" | "tcW"),
                TcPrItem::GridSpan(_) => true,
            })
            .unwrap_or(self.items.len());
        self.items.insert(pos, TcPrItem::GridSpan(span));
    }
}
