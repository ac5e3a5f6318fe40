use roxmltree::{Document, Node};
use wordml_model::props::parse_twips_measure;
use wordml_model::{
    CtRow, CtSdtCell, CtTbl, CtTc, Height, HeightRule, Namespace, OnOff, RowItem, SdtPr,
    SdtPrItem, TcPr, TcPrItem, TrPr, TrPrItem, XmlContent, XmlElement, W_NS,
};

use crate::WordXmlError;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse a `<w:tbl>` fragment.
///
/// Elements the model does not interpret are kept as [`XmlElement`]s so they can be
/// written back.
pub fn read_table_xml(xml: &str) -> Result<CtTbl, WordXmlError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if w_local(root) != Some("tbl") {
        return Err(WordXmlError::UnexpectedRoot {
            expected: "w:tbl",
            found: qualified_name(root),
        });
    }

    let mut table = CtTbl {
        namespaces: collect_namespaces(root),
        ..CtTbl::default()
    };

    for child in root.children().filter(Node::is_element) {
        match w_local(child) {
            Some("tblPr") => table.tbl_pr = Some(read_element(child)),
            Some("tblGrid") => table.tbl_grid = Some(read_element(child)),
            Some("tr") => table.rows.push(read_row(child)?),
            _ => {
                if !table.rows.is_empty() {
                    log::warn!(
                        "<{}> between table rows is kept but written after the grid",
                        qualified_name(child)
                    );
                }
                table.other.push(read_element(child));
            }
        }
    }
    Ok(table)
}

/// Parse a standalone `<w:tr>` fragment.
///
/// Namespaces other than `w:` that are used inside the fragment are kept as `xmlns`
/// attributes on the row, so the row can be written back on its own.
pub fn read_row_xml(xml: &str) -> Result<CtRow, WordXmlError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if w_local(root) != Some("tr") {
        return Err(WordXmlError::UnexpectedRoot {
            expected: "w:tr",
            found: qualified_name(root),
        });
    }
    let row = read_row(root)?;
    let declarations: Vec<(String, String)> = collect_namespaces(root)
        .into_iter()
        .filter(|ns| ns.uri != W_NS)
        .map(|ns| {
            let name = match ns.prefix {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            (name, ns.uri)
        })
        .collect();
    if declarations.is_empty() {
        return Ok(row);
    }
    let (attrs, tbl_pr_ex, tr_pr, items) = row.into_parts();
    Ok(CtRow::from_parts(
        declarations.into_iter().chain(attrs).collect(),
        tbl_pr_ex,
        tr_pr,
        items,
    ))
}

/// Every namespace declared on `root` or below it, first declaration of a prefix wins.
///
/// Names are stored with their source prefixes, so all of these have to be re-declared on
/// the fragment root when writing.
fn collect_namespaces(root: Node<'_, '_>) -> Vec<Namespace> {
    let mut out: Vec<Namespace> = Vec::new();
    for node in root.descendants().filter(Node::is_element) {
        for ns in node.namespaces() {
            if ns.name() == Some("xml") {
                continue;
            }
            match out.iter().find(|seen| seen.prefix.as_deref() == ns.name()) {
                Some(seen) if seen.uri != ns.uri() => log::warn!(
                    "prefix {:?} is bound to both {} and {}; keeping the first",
                    ns.name(),
                    seen.uri,
                    ns.uri()
                ),
                Some(_) => {}
                None => out.push(Namespace::new(ns.name(), ns.uri())),
            }
        }
    }
    out
}

fn read_row(node: Node<'_, '_>) -> Result<CtRow, WordXmlError> {
    let mut tbl_pr_ex = None;
    let mut tr_pr = None;
    let mut items = Vec::new();
    for child in node.children().filter(Node::is_element) {
        match w_local(child) {
            Some("tblPrEx") => tbl_pr_ex = Some(read_element(child)),
            Some("trPr") => tr_pr = Some(read_tr_pr(child)?),
            _ => items.push(read_row_item(child)?),
        }
    }
    Ok(CtRow::from_parts(read_attrs(node), tbl_pr_ex, tr_pr, items))
}

fn read_row_item(node: Node<'_, '_>) -> Result<RowItem, WordXmlError> {
    Ok(match w_local(node) {
        Some("tc") => RowItem::Cell(read_cell(node)?),
        Some("sdt") => RowItem::SdtCell(read_sdt_cell(node)?),
        _ => RowItem::Other(read_element(node)),
    })
}

fn read_tr_pr(node: Node<'_, '_>) -> Result<TrPr, WordXmlError> {
    let mut items = Vec::new();
    for child in node.children().filter(Node::is_element) {
        let item = match w_local(child) {
            Some("trHeight") => TrPrItem::Height(Height {
                val: match w_attr(child, "val") {
                    Some(raw) => Some(
                        parse_twips_measure(raw).ok_or_else(|| invalid("w:trHeight", "w:val", raw))?,
                    ),
                    None => None,
                },
                rule: match w_attr(child, "hRule") {
                    Some(raw) => Some(
                        HeightRule::parse(raw).ok_or_else(|| invalid("w:trHeight", "w:hRule", raw))?,
                    ),
                    None => None,
                },
            }),
            Some("cantSplit") => TrPrItem::CantSplit(read_on_off(child, "w:cantSplit")?),
            Some("tblHeader") => TrPrItem::TblHeader(read_on_off(child, "w:tblHeader")?),
            _ => TrPrItem::Other(read_element(child)),
        };
        items.push(item);
    }
    Ok(TrPr::new(items))
}

fn read_on_off(node: Node<'_, '_>, element: &'static str) -> Result<OnOff, WordXmlError> {
    let val = match w_attr(node, "val") {
        Some(raw) => Some(OnOff::parse_val(raw).ok_or_else(|| invalid(element, "w:val", raw))?),
        None => None,
    };
    Ok(OnOff { val })
}

fn read_cell(node: Node<'_, '_>) -> Result<CtTc, WordXmlError> {
    let mut tc_pr = None;
    let mut content = Vec::new();
    for child in node.children().filter(Node::is_element) {
        if w_local(child) == Some("tcPr") {
            tc_pr = Some(read_tc_pr(child)?);
        } else {
            content.push(read_element(child));
        }
    }
    Ok(CtTc::from_parts(tc_pr, content))
}

fn read_tc_pr(node: Node<'_, '_>) -> Result<TcPr, WordXmlError> {
    let mut items = Vec::new();
    for child in node.children().filter(Node::is_element) {
        let item = match (w_local(child), w_attr(child, "val")) {
            (Some("gridSpan"), Some(raw)) => TcPrItem::GridSpan(
                raw.trim()
                    .parse()
                    .map_err(|_| invalid("w:gridSpan", "w:val", raw))?,
            ),
            _ => TcPrItem::Other(read_element(child)),
        };
        items.push(item);
    }
    Ok(TcPr::new(items))
}

fn read_sdt_cell(node: Node<'_, '_>) -> Result<CtSdtCell, WordXmlError> {
    let mut sdt_pr = None;
    let mut end_pr = None;
    let mut content = Vec::new();
    for child in node.children().filter(Node::is_element) {
        match w_local(child) {
            Some("sdtPr") => sdt_pr = Some(read_sdt_pr(child)),
            Some("sdtEndPr") => end_pr = Some(read_element(child)),
            Some("sdtContent") => {
                for item in child.children().filter(Node::is_element) {
                    content.push(read_row_item(item)?);
                }
            }
            _ => log::warn!("dropping unexpected <{}> in w:sdt", qualified_name(child)),
        }
    }
    Ok(CtSdtCell::from_parts(sdt_pr, end_pr, content))
}

fn read_sdt_pr(node: Node<'_, '_>) -> SdtPr {
    let items = node
        .children()
        .filter(Node::is_element)
        .map(|child| match (w_local(child), w_attr(child, "val")) {
            (Some("tag"), Some(val)) => SdtPrItem::Tag(val.to_string()),
            (Some("alias"), Some(val)) => SdtPrItem::Alias(val.to_string()),
            _ => SdtPrItem::Other(read_element(child)),
        })
        .collect();
    SdtPr::new(items)
}

fn read_element(node: Node<'_, '_>) -> XmlElement {
    let keep_space = matches!(w_local(node), Some("t" | "delText" | "instrText"));
    let mut el = XmlElement::new(qualified_name(node));
    el.attrs = read_attrs(node);
    for child in node.children() {
        if child.is_element() {
            el.children.push(XmlContent::Element(read_element(child)));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if keep_space || !text.trim().is_empty() {
                el.children.push(XmlContent::Text(text.to_string()));
            }
        }
    }
    el
}

fn read_attrs(node: Node<'_, '_>) -> Vec<(String, String)> {
    node.attributes()
        .map(|attr| {
            let name = match attr.namespace() {
                Some(W_NS) => format!("w:{}", attr.name()),
                Some(XML_NS) => format!("xml:{}", attr.name()),
                Some(ns) => match node.lookup_prefix(ns) {
                    Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
                    _ => attr.name().to_string(),
                },
                None => attr.name().to_string(),
            };
            (name, attr.value().to_string())
        })
        .collect()
}

/// `w:`-qualified for WordprocessingML elements, otherwise the prefix used in the source.
fn qualified_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(W_NS) => format!("w:{}", tag.name()),
        Some(ns) => match node.lookup_prefix(ns) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", tag.name()),
            _ => tag.name().to_string(),
        },
        None => tag.name().to_string(),
    }
}

fn w_local<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    let tag = node.tag_name();
    (node.is_element() && tag.namespace() == Some(W_NS)).then(|| tag.name())
}

fn w_attr<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attribute((W_NS, local))
}

fn invalid(element: &'static str, attribute: &'static str, value: &str) -> WordXmlError {
    WordXmlError::InvalidAttribute {
        element,
        attribute,
        value: value.to_string(),
    }
}
