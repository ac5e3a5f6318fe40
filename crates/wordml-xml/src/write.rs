use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use wordml_model::{
    CtRow, CtSdtCell, CtTc, Namespace, OnOff, RowItem, SdtPrItem, Table, TableRow, TcPrItem,
    TrPrItem, XmlContent, XmlElement, W_NS,
};

use crate::WordXmlError;

/// Output settings for the fragment writers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Emit `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>` first.
    pub xml_declaration: bool,
    /// Indent nested elements by this many spaces; compact output when `None`.
    pub indent: Option<usize>,
}

/// Serialize a table as a `<w:tbl>` fragment.
pub fn write_table_xml(table: &Table, options: &WriteOptions) -> Result<String, WordXmlError> {
    let mut writer = new_writer(options)?;

    let mut start = BytesStart::new("w:tbl");
    for (name, uri) in namespace_attrs(table.namespaces()) {
        start.push_attribute((name.as_str(), uri.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    if let Some(tbl_pr) = table.tbl_pr() {
        write_element(&mut writer, tbl_pr)?;
    }
    if let Some(tbl_grid) = table.tbl_grid() {
        write_element(&mut writer, tbl_grid)?;
    }
    for el in table.other_elements() {
        write_element(&mut writer, el)?;
    }
    for row in table.rows() {
        write_row(&mut writer, row.node(), &[])?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Serialize one row as a standalone `<w:tr>` fragment.
///
/// `xmlns:w` is declared on the fragment. Other namespaces are only declared if the row
/// carries them as `xmlns` attributes, as rows from [`crate::read_row_xml`] do; rows taken
/// from a table rely on the table's declarations and should be written with it.
pub fn write_row_xml(row: &TableRow, options: &WriteOptions) -> Result<String, WordXmlError> {
    let mut writer = new_writer(options)?;
    write_row(&mut writer, row.node(), &namespace_attrs(&[]))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn new_writer(options: &WriteOptions) -> Result<Writer<Vec<u8>>, WordXmlError> {
    let mut writer = match options.indent {
        Some(size) => Writer::new_with_indent(Vec::new(), b' ', size),
        None => Writer::new(Vec::new()),
    };
    if options.xml_declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    }
    Ok(writer)
}

/// `xmlns` attributes for a fragment root; `w:` is always declared.
fn namespace_attrs(namespaces: &[Namespace]) -> Vec<(String, String)> {
    let mut attrs = Vec::with_capacity(namespaces.len() + 1);
    if !namespaces
        .iter()
        .any(|ns| ns.prefix.as_deref() == Some("w"))
    {
        attrs.push(("xmlns:w".to_string(), W_NS.to_string()));
    }
    for ns in namespaces {
        let name = match &ns.prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        attrs.push((name, ns.uri.clone()));
    }
    attrs
}

fn write_row<W: Write>(
    writer: &mut Writer<W>,
    row: &CtRow,
    extra_attrs: &[(String, String)],
) -> Result<(), WordXmlError> {
    let mut start = BytesStart::new("w:tr");
    for (name, value) in extra_attrs.iter().chain(row.attrs()) {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    if let Some(tbl_pr_ex) = row.tbl_pr_ex() {
        write_element(writer, tbl_pr_ex)?;
    }
    if let Some(tr_pr) = row.tr_pr() {
        if tr_pr.items().is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("w:trPr")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("w:trPr")))?;
            for item in tr_pr.items() {
                match item {
                    TrPrItem::Height(height) => {
                        let mut el = BytesStart::new("w:trHeight");
                        if let Some(val) = height.val {
                            el.push_attribute(("w:val", val.to_string().as_str()));
                        }
                        if let Some(rule) = height.rule {
                            el.push_attribute(("w:hRule", rule.as_str()));
                        }
                        writer.write_event(Event::Empty(el))?;
                    }
                    TrPrItem::CantSplit(v) => write_on_off(writer, "w:cantSplit", *v)?,
                    TrPrItem::TblHeader(v) => write_on_off(writer, "w:tblHeader", *v)?,
                    TrPrItem::Other(el) => write_element(writer, el)?,
                }
            }
            writer.write_event(Event::End(BytesEnd::new("w:trPr")))?;
        }
    }
    for item in row.items() {
        write_row_item(writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
    Ok(())
}

fn write_row_item<W: Write>(writer: &mut Writer<W>, item: &RowItem) -> Result<(), WordXmlError> {
    match item {
        RowItem::Cell(tc) => write_cell(writer, tc),
        RowItem::SdtCell(sdt) => write_sdt_cell(writer, sdt),
        RowItem::Other(el) => write_element(writer, el),
    }
}

fn write_on_off<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: OnOff,
) -> Result<(), WordXmlError> {
    let mut el = BytesStart::new(name);
    if let Some(val) = value.val {
        el.push_attribute(("w:val", if val { "true" } else { "false" }));
    }
    writer.write_event(Event::Empty(el))?;
    Ok(())
}

fn write_val<W: Write>(writer: &mut Writer<W>, name: &str, val: &str) -> Result<(), WordXmlError> {
    let mut el = BytesStart::new(name);
    el.push_attribute(("w:val", val));
    writer.write_event(Event::Empty(el))?;
    Ok(())
}

fn write_cell<W: Write>(writer: &mut Writer<W>, tc: &CtTc) -> Result<(), WordXmlError> {
    writer.write_event(Event::Start(BytesStart::new("w:tc")))?;
    if let Some(tc_pr) = tc.tc_pr() {
        if tc_pr.items().is_empty() {
            writer.write_event(Event::Empty(BytesStart::new("w:tcPr")))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new("w:tcPr")))?;
            for item in tc_pr.items() {
                match item {
                    TcPrItem::GridSpan(span) => {
                        let mut el = BytesStart::new("w:gridSpan");
                        el.push_attribute(("w:val", span.to_string().as_str()));
                        writer.write_event(Event::Empty(el))?;
                    }
                    TcPrItem::Other(el) => write_element(writer, el)?,
                }
            }
            writer.write_event(Event::End(BytesEnd::new("w:tcPr")))?;
        }
    }
    for el in tc.content() {
        write_element(writer, el)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
    Ok(())
}

fn write_sdt_cell<W: Write>(writer: &mut Writer<W>, sdt: &CtSdtCell) -> Result<(), WordXmlError> {
    writer.write_event(Event::Start(BytesStart::new("w:sdt")))?;
    if let Some(pr) = sdt.sdt_pr() {
        writer.write_event(Event::Start(BytesStart::new("w:sdtPr")))?;
        for item in pr.items() {
            match item {
                SdtPrItem::Alias(val) => write_val(writer, "w:alias", val)?,
                SdtPrItem::Tag(val) => write_val(writer, "w:tag", val)?,
                SdtPrItem::Other(el) => write_element(writer, el)?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new("w:sdtPr")))?;
    }
    if let Some(end_pr) = sdt.end_pr() {
        write_element(writer, end_pr)?;
    }
    writer.write_event(Event::Start(BytesStart::new("w:sdtContent")))?;
    for item in sdt.content() {
        write_row_item(writer, item)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:sdtContent")))?;
    writer.write_event(Event::End(BytesEnd::new("w:sdt")))?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, el: &XmlElement) -> Result<(), WordXmlError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (name, value) in &el.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        match child {
            XmlContent::Element(child) => write_element(writer, child)?,
            XmlContent::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn w_namespace_is_declared_once() {
        let attrs = namespace_attrs(&[Namespace::new(Some("w"), W_NS)]);
        assert_eq!(attrs, vec![("xmlns:w".to_string(), W_NS.to_string())]);

        let attrs = namespace_attrs(&[]);
        assert_eq!(attrs, vec![("xmlns:w".to_string(), W_NS.to_string())]);
    }

    #[test]
    fn on_off_without_value_is_written_bare() {
        let mut writer = Writer::new(Vec::new());
        write_on_off(&mut writer, "w:cantSplit", OnOff::default()).unwrap();
        write_on_off(&mut writer, "w:tblHeader", OnOff::new(false)).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, r#"<w:cantSplit/><w:tblHeader w:val="false"/>"#);
    }
}
