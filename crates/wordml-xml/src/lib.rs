//! XML reader/writer for `wordml-model` tables.
//!
//! Reads `<w:tbl>` and `<w:tr>` fragments with `roxmltree` and writes them back with
//! `quick-xml`. Row properties, cell properties and row-level content controls are parsed
//! into typed model nodes; everything else is carried through as opaque elements.
//!
//! ```
//! use wordml_model::{BodyType, Table};
//! use wordml_xml::{read_table_xml, write_table_xml, WriteOptions};
//!
//! let xml = r#"<w:tbl xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
//!   <w:tr><w:trPr><w:tblHeader/></w:trPr><w:tc><w:p/></w:tc></w:tr>
//! </w:tbl>"#;
//! let table = Table::from_node(read_table_xml(xml)?, BodyType::Document);
//! assert!(table.is_repeat_header(0));
//!
//! let out = write_table_xml(&table, &WriteOptions::default())?;
//! assert!(out.contains("<w:tblHeader/>"));
//! # Ok::<(), wordml_xml::WordXmlError>(())
//! ```

mod error;
mod read;
mod write;

pub use error::WordXmlError;
pub use read::{read_row_xml, read_table_xml};
pub use write::{write_row_xml, write_table_xml, WriteOptions};
