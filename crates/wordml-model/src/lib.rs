//! `wordml-model` defines the in-memory WordprocessingML table structures.
//!
//! A [`Table`] owns its [`TableRow`]s; each row owns its `<w:tr>` node ([`CtRow`]) and a
//! lazily built list of [`TableCell`] handles that always mirrors the node's `<w:tc>`
//! children. Cells wrapped in row-level structured document tags are reachable through
//! [`TableRow::all_row_content`].
//!
//! Reading and writing XML lives in `wordml-xml`; this crate does no I/O.

mod cell;
mod merge;
pub mod node;
pub mod props;
mod row;
mod sdt;
mod table;

pub use cell::{CellMut, CellRef, CtTc, TableCell};
pub use merge::MergeError;
pub use node::{Namespace, NodeId, OnOff, XmlContent, XmlElement, W_NS};
pub use props::{Height, HeightRule, TcPr, TcPrItem, TrPr, TrPrItem};
pub use row::{CtRow, RowContent, RowItem, RowItemKind, TableRow};
pub use sdt::{CtSdtCell, SdtCellRef, SdtPr, SdtPrItem};
pub use table::{BodyType, CtTbl, RowMut, RowRef, Table, TableError};

fn new_uuid() -> uuid::Uuid {
    #[cfg(not(target_arch = "wasm32"))]
    {
        uuid::Uuid::new_v4()
    }

    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(1);
        uuid::Uuid::from_u128(COUNTER.fetch_add(1, Ordering::Relaxed) as u128)
    }
}
