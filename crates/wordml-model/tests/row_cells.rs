use pretty_assertions::assert_eq;
use wordml_model::{
    BodyType, CtRow, CtSdtCell, CtTc, RowContent, RowItem, RowItemKind, SdtPr, SdtPrItem, Table,
    XmlElement,
};

fn text_cell(text: &str) -> CtTc {
    let mut tc = CtTc::new();
    tc.set_text(text);
    tc
}

fn table_with_row(items: Vec<RowItem>) -> Table {
    let mut table = Table::new(BodyType::Document);
    table.add_row_node(CtRow::from_parts(Vec::new(), None, None, items));
    table
}

fn cell_texts(table: &Table, row: usize) -> Vec<String> {
    let row = table.row(row).expect("row");
    (0..row.cell_count())
        .map(|i| row.cell(i).expect("cell").text())
        .collect()
}

#[test]
fn cells_mirror_the_row_nodes_tc_children() {
    let table = table_with_row(vec![
        RowItem::Cell(text_cell("a")),
        RowItem::Other(XmlElement::new("w:bookmarkStart").with_attr("w:id", "0")),
        RowItem::Cell(text_cell("b")),
        RowItem::Cell(text_cell("c")),
    ]);
    let row = table.row(0).unwrap();

    assert_eq!(row.cells().len(), row.node().size_of_tc_array());
    for (i, cell) in row.cells().iter().enumerate() {
        assert_eq!(Some(cell.node_id()), row.node().tc(i).map(CtTc::id));
        assert_eq!(cell.row_id(), row.id());
        assert_eq!(cell.body(), BodyType::Document);
    }
    assert_eq!(cell_texts(&table, 0), vec!["a", "b", "c"]);

    let c = row.cell(2).unwrap();
    assert_eq!(c.index(), 2);
    assert_eq!(c.item_index(), 3);
    assert_eq!(c.row().id(), row.id());
}

#[test]
fn cells_returns_the_cached_list() {
    let table = table_with_row(vec![RowItem::Cell(CtTc::new()), RowItem::Cell(CtTc::new())]);
    let row = table.row(0).unwrap();
    let first = row.cells().as_ptr();
    assert_eq!(row.cells().as_ptr(), first);
}

#[test]
fn cell_out_of_range_is_none() {
    let table = table_with_row(vec![RowItem::Cell(CtTc::new())]);
    let row = table.row(0).unwrap();
    assert!(row.cell(0).is_some());
    assert!(row.cell(1).is_none());
    assert!(row.cell(usize::MAX).is_none());
}

#[test]
fn create_cell_appends_one_cell_at_the_end() {
    let mut table = table_with_row(vec![RowItem::Cell(text_cell("a"))]);
    let mut row = table.row_mut(0).unwrap();
    assert_eq!(row.cells().len(), 1);

    let created = row.create_cell();
    assert_eq!(row.cells().len(), 2);
    assert_eq!(row.cells().last(), Some(&created));
    assert_eq!(row.node().tc(1).map(CtTc::id), Some(created.node_id()));
    assert_eq!(row.cell(1).unwrap().text(), "");

    let added = row.add_cell_at_end();
    assert_eq!(row.cells().len(), 3);
    assert_eq!(row.cells()[2], added);
    assert_ne!(added, created);
}

#[test]
fn created_cells_are_appended_after_trailing_items() {
    let mut table = table_with_row(vec![
        RowItem::Cell(CtTc::new()),
        RowItem::Other(XmlElement::new("w:bookmarkEnd")),
    ]);
    let mut row = table.row_mut(0).unwrap();
    row.create_cell();
    let kinds: Vec<_> = row.node().items().iter().map(RowItem::kind).collect();
    assert_eq!(
        kinds,
        vec![RowItemKind::Cell, RowItemKind::Other, RowItemKind::Cell]
    );
}

#[test]
fn remove_cell_updates_node_and_cache_together() {
    let mut table = table_with_row(vec![
        RowItem::Cell(text_cell("a")),
        RowItem::Cell(text_cell("b")),
        RowItem::Cell(text_cell("c")),
    ]);
    let mut row = table.row_mut(0).unwrap();
    let b = row.cells()[1];

    assert_eq!(row.remove_cell(1), Some(b));
    assert_eq!(row.cells().len(), 2);
    assert_eq!(row.node().size_of_tc_array(), 2);
    assert_eq!(cell_texts(&table, 0), vec!["a", "c"]);
}

#[test]
fn remove_cell_before_first_read_still_rebuilds_correctly() {
    let mut table = table_with_row(vec![RowItem::Cell(text_cell("a")), RowItem::Cell(text_cell("b"))]);
    let mut row = table.row_mut(0).unwrap();
    assert!(row.remove_cell(0).is_some());
    assert_eq!(row.cells().len(), 1);
    assert_eq!(cell_texts(&table, 0), vec!["b"]);
}

#[test]
fn remove_cell_out_of_range_reports_not_found_and_leaves_row_alone() {
    let mut table = table_with_row(vec![RowItem::Cell(text_cell("a"))]);
    let mut row = table.row_mut(0).unwrap();
    assert_eq!(row.remove_cell(1), None);
    assert_eq!(row.remove_cell(42), None);
    assert_eq!(row.cells().len(), 1);
    assert_eq!(cell_texts(&table, 0), vec!["a"]);
}

#[test]
fn find_cell_for_only_matches_this_rows_cells() {
    let mut table = table_with_row(vec![RowItem::Cell(text_cell("a")), RowItem::Cell(text_cell("b"))]);
    table.create_row();

    let row0 = table.row(0).unwrap();
    let row1 = table.row(1).unwrap();
    let node = row0.node().tc(1).unwrap();

    assert_eq!(row0.find_cell_for(node), Some(row0.cells()[1]));
    assert_eq!(row1.find_cell_for(node), None);

    let detached = node.copy();
    assert_eq!(row0.find_cell_for(&detached), None);
}

#[test]
fn all_row_content_tags_plain_and_sdt_cells_in_document_order() {
    let sdt = CtSdtCell::from_parts(
        Some(SdtPr::new(vec![
            SdtPrItem::Alias("Price".into()),
            SdtPrItem::Tag("price".into()),
        ])),
        None,
        vec![RowItem::Cell(text_cell("9.99")), RowItem::Cell(text_cell("EUR"))],
    );
    let table = table_with_row(vec![
        RowItem::Cell(text_cell("item")),
        RowItem::Other(XmlElement::new("w:permStart")),
        RowItem::SdtCell(sdt),
        RowItem::Cell(text_cell("qty")),
    ]);
    let row = table.row(0).unwrap();

    // The plain view does not see the wrapped cells.
    assert_eq!(row.cells().len(), 2);

    let content = row.all_row_content();
    let kinds: Vec<_> = content.iter().map(RowContent::kind).collect();
    assert_eq!(
        kinds,
        vec![RowItemKind::Cell, RowItemKind::SdtCell, RowItemKind::Cell]
    );
    let item_indexes: Vec<_> = content.iter().map(RowContent::item_index).collect();
    assert_eq!(item_indexes, vec![0, 2, 3]);
    assert!(content.iter().all(|c| c.row_id() == row.id()));

    match content[1] {
        RowContent::SdtCell(sdt) => {
            assert_eq!(sdt.tag(), Some("price"));
            assert_eq!(sdt.title(), Some("Price"));
            assert_eq!(sdt.text(), "9.99\nEUR");
            assert_eq!(sdt.node().cells().len(), 2);
        }
        RowContent::Cell(_) => panic!("expected a structured tag cell"),
    }
    match content[2] {
        RowContent::Cell(cell) => {
            assert_eq!(cell.index(), 1);
            assert_eq!(cell.handle(), row.cells()[1]);
            assert_eq!(cell.text(), "qty");
        }
        RowContent::SdtCell(_) => panic!("expected a plain cell"),
    }
}

#[test]
fn all_row_content_is_rebuilt_after_mutation() {
    let mut table = table_with_row(vec![RowItem::Cell(CtTc::new())]);
    assert_eq!(table.row(0).unwrap().all_row_content().len(), 1);
    table.row_mut(0).unwrap().create_cell();
    assert_eq!(table.row(0).unwrap().all_row_content().len(), 2);
}

#[test]
fn cell_mut_edits_content_without_touching_the_cache() {
    let mut table = table_with_row(vec![RowItem::Cell(CtTc::new())]);
    let mut row = table.row_mut(0).unwrap();
    let before = row.cells().to_vec();
    row.cell_mut(0).unwrap().set_text("edited");
    assert!(row.cell_mut(1).is_none());
    assert_eq!(row.cells(), before.as_slice());
    assert_eq!(row.cell(0).unwrap().text(), "edited");
}

#[test]
fn edited_cells_keep_the_identity_the_cache_refers_to() {
    let mut table = table_with_row(vec![RowItem::Cell(text_cell("a")), RowItem::Cell(text_cell("b"))]);
    let mut row = table.row_mut(0).unwrap();
    let cached = row.cells().to_vec();

    {
        let mut cell = row.cell_mut(0).unwrap();
        cell.content_mut().clear();
        cell.content_mut().push(XmlElement::new("w:p"));
        cell.tc_pr_or_insert().set_grid_span(2);
        cell.set_text("replaced");
        assert_eq!(cell.id(), cached[0].node_id());
    }

    let node = row.node().tc(0).unwrap();
    assert_eq!(row.find_cell_for(node), Some(cached[0]));
    let cell = row.cell(0).unwrap();
    assert_eq!(cell.handle(), cached[0]);
    assert_eq!(cell.text(), "replaced");
    assert_eq!(cell.grid_span(), 2);
    assert_eq!(row.cells(), cached.as_slice());
}
