use pretty_assertions::assert_eq;
use proptest::prelude::*;
use wordml_model::{
    BodyType, CtRow, CtSdtCell, CtTc, MergeError, NodeId, RowItem, RowItemKind, Table, TableRow,
};

/// One row whose cells read "c0", "c1", ...
fn tagged_table(cells: usize) -> Table {
    let items = (0..cells)
        .map(|i| {
            let mut tc = CtTc::new();
            tc.set_text(&format!("c{i}"));
            RowItem::Cell(tc)
        })
        .collect();
    let mut table = Table::new(BodyType::Document);
    table.add_row_node(CtRow::from_parts(Vec::new(), None, None, items));
    table
}

fn texts(row: &TableRow) -> Vec<String> {
    (0..row.cell_count())
        .map(|i| row.cell(i).expect("cell").text())
        .collect()
}

fn spans(row: &TableRow) -> Vec<u32> {
    (0..row.cell_count())
        .map(|i| row.cell(i).expect("cell").grid_span())
        .collect()
}

#[test]
fn merge_keeps_the_start_cell_and_spans_the_range() {
    let mut table = tagged_table(5);
    let mut row = table.row_mut(0).unwrap();
    let survivor: NodeId = row.cells()[1].node_id();

    row.merge_cells(1, 3).unwrap();

    assert_eq!(texts(&row), vec!["c0", "c1", "c4"]);
    assert_eq!(spans(&row), vec![1, 3, 1]);
    assert_eq!(row.cells()[1].node_id(), survivor);
    assert_eq!(row.node().size_of_tc_array(), 3);
    assert_eq!(row.node().tc(1).and_then(|tc| tc.tc_pr()?.grid_span()), Some(3));
}

#[test]
fn merging_the_whole_row_leaves_one_cell() {
    let mut table = tagged_table(4);
    let mut row = table.row_mut(0).unwrap();
    row.merge_cells(0, 3).unwrap();
    assert_eq!(texts(&row), vec!["c0"]);
    assert_eq!(spans(&row), vec![4]);
}

#[test]
fn repeated_merges_overwrite_the_span() {
    let mut table = tagged_table(5);
    let mut row = table.row_mut(0).unwrap();

    row.merge_cells(0, 1).unwrap();
    assert_eq!(spans(&row), vec![2, 1, 1, 1]);

    row.merge_cells(0, 1).unwrap();
    assert_eq!(texts(&row), vec!["c0", "c3", "c4"]);
    assert_eq!(spans(&row), vec![2, 1, 1]);

    row.merge_cells(0, 2).unwrap();
    assert_eq!(spans(&row), vec![3]);
}

#[test]
fn merge_overwrites_a_span_read_from_the_document() {
    let mut table = tagged_table(3);
    let mut row = table.row_mut(0).unwrap();
    row.cell_mut(0).unwrap().tc_pr_or_insert().set_grid_span(7);

    row.merge_cells(0, 1).unwrap();
    assert_eq!(spans(&row), vec![2, 1]);
}

#[test]
fn start_equal_to_end_is_rejected() {
    let mut table = tagged_table(5);
    let mut row = table.row_mut(0).unwrap();
    assert_eq!(
        row.merge_cells(2, 2),
        Err(MergeError::StartNotBeforeEnd { start: 2, end: 2 })
    );
    assert_eq!(
        row.merge_cells(3, 1),
        Err(MergeError::StartNotBeforeEnd { start: 3, end: 1 })
    );
}

#[test]
fn end_past_the_last_cell_is_rejected() {
    let mut table = tagged_table(5);
    let mut row = table.row_mut(0).unwrap();
    let err = row.merge_cells(0, 10).unwrap_err();
    assert_eq!(
        err,
        MergeError::OutOfBounds {
            start: 0,
            end: 10,
            len: 5
        }
    );
    assert_eq!(err.to_string(), "merge range 0..=10 is outside the row's 5 cells");
    assert!(row.merge_cells(0, 5).is_err());
}

#[test]
fn rejected_merges_do_not_touch_the_row() {
    let mut table = tagged_table(5);
    let mut row = table.row_mut(0).unwrap();
    let before = row.cells().to_vec();

    let _ = row.merge_cells(2, 2);
    let _ = row.merge_cells(1, 9);

    assert_eq!(row.cells(), before.as_slice());
    assert_eq!(spans(&row), vec![1; 5]);
    assert!(row.node().tcs().all(|tc| !tc.is_set_tc_pr()));
}

#[test]
fn merge_counts_only_plain_cells_and_keeps_other_children() {
    let mut tc = CtTc::new();
    tc.set_text("wrapped");
    let items = vec![
        RowItem::Cell(CtTc::new()),
        RowItem::SdtCell(CtSdtCell::from_parts(None, None, vec![RowItem::Cell(tc)])),
        RowItem::Cell(CtTc::new()),
        RowItem::Cell(CtTc::new()),
    ];
    let mut table = Table::new(BodyType::Document);
    let mut row = table.add_row_node(CtRow::from_parts(Vec::new(), None, None, items));

    row.merge_cells(0, 1).unwrap();

    let kinds: Vec<_> = row.node().items().iter().map(RowItem::kind).collect();
    assert_eq!(
        kinds,
        vec![RowItemKind::Cell, RowItemKind::SdtCell, RowItemKind::Cell]
    );
    assert_eq!(spans(&row), vec![2, 1]);
    assert_eq!(row.all_row_content()[1].text(), "wrapped");
}

proptest! {
    #[test]
    fn merge_removes_exactly_the_inner_range(
        (len, start, end) in (2usize..12).prop_flat_map(|len| {
            (Just(len), 0..len - 1).prop_flat_map(|(len, start)| (Just(len), Just(start), start + 1..len))
        })
    ) {
        let mut table = tagged_table(len);
        let mut row = table.row_mut(0).unwrap();
        let ids: Vec<NodeId> = row.cells().iter().map(|c| c.node_id()).collect();

        row.merge_cells(start, end).unwrap();

        let expected: Vec<NodeId> = ids[..=start].iter().chain(&ids[end + 1..]).copied().collect();
        let actual: Vec<NodeId> = row.cells().iter().map(|c| c.node_id()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(row.cell_count(), len - (end - start));
        prop_assert_eq!(row.cell(start).unwrap().grid_span() as usize, end - start + 1);
    }
}
