mod common;

use cob_cart::CoverageError;
use cob_cart::io::sheet_read::{parse_primary, parse_target};
use cob_cart::layout::{ColumnSchema, HEADER_ROW_OFFSET, SheetLayout};
use cob_cart::model::{CellValue, FilterSelection, RawSheet, Selection};
use cob_cart::pipeline::Dashboard;
use cob_cart::validate::validate;
use common::Fixture;
use rust_xlsxwriter::Workbook;

fn dashboard(fixture: &Fixture) -> Dashboard {
    Dashboard::from_bytes(
        &fixture.bytes(),
        &SheetLayout::default(),
        &ColumnSchema::default(),
    )
    .expect("dashboard built")
}

fn rep_ids(view: &cob_cart::pipeline::DashboardView) -> Vec<&str> {
    view.records
        .iter()
        .map(|metric| metric.record.rep_id.as_str())
        .collect()
}

#[test]
fn primary_sheet_skips_banner_rows_and_keeps_raw_headers() {
    let sheet = parse_primary(&Fixture::default().bytes(), HEADER_ROW_OFFSET).expect("sheet parsed");

    assert_eq!(sheet.columns, common::HEADERS.to_vec());
    assert_eq!(sheet.rows.len(), 6);
    assert_eq!(sheet.rows[0].sheet_row, 9);
    assert_eq!(sheet.rows[0].cells[0], CellValue::Number(101.0));
    assert_eq!(sheet.rows[3].cells[0], CellValue::Empty);
}

#[test]
fn header_offset_counts_blank_leading_rows() {
    let fixture = Fixture {
        banner: false,
        ..Fixture::default()
    };
    let sheet = parse_primary(&fixture.bytes(), HEADER_ROW_OFFSET).expect("sheet parsed");

    assert_eq!(sheet.columns[0], " Rep ");
    assert_eq!(sheet.rows.len(), 6);
}

#[test]
fn blank_and_repeated_headers_are_disambiguated() {
    let fixture = Fixture {
        headers: vec!["Rep", "", "Rep", "Saldo de Carteira", "cobertura"],
        ..Fixture::default()
    };
    let sheet = parse_primary(&fixture.bytes(), HEADER_ROW_OFFSET).expect("sheet parsed");

    assert_eq!(
        sheet.columns,
        vec!["Rep", "Unnamed: 1", "Rep.1", "Saldo de Carteira", "cobertura"]
    );
}

#[test]
fn validation_trims_drops_null_keys_and_sorts_by_balance() {
    let sheet = parse_primary(&Fixture::default().bytes(), HEADER_ROW_OFFSET).expect("sheet parsed");
    let dataset = validate(&sheet, &ColumnSchema::default()).expect("sheet validated");

    let ids: Vec<&str> = dataset.records.iter().map(|r| r.rep_id.as_str()).collect();
    assert_eq!(ids, vec!["102", "101", "103", "104"]);
    assert_eq!(dataset.dropped_rows, 2);
    assert!(dataset.has_supervisor);
    assert_eq!(dataset.columns[0], "Rep");
    assert_eq!(dataset.records[0].rep_name, "Bruno");
    assert_eq!(dataset.records[3].supervisor, None);
}

#[test]
fn missing_required_column_reports_required_and_present_names() {
    let fixture = Fixture {
        headers: vec!["Rep", "Nome Rep.", "Supervisor", "Saldo de Carteira", "Positivados"],
        ..Fixture::default()
    };
    let sheet = parse_primary(&fixture.bytes(), HEADER_ROW_OFFSET).expect("sheet parsed");
    let error = validate(&sheet, &ColumnSchema::default()).expect_err("schema rejected");

    match &error {
        CoverageError::Schema {
            required,
            present,
            missing,
        } => {
            assert_eq!(missing, &vec!["cobertura".to_string()]);
            assert_eq!(required.len(), 4);
            assert!(present.contains(&"Positivados".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = error.to_string();
    assert!(message.contains("cobertura"));
    assert!(message.contains("Positivados"));
}

#[test]
fn supervisor_column_is_optional() {
    let fixture = Fixture {
        headers: vec!["Rep", "Nome Rep.", "Regional", "Saldo de Carteira", "cobertura"],
        ..Fixture::default()
    };
    let dashboard = dashboard(&fixture);
    assert!(!dashboard.dataset().has_supervisor);

    let selection = FilterSelection {
        supervisors: Selection::Only(["Carlos".to_string()].into()),
        representatives: Selection::All,
    };
    let view = dashboard.view(&selection);
    assert_eq!(view.records.len(), 4);
    assert!(view.supervisor_options.is_empty());
}

#[test]
fn non_numeric_balance_is_rejected_with_its_row() {
    let mut sheet =
        parse_primary(&Fixture::default().bytes(), HEADER_ROW_OFFSET).expect("sheet parsed");
    sheet.rows[1].cells[3] = CellValue::Text("duzentos".into());

    match validate(&sheet, &ColumnSchema::default()) {
        Err(CoverageError::InvalidValue { row, column, value }) => {
            assert_eq!(row, 10);
            assert_eq!(column, "Saldo de Carteira");
            assert_eq!(value, "duzentos");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn default_view_covers_every_valid_record() {
    let view = dashboard(&Fixture::default()).view(&FilterSelection::default());

    assert_eq!(rep_ids(&view), vec!["102", "101", "103", "104"]);
    assert_eq!(view.aggregate.total_balance, 350.0);
    assert_eq!(view.aggregate.total_covered, 125.0);
    assert_eq!(view.aggregate.coverage_pct, Some(35.7));
    assert_eq!(view.records[2].coverage_pct, Some(50.0));
    assert_eq!(view.records[3].coverage_pct, None);
    assert_eq!(view.target_fraction, Some(0.45));
    assert_eq!(view.target_error, None);
    assert_eq!(view.dropped_rows, 2);
    assert_eq!(view.supervisor_options, vec!["Carlos", "Dora"]);
}

#[test]
fn supervisor_filter_cascades_into_representative_options() {
    let dashboard = dashboard(&Fixture::default());
    let selection = FilterSelection {
        supervisors: Selection::Only(["Carlos".to_string()].into()),
        representatives: Selection::All,
    };
    let view = dashboard.view(&selection);

    assert_eq!(rep_ids(&view), vec!["102", "101"]);
    assert_eq!(view.representative_options, vec!["102", "101"]);
    assert_eq!(view.aggregate.coverage_pct, Some(33.3));
}

#[test]
fn empty_selection_shows_nothing() {
    let view = dashboard(&Fixture::default()).view(&FilterSelection::nothing());

    assert!(view.records.is_empty());
    assert_eq!(view.aggregate.total_balance, 0.0);
    assert_eq!(view.aggregate.coverage_pct, None);
}

#[test]
fn missing_target_sheet_leaves_primary_data_intact() {
    let fixture = Fixture {
        target: None,
        ..Fixture::default()
    };
    let bytes = fixture.bytes();

    match parse_target(&bytes, "Meta", 1, 1) {
        Err(CoverageError::SheetNotFound { sheet, available }) => {
            assert_eq!(sheet, "Meta");
            assert_eq!(available, vec!["Base".to_string()]);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let dashboard =
        Dashboard::from_bytes(&bytes, &SheetLayout::default(), &ColumnSchema::default())
            .expect("primary pipeline still succeeds");
    assert!(matches!(
        dashboard.target(),
        Err(CoverageError::SheetNotFound { .. })
    ));
    let view = dashboard.view(&FilterSelection::default());
    assert_eq!(view.records.len(), 4);
    assert_eq!(view.target_fraction, None);
    assert!(view.target_error.is_some());
}

#[test]
fn target_is_returned_as_a_raw_fraction() {
    let bytes = Fixture::default().bytes();
    assert_eq!(parse_target(&bytes, "Meta", 1, 1).expect("target read"), 0.45);
}

#[test]
fn target_outside_sheet_is_out_of_range() {
    let bytes = Fixture::default().bytes();
    assert!(matches!(
        parse_target(&bytes, "Meta", 40, 1),
        Err(CoverageError::CellOutOfRange { row: 40, column: 1, .. })
    ));
    assert!(matches!(
        parse_target(&bytes, "Meta", 1, 9),
        Err(CoverageError::CellOutOfRange { .. })
    ));
}

#[test]
fn text_target_is_a_type_mismatch() {
    let bytes = Fixture::default().bytes();
    match parse_target(&bytes, "Meta", 1, 0) {
        Err(CoverageError::TypeMismatch { found, .. }) => {
            assert!(found.contains("Cobertura ideal"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn garbage_payload_fails_to_parse() {
    let result = Dashboard::from_bytes(
        b"<html>not a workbook</html>",
        &SheetLayout::default(),
        &ColumnSchema::default(),
    );
    assert!(matches!(result, Err(CoverageError::ExcelRead(_))));
}

#[test]
fn whitespace_is_null_and_numeric_text_is_accepted() {
    let columns = ["Rep", "Nome Rep.", "Saldo de Carteira", "cobertura"]
        .map(String::from)
        .to_vec();
    let sheet = RawSheet::from_rows(
        columns,
        vec![
            vec![
                CellValue::Text(" 88 ".into()),
                CellValue::Text("Gil".into()),
                CellValue::Text("40".into()),
                CellValue::Number(10.0),
            ],
            vec![
                CellValue::Text("   ".into()),
                CellValue::Text("Hugo".into()),
                CellValue::Number(12.0),
                CellValue::Number(3.0),
            ],
            vec![CellValue::Number(90.0), CellValue::Empty, CellValue::Number(60.0)],
        ],
    );

    let dataset = validate(&sheet, &ColumnSchema::default()).expect("sheet validated");
    assert_eq!(dataset.dropped_rows, 2);
    assert_eq!(dataset.records.len(), 1);
    assert_eq!(dataset.records[0].rep_id, "88");
    assert_eq!(dataset.records[0].balance, 40.0);
    assert!(!dataset.has_supervisor);
}

#[test]
fn columns_are_numbered_from_column_a() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(7, 1, "Rep").expect("header written");
    sheet
        .write_string(7, 3, "Saldo de Carteira")
        .expect("header written");
    sheet.write_number(8, 1, 101.0).expect("rep written");
    sheet.write_string(8, 2, "sem título").expect("cell written");
    sheet.write_number(8, 3, 10.0).expect("balance written");
    let bytes = workbook.save_to_buffer().expect("workbook serialised");

    let raw = parse_primary(&bytes, HEADER_ROW_OFFSET).expect("sheet parsed");
    assert_eq!(
        raw.columns,
        vec!["Unnamed: 0", "Rep", "Unnamed: 2", "Saldo de Carteira"]
    );
    assert_eq!(raw.rows.len(), 1);
    assert_eq!(raw.rows[0].cells[0], CellValue::Empty);
    assert_eq!(raw.rows[0].cells[1], CellValue::Number(101.0));
    assert_eq!(raw.rows[0].cells[3], CellValue::Number(10.0));
}

#[test]
fn empty_target_cell_inside_the_sheet_is_a_type_mismatch() {
    let bytes = Fixture::default().bytes();
    match parse_target(&bytes, "Meta", 0, 1) {
        Err(CoverageError::TypeMismatch {
            row, column, found, ..
        }) => {
            assert_eq!((row, column), (0, 1));
            assert_eq!(found, "an empty cell");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
