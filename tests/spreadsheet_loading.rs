//! Loading real xlsx workbooks through the spreadsheet reader.

use data_dashboard::data::format::DataFormat;
use data_dashboard::data::loader::load;
use data_dashboard::data::model::ColumnType;
use data_dashboard::CellValue;
use rust_xlsxwriter::Workbook;

/// `city`/`pop` on the first sheet with one blank `pop` cell, and an
/// unrelated second sheet that must be ignored.
fn cities_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Cities").unwrap();
    sheet.write_string(0, 0, "city").unwrap();
    sheet.write_string(0, 1, "pop").unwrap();
    sheet.write_string(1, 0, "A").unwrap();
    sheet.write_number(1, 1, 10).unwrap();
    sheet.write_string(2, 0, "B").unwrap();
    sheet.write_string(3, 0, "A").unwrap();
    sheet.write_number(3, 1, 30).unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Notes").unwrap();
    other.write_string(0, 0, "note").unwrap();
    other.write_string(1, 0, "ignored").unwrap();

    workbook.save_to_buffer().unwrap()
}

#[test]
fn first_worksheet_loads_with_inferred_types() {
    let table = load(&cities_workbook(), DataFormat::Xlsx).unwrap();

    assert_eq!(table.column_names(), vec!["city", "pop"]);
    assert_eq!(table.num_rows(), 3);

    let city = table.column("city").unwrap();
    assert_eq!(city.kind(), ColumnType::Text);
    assert_eq!(
        city.values(),
        &[CellValue::from("A"), CellValue::from("B"), CellValue::from("A")]
    );

    let pop = table.column("pop").unwrap();
    assert_eq!(pop.kind(), ColumnType::Numeric);
    assert_eq!(
        pop.values(),
        &[CellValue::Number(10.0), CellValue::Missing, CellValue::Number(30.0)]
    );
}

#[test]
fn mixed_sheet_column_falls_back_to_text() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "code").unwrap();
    sheet.write_number(1, 0, 7).unwrap();
    sheet.write_string(2, 0, "x7").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let table = load(&bytes, DataFormat::Xlsx).unwrap();
    let code = table.column("code").unwrap();
    assert_eq!(code.kind(), ColumnType::Text);
    assert_eq!(code.values(), &[CellValue::from("7"), CellValue::from("x7")]);
}
