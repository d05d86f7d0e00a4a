use crate::export::csv::HEADERS;
use crate::ledger::model::AssessmentRecord;
use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

pub const SHEET_NAME: &str = "Assessment";

pub fn to_spreadsheet(records: &[AssessmentRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .context("Failed to name worksheet")?;

    let header_format = Format::new().set_bold();
    for (col, title) in (0_u16..).zip(HEADERS) {
        worksheet
            .write_string_with_format(0, col, title, &header_format)
            .context("Failed to write spreadsheet header")?;
    }

    for (row, record) in (1_u32..).zip(records) {
        write_record(worksheet, row, record)
            .with_context(|| format!("Failed to write spreadsheet row {row}"))?;
    }

    worksheet
        .set_column_width(2, 28)
        .context("Failed to size spreadsheet columns")?;

    workbook
        .save_to_buffer()
        .context("Failed to build spreadsheet payload")
}

fn write_record(
    worksheet: &mut Worksheet,
    row: u32,
    record: &AssessmentRecord,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    worksheet.write_string(row, 0, record.date_added.format("%Y-%m-%d").to_string())?;
    worksheet.write_string(row, 1, record.hotel_name.as_str())?;
    worksheet.write_string(row, 2, record.area_name.as_str())?;
    worksheet.write_string(row, 3, record.category.as_str())?;
    worksheet.write_number(row, 4, record.coverage_sqm)?;
    if let Some(unit) = record.cost_per_sqm {
        worksheet.write_number(row, 5, unit)?;
    }
    if let Some(total) = record.total_cost() {
        worksheet.write_number(row, 6, total)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::model::{Category, Hotel};
    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use chrono::NaiveDate;
    use std::io::Cursor;

    #[test]
    fn produces_zip_container() {
        let records = vec![AssessmentRecord {
            date_added: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            hotel_name: Hotel::EdenHotel,
            area_name: "Lobby".to_string(),
            category: Category::Lobby,
            coverage_sqm: 42.0,
            cost_per_sqm: Some(10.0),
        }];

        let payload = to_spreadsheet(&records).unwrap();

        assert!(payload.starts_with(b"PK"));
    }

    #[test]
    fn workbook_reads_back_with_csv_column_order() {
        let records = vec![
            AssessmentRecord {
                date_added: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
                hotel_name: Hotel::EdenHotel,
                area_name: "Lobby".to_string(),
                category: Category::Lobby,
                coverage_sqm: 42.0,
                cost_per_sqm: Some(10.5),
            },
            AssessmentRecord {
                date_added: NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
                hotel_name: Hotel::ThaalaHotel,
                area_name: "Roof Garden".to_string(),
                category: Category::Outdoor,
                coverage_sqm: 310.25,
                cost_per_sqm: None,
            },
        ];

        let payload = to_spreadsheet(&records).unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(payload)).unwrap();

        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.height(), 3);

        for (col, title) in HEADERS.iter().enumerate() {
            assert_eq!(range.get((0, col)), Some(&Data::String(title.to_string())));
        }

        let text = |row: usize, col: usize| range.get((row, col)).map(ToString::to_string);
        assert_eq!(text(1, 0).as_deref(), Some("2026-04-02"));
        assert_eq!(text(1, 1).as_deref(), Some("EDEN Hotel"));
        assert_eq!(text(1, 2).as_deref(), Some("Lobby"));
        assert_eq!(text(1, 3).as_deref(), Some("Lobby"));
        assert_eq!(range.get((1, 4)), Some(&Data::Float(42.0)));
        assert_eq!(range.get((1, 5)), Some(&Data::Float(10.5)));
        assert_eq!(range.get((1, 6)), Some(&Data::Float(441.0)));

        assert_eq!(text(2, 1).as_deref(), Some("Thaala Hotel"));
        assert_eq!(text(2, 2).as_deref(), Some("Roof Garden"));
        assert_eq!(text(2, 3).as_deref(), Some("Outdoor"));
        assert_eq!(range.get((2, 4)), Some(&Data::Float(310.25)));
        assert!(matches!(range.get((2, 5)), None | Some(Data::Empty)));
        assert!(matches!(range.get((2, 6)), None | Some(Data::Empty)));
    }

    #[test]
    fn empty_table_is_valid() {
        let payload = to_spreadsheet(&[]).unwrap();

        assert!(payload.starts_with(b"PK"));
    }
}
