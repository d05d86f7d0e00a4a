use crate::ledger::model::{AssessmentRecord, Category, Hotel};
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Date Added")]
    date_added: String,
    #[serde(rename = "Hotel Name")]
    hotel_name: &'static str,
    #[serde(rename = "Name of Area")]
    area_name: &'a str,
    #[serde(rename = "Category")]
    category: &'static str,
    #[serde(rename = "Coverage (SQM)")]
    coverage_sqm: f64,
    #[serde(rename = "Cost per SQM")]
    cost_per_sqm: Option<f64>,
    #[serde(rename = "Total Cost")]
    total_cost: Option<f64>,
}

/// Lenient row shape for reading: cost columns may be missing entirely
/// (legacy snapshots) and any cell may be blank after a manual edit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(rename = "Date Added")]
    date_added: String,
    #[serde(rename = "Hotel Name")]
    hotel_name: String,
    #[serde(rename = "Name of Area")]
    area_name: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Coverage (SQM)")]
    coverage_sqm: String,
    #[serde(rename = "Cost per SQM")]
    cost_per_sqm: String,
}

pub fn to_csv(records: &[AssessmentRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if records.is_empty() {
        writer
            .write_record(HEADERS)
            .context("Failed to write CSV header")?;
    }

    records.iter().try_for_each(|record| {
        writer
            .serialize(CsvRow {
                date_added: record.date_added.format(DATE_FORMAT).to_string(),
                hotel_name: record.hotel_name.as_str(),
                area_name: &record.area_name,
                category: record.category.as_str(),
                coverage_sqm: record.coverage_sqm,
                cost_per_sqm: record.cost_per_sqm,
                total_cost: record.total_cost(),
            })
            .context("Failed to write CSV row")
    })?;

    writer
        .into_inner()
        .map_err(|error| anyhow::anyhow!("Failed to flush CSV payload: {error}"))
}

pub const HEADERS: [&str; 7] = [
    "Date Added",
    "Hotel Name",
    "Name of Area",
    "Category",
    "Coverage (SQM)",
    "Cost per SQM",
    "Total Cost",
];

/// Reads a table back into typed records. `Total Cost` is ignored and
/// recomputed from the other two numeric columns.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<AssessmentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(bytes);
    let today = Local::now().date_naive();

    reader
        .deserialize::<RawRow>()
        .enumerate()
        .map(|(index, row)| {
            let line = index + 2;
            let row = row.with_context(|| format!("Malformed CSV row at line {line}"))?;
            to_record(row, today).with_context(|| format!("Invalid CSV row at line {line}"))
        })
        .collect()
}

fn to_record(row: RawRow, today: NaiveDate) -> Result<AssessmentRecord> {
    let date_added = match row.date_added.trim() {
        "" => today,
        raw => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .with_context(|| format!("Invalid date: {raw}. Example: 2026-02-18"))?,
    };
    let hotel_name = row.hotel_name.parse::<Hotel>()?;
    let coverage_sqm = parse_number(&row.coverage_sqm, "Coverage (SQM)")?.unwrap_or_default();
    let cost_per_sqm = parse_number(&row.cost_per_sqm, "Cost per SQM")?;

    Ok(AssessmentRecord {
        date_added,
        hotel_name,
        area_name: row.area_name,
        category: Category::coerce(&row.category),
        coverage_sqm,
        cost_per_sqm,
    })
}

fn parse_number(raw: &str, column: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = trimmed
        .parse::<f64>()
        .with_context(|| format!("{column} must be a number, got: {trimmed}"))?;
    if !value.is_finite() {
        bail!("{column} must be a finite number, got: {trimmed}");
    }

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AssessmentRecord> {
        vec![
            AssessmentRecord {
                date_added: NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
                hotel_name: Hotel::EdenHotel,
                area_name: "Pool Deck".to_string(),
                category: Category::Outdoor,
                coverage_sqm: 120.0,
                cost_per_sqm: Some(14.25),
            },
            AssessmentRecord {
                date_added: NaiveDate::from_ymd_opt(2026, 2, 19).unwrap(),
                hotel_name: Hotel::ThaalaHotel,
                area_name: "Bar, \"Sky\" Lounge".to_string(),
                category: Category::RestaurantBar,
                coverage_sqm: 0.1 + 0.2,
                cost_per_sqm: None,
            },
            AssessmentRecord {
                date_added: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
                hotel_name: Hotel::EdenHotel,
                area_name: "Ballroom\nEast wing".to_string(),
                category: Category::FunctionVenue,
                coverage_sqm: 1234.5678901234,
                cost_per_sqm: Some(1.0 / 3.0),
            },
        ]
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let records = sample();
        let payload = to_csv(&records).unwrap();
        let parsed = parse_csv(&payload).unwrap();

        assert_eq!(parsed, records);
    }

    #[test]
    fn header_row_lists_columns_in_display_order() {
        let payload = to_csv(&sample()).unwrap();
        let text = String::from_utf8(payload).unwrap();

        assert_eq!(
            text.lines().next().unwrap(),
            "Date Added,Hotel Name,Name of Area,Category,Coverage (SQM),Cost per SQM,Total Cost"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let text = String::from_utf8(to_csv(&[]).unwrap()).unwrap();

        assert_eq!(text, format!("{}\n", HEADERS.join(",")));
        assert!(parse_csv(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn legacy_five_column_snapshot_is_accepted() {
        let legacy = "Date Added,Hotel Name,Name of Area,Category,Coverage (SQM)\n\
                      2025-11-02,Thaala Hotel,Gym Floor,Gym,80.5\n";

        let parsed = parse_csv(legacy.as_bytes()).unwrap();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].hotel_name, Hotel::ThaalaHotel);
        assert_eq!(parsed[0].coverage_sqm, 80.5);
        assert_eq!(parsed[0].cost_per_sqm, None);
    }

    #[test]
    fn edited_rows_are_coerced_not_rejected() {
        let edited = "Date Added,Hotel Name,Name of Area,Category,Coverage (SQM),Cost per SQM,Total Cost\n\
                      ,EDEN Hotel,,Spa,,,999\n";

        let parsed = parse_csv(edited.as_bytes()).unwrap();

        assert_eq!(parsed[0].date_added, Local::now().date_naive());
        assert!(parsed[0].area_name.is_empty());
        assert_eq!(parsed[0].category, Category::Other);
        assert_eq!(parsed[0].coverage_sqm, 0.0);
        assert_eq!(parsed[0].total_cost(), None);
    }

    #[test]
    fn non_finite_numbers_are_refused() {
        let header = "Date Added,Hotel Name,Name of Area,Category,Coverage (SQM),Cost per SQM";
        for cell in ["NaN", "inf", "-infinity"] {
            let bad_coverage = format!("{header}\n2026-01-01,EDEN Hotel,Lobby,Lobby,{cell},2\n");
            let bad_cost = format!("{header}\n2026-01-01,EDEN Hotel,Lobby,Lobby,10,{cell}\n");

            assert!(parse_csv(bad_coverage.as_bytes()).is_err(), "accepted coverage {cell}");
            assert!(parse_csv(bad_cost.as_bytes()).is_err(), "accepted unit cost {cell}");
        }
    }

    #[test]
    fn unknown_hotel_is_an_error() {
        let edited = "Date Added,Hotel Name,Name of Area,Category,Coverage (SQM)\n\
                      2026-01-01,Grand Hotel,Lobby,Lobby,10\n";

        assert!(parse_csv(edited.as_bytes()).is_err());
    }
}
