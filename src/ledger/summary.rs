use crate::ledger::model::{AssessmentRecord, Category};
use serde::Serialize;
use std::collections::BTreeMap;

const CHART_WIDTH: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_coverage_sqm: f64,
    pub total_cost: f64,
    pub record_count: usize,
    pub coverage_by_category: BTreeMap<Category, f64>,
}

pub fn summarize(view: &[AssessmentRecord]) -> Summary {
    let coverage_by_category = view.iter().fold(BTreeMap::new(), |mut acc, record| {
        let entry = acc.entry(record.category).or_insert(0.0_f64);
        *entry += record.coverage_sqm;
        acc
    });

    Summary {
        total_coverage_sqm: view.iter().map(|record| record.coverage_sqm).sum(),
        total_cost: view
            .iter()
            .map(|record| record.total_cost().unwrap_or_default())
            .sum(),
        record_count: view.len(),
        coverage_by_category,
    }
}

pub fn render_summary(summary: &Summary) -> String {
    let largest = summary
        .coverage_by_category
        .values()
        .copied()
        .fold(0.0_f64, f64::max);

    let chart_rows = if summary.coverage_by_category.is_empty() {
        "- No data".to_string()
    } else {
        summary
            .coverage_by_category
            .iter()
            .map(|(category, sqm)| {
                format!(
                    "{:<17} {:<width$} {} SQM",
                    category.as_str(),
                    bar(*sqm, largest),
                    format_grouped(*sqm, 1),
                    width = CHART_WIDTH
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Total Area: {} SQM\nTotal Estimated Cost: ${}\nItems in Assessment: {}\n\nCoverage by Category\n{}\n",
        format_grouped(summary.total_coverage_sqm, 1),
        format_grouped(summary.total_cost, 2),
        summary.record_count,
        chart_rows
    )
}

fn bar(value: f64, largest: f64) -> String {
    if largest <= 0.0 || value <= 0.0 {
        return String::new();
    }

    let filled = ((value / largest) * CHART_WIDTH as f64).round() as usize;
    "#".repeat(filled.clamp(1, CHART_WIDTH))
}

/// Renders `value` with thousands separators, e.g. `12,345.60`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(int, frac)| (int, Some(frac)));

    let grouped = integer
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::model::Hotel;
    use chrono::NaiveDate;

    fn record(category: Category, sqm: f64, cost: Option<f64>) -> AssessmentRecord {
        AssessmentRecord {
            date_added: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            hotel_name: Hotel::EdenHotel,
            area_name: "Area".to_string(),
            category,
            coverage_sqm: sqm,
            cost_per_sqm: cost,
        }
    }

    #[test]
    fn empty_view_summarizes_to_zero() {
        let summary = summarize(&[]);

        assert_eq!(summary.total_coverage_sqm, 0.0);
        assert_eq!(summary.total_cost, 0.0);
        assert_eq!(summary.record_count, 0);
        assert!(summary.coverage_by_category.is_empty());
        assert!(render_summary(&summary).contains("- No data"));
    }

    #[test]
    fn missing_unit_cost_counts_as_zero() {
        let view = vec![
            record(Category::Lobby, 100.0, Some(2.0)),
            record(Category::Lobby, 50.0, None),
            record(Category::Gym, 25.5, Some(4.0)),
        ];

        let summary = summarize(&view);

        assert_eq!(summary.total_coverage_sqm, 175.5);
        assert_eq!(summary.total_cost, 302.0);
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.coverage_by_category.get(&Category::Lobby), Some(&150.0));
        assert_eq!(summary.coverage_by_category.get(&Category::Gym), Some(&25.5));
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(format_grouped(0.0, 2), "0.00");
        assert_eq!(format_grouped(1234.5, 1), "1,234.5");
        assert_eq!(format_grouped(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_grouped(-999.0, 0), "-999");
    }

    #[test]
    fn chart_scales_to_largest_category() {
        let view = vec![
            record(Category::Outdoor, 300.0, None),
            record(Category::Gym, 150.0, None),
        ];

        let rendered = render_summary(&summarize(&view));

        assert!(rendered.contains(&"#".repeat(CHART_WIDTH)));
        assert!(rendered.contains(&format!("{} ", "#".repeat(CHART_WIDTH / 2))));
    }
}
