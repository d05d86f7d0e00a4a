use crate::ledger::model::AssessmentRecord;
use crate::ledger::summary::{format_grouped, summarize};
use anyhow::{Result, anyhow};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 8.0;
const TITLE_BLOCK: f32 = 16.0;
const FONT_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 18.0;
const LAYER: &str = "Layer 1";

const COLUMNS: [(&str, f32); 6] = [
    ("Hotel", 32.0),
    ("Area", 50.0),
    ("Category", 35.0),
    ("SQM", 22.0),
    ("Cost/SQM", 22.0),
    ("Total Cost", 24.9),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub title: Option<String>,
    pub include_total_row: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: Some("Virtual360 Cost Assessment Report".to_string()),
            include_total_row: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStyle {
    Header,
    Body,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
struct TableRow {
    style: RowStyle,
    cells: [String; 6],
}

pub fn to_report_document(records: &[AssessmentRecord], options: &ReportOptions) -> Result<Vec<u8>> {
    let title = options.title.as_deref().unwrap_or("Cost Assessment");
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|error| anyhow!("Failed to load PDF font: {error:?}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|error| anyhow!("Failed to load PDF font: {error:?}"))?;

    let rows = build_rows(records, options.include_total_row);
    let pages = paginate(&rows, options.title.is_some());

    for (index, page_rows) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            doc.get_page(page).get_layer(layer)
        };

        let mut top = PAGE_HEIGHT - MARGIN;
        if index == 0 {
            if let Some(title) = options.title.as_deref() {
                layer.set_fill_color(black());
                layer.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(top - 7.0), &bold);
                top -= TITLE_BLOCK;
            }
        }

        for row in page_rows {
            let font = match row.style {
                RowStyle::Body => &regular,
                RowStyle::Header | RowStyle::Total => &bold,
            };
            draw_row(&layer, row, top, font);
            top -= ROW_HEIGHT;
        }
    }

    doc.save_to_bytes()
        .map_err(|error| anyhow!("Failed to build PDF payload: {error:?}"))
}

fn build_rows(records: &[AssessmentRecord], include_total_row: bool) -> Vec<TableRow> {
    let header = TableRow {
        style: RowStyle::Header,
        cells: COLUMNS.map(|(title, _)| title.to_string()),
    };

    let body = records.iter().map(|record| TableRow {
        style: RowStyle::Body,
        cells: [
            record.hotel_name.to_string(),
            record.area_name.clone(),
            record.category.to_string(),
            format_grouped(record.coverage_sqm, 1),
            record
                .cost_per_sqm
                .map(|unit| format!("${}", format_grouped(unit, 2)))
                .unwrap_or_default(),
            record
                .total_cost()
                .map(|total| format!("${}", format_grouped(total, 2)))
                .unwrap_or_default(),
        ],
    });

    let total = (include_total_row && !records.is_empty()).then(|| {
        let summary = summarize(records);
        TableRow {
            style: RowStyle::Total,
            cells: [
                "Total".to_string(),
                format!("{} items", summary.record_count),
                String::new(),
                format_grouped(summary.total_coverage_sqm, 1),
                String::new(),
                format!("${}", format_grouped(summary.total_cost, 2)),
            ],
        }
    });

    std::iter::once(header).chain(body).chain(total).collect()
}

/// Splits rows into pages; the header row (always `rows[0]`) is repeated at
/// the top of every page.
fn paginate(rows: &[TableRow], has_title: bool) -> Vec<Vec<&TableRow>> {
    let Some((header, rest)) = rows.split_first() else {
        return Vec::new();
    };

    let per_page = ((PAGE_HEIGHT - 2.0 * MARGIN) / ROW_HEIGHT) as usize - 1;
    let first_page = if has_title {
        ((PAGE_HEIGHT - 2.0 * MARGIN - TITLE_BLOCK) / ROW_HEIGHT) as usize - 1
    } else {
        per_page
    };

    let mut pages = Vec::new();
    let mut remaining = rest;
    let mut capacity = first_page;
    loop {
        let take = remaining.len().min(capacity);
        let (chunk, tail) = remaining.split_at(take);
        pages.push(std::iter::once(header).chain(chunk).collect::<Vec<_>>());
        remaining = tail;
        capacity = per_page;
        if remaining.is_empty() {
            break;
        }
    }

    pages
}

fn draw_row(layer: &PdfLayerReference, row: &TableRow, top: f32, font: &IndirectFontRef) {
    let bottom = top - ROW_HEIGHT;
    let mut left = MARGIN;

    layer.set_outline_color(black());
    layer.set_outline_thickness(1.0);

    for ((_, width), text) in COLUMNS.iter().zip(row.cells.iter()) {
        let cell = Rect::new(Mm(left), Mm(bottom), Mm(left + width), Mm(top));
        match row.style {
            RowStyle::Header => {
                layer.set_fill_color(grey());
                layer.add_rect(cell.with_mode(PaintMode::FillStroke));
                layer.set_fill_color(whitesmoke());
            }
            RowStyle::Body | RowStyle::Total => {
                layer.add_rect(cell.with_mode(PaintMode::Stroke));
                layer.set_fill_color(black());
            }
        }

        layer.use_text(
            fit(text, *width),
            FONT_SIZE,
            Mm(left + 1.5),
            Mm(bottom + 2.6),
            font,
        );
        left += width;
    }
}

/// Truncates `text` to roughly what fits in a column of `width` mm.
fn fit(text: &str, width: f32) -> String {
    let max_chars = (((width - 3.0) / 1.75).floor() as usize).max(1);
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }

    let truncated = single_line
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    format!("{truncated}...")
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

fn whitesmoke() -> Color {
    Color::Rgb(Rgb::new(0.96, 0.96, 0.96, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}
