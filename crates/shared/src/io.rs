use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use umya_spreadsheet::{HorizontalAlignmentValues, Spreadsheet, VerticalAlignmentValues, Worksheet};

use crate::models::Article;

pub const HEADERS: [&str; 8] = [
    "Title",
    "Link",
    "Published Date",
    "Summary",
    "Tags",
    "Reporter Explanation",
    "30-Second Hook Script",
    "Trend Status",
];

const HEADER_FILL: &str = "FF1E90FF";
const HEADER_FONT_COLOR: &str = "FFFFFFFF";
const COLUMN_WIDTH: f64 = 30.0;

/// Excel refuses sheet names longer than this
const MAX_SHEET_NAME: usize = 31;

fn open_workbook(path: &Path) -> Result<Option<Spreadsheet>> {
    if !path.exists() {
        return Ok(None);
    }
    let book = umya_spreadsheet::reader::xlsx::read(path)
        .with_context(|| format!("Failed to read workbook: {}", path.display()))?;
    Ok(Some(book))
}

/// Every title already written to any sheet of the workbook
pub fn load_existing_headlines(path: &Path) -> Result<HashSet<String>> {
    let mut headlines = HashSet::new();

    let Some(book) = open_workbook(path)? else {
        return Ok(headlines);
    };

    for sheet in book.get_sheet_collection() {
        for row in 2..=sheet.get_highest_row() {
            let title = sheet.get_value((1, row));
            let title = title.trim();
            if !title.is_empty() {
                headlines.insert(title.to_string());
            }
        }
    }

    Ok(headlines)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// `<date>_<source>`, suffixed `_2`, `_3`, ... when that name is taken
pub fn sheet_name(date: NaiveDate, source: &str, existing: &[&str]) -> String {
    let base = format!("{}_{}", date.format("%Y-%m-%d"), source);
    let taken = |name: &str| existing.iter().any(|e| e.eq_ignore_ascii_case(name));

    let first = truncate_chars(&base, MAX_SHEET_NAME).to_string();
    if !taken(&first) {
        return first;
    }

    let mut n = 2;
    loop {
        let suffix = format!("_{}", n);
        let candidate = format!(
            "{}{}",
            truncate_chars(&base, MAX_SHEET_NAME - suffix.len()),
            suffix
        );
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn column_letter(index: usize) -> String {
    char::from(b'A' + index as u8).to_string()
}

fn format_sheet(sheet: &mut Worksheet) {
    for col in 0..HEADERS.len() {
        let style = sheet.get_style_mut((col as u32 + 1, 1));
        style.set_background_color(HEADER_FILL);

        let font = style.get_font_mut();
        font.set_bold(true);
        font.get_color_mut().set_argb(HEADER_FONT_COLOR);

        let alignment = style.get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);

        sheet
            .get_column_dimension_mut(&column_letter(col))
            .set_width(COLUMN_WIDTH);
    }
}

/// Append a new dated sheet holding `articles` and save the workbook.
/// Returns the name of the sheet that was created.
pub fn save_articles(
    path: &Path,
    source: &str,
    date: NaiveDate,
    articles: &[Article],
) -> Result<String> {
    if articles.is_empty() {
        anyhow::bail!("Refusing to write an empty sheet for {}", source);
    }

    let mut book = match open_workbook(path)? {
        Some(book) => book,
        None => umya_spreadsheet::new_file_empty_worksheet(),
    };

    let name = {
        let existing: Vec<&str> = book
            .get_sheet_collection()
            .iter()
            .map(|s| s.get_name())
            .collect();
        sheet_name(date, source, &existing)
    };

    let sheet = book
        .new_sheet(&name)
        .map_err(|e| anyhow::anyhow!("Failed to create sheet {}: {}", name, e))?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.get_cell_mut((col as u32 + 1, 1)).set_value_string(*header);
    }

    for (i, article) in articles.iter().enumerate() {
        let row = i as u32 + 2;
        for (col, value) in article.row().into_iter().enumerate() {
            sheet.get_cell_mut((col as u32 + 1, row)).set_value_string(value);
        }
    }

    format_sheet(sheet);

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))?;

    Ok(name)
}
