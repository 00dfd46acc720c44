//! Plain-text rendering of query results.
//!
//! Column widths use display width rather than char count, so wide
//! characters stay aligned.

use unicode_width::UnicodeWidthStr;

use querypilot_core::TableResult;

/// Render a result table with a header row and two-space gutters.
pub fn format_table(table: &TableResult) -> String {
    if table.columns.is_empty() {
        return "(no rows)".to_string();
    }

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(&table.columns, &widths));
    for row in &rows {
        lines.push(render_row(row, &widths));
    }
    lines.join("\n")
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        // The last column is never padded, so lines carry no trailing spaces.
        if i + 1 < cells.len() {
            let pad = widths[i].saturating_sub(cell.width());
            for _ in 0..pad {
                line.push(' ');
            }
        }
    }
    line
}
