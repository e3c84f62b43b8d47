//! Plain-text rendering of tables for the command line.

use crate::table::Table;

/// Render a table as aligned text, one line per row under a header line.
pub fn render(table: &dyn Table) -> String {
    let cells: Vec<Vec<String>> = (0..table.row_count())
        .map(|row| {
            (0..table.column_count())
                .map(|column| table.cell(row, column).to_string())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .headers()
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .fold(h.name.len(), usize::max)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(line(table.headers().iter().map(|h| h.name.as_str()).collect()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
