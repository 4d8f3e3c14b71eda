//! Comma-separated text serialization.

use super::RowSet;
use std::borrow::Cow;

/// Quote a cell if it contains a comma, a double quote or a newline,
/// doubling any quotes inside it. Other cells are emitted as-is.
///
pub fn escape_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

fn join_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells
        .into_iter()
        .map(escape_cell)
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize the header and rows, one line per row. Lines are separated by
/// `\n` with no trailing newline.
///
pub fn to_delimited(row_set: &RowSet) -> String {
    let mut lines = Vec::with_capacity(row_set.rows.len() + 1);
    lines.push(join_row(RowSet::HEADER.iter().copied()));
    for row in &row_set.rows {
        let cells = row.cells();
        lines.push(join_row(cells.iter().map(String::as_str)));
    }
    lines.join("\n")
}
