//! CSV and JSON rendering of tables.

use crate::table::Table;

/// Render a table as CSV with a header line.
pub fn table_to_csv(table: &Table) -> String {
    let mut csv = String::new();

    let header: Vec<String> = table.columns().iter().map(|c| escape_csv(c)).collect();
    csv.push_str(&header.join(","));
    csv.push('\n');

    for row in table.rows() {
        let line: Vec<String> = row
            .cells()
            .iter()
            .map(|cell| escape_csv(&cell.to_string()))
            .collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }

    csv
}

/// Render a table as a pretty JSON array of objects.
pub fn table_to_json(table: &Table) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&table.to_json_records())
}

/// Escape a CSV field.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
