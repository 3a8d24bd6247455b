//! Table-view building shared by the CLI and GUI adapters.
//!
//! Cell contents are plain strings; adapters render them as literal
//! text, so user-supplied input can never become active markup.

use shared::domain::EmployeeRecord;

/// Placeholder shown instead of the table when no rows match.
pub const NO_EMPLOYEES_PLACEHOLDER: &str = "No employees found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub rows: Vec<EmployeeRow>,
    pub count_label: String,
    pub empty: bool,
}

fn optional_cell(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "-".to_string(),
    }
}

pub fn count_label(count: usize) -> String {
    format!(
        "{count} employee{} in system",
        if count == 1 { "" } else { "s" }
    )
}

pub fn build_table(records: &[EmployeeRecord]) -> TableView {
    let rows: Vec<EmployeeRow> = records
        .iter()
        .map(|employee| EmployeeRow {
            id: employee.id.0,
            name: employee.full_name(),
            email: employee.email.clone(),
            department: optional_cell(employee.department.as_deref()),
            title: optional_cell(employee.title.as_deref()),
        })
        .collect();

    TableView {
        empty: rows.is_empty(),
        count_label: count_label(rows.len()),
        rows,
    }
}
