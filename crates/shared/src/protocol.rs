use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::EmployeeRecord;

/// Envelope for `GET /api/employees`. The server also reports paging
/// metadata alongside `data`; the client only consumes the page it asked
/// for, so the extras are tolerated with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
}

/// Body of `DELETE /api/employees/{id}`. Status is authoritative; the
/// flag is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub deleted: bool,
}

/// Client-editable subset of an employee, used as the request body for
/// both create and partial update. Every field is optional so that
/// untouched fields stay out of the serialized payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_hired: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl EmployeeDraft {
    /// Trims string fields and drops the ones left empty, so a blank
    /// form input never reaches the server as `""`.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.email,
            &mut self.phone,
            &mut self.department,
            &mut self.title,
        ] {
            *field = field
                .take()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.title.is_none()
            && self.salary.is_none()
            && self.date_hired.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_strips_empty_and_whitespace_fields() {
        let draft = EmployeeDraft {
            first_name: Some("Jo".to_string()),
            last_name: Some("  Doe ".to_string()),
            email: Some("jo@x.com".to_string()),
            department: Some(String::new()),
            title: Some("   ".to_string()),
            ..Default::default()
        };

        let normalized = draft.normalized();
        assert_eq!(normalized.first_name.as_deref(), Some("Jo"));
        assert_eq!(normalized.last_name.as_deref(), Some("Doe"));
        assert_eq!(normalized.department, None);
        assert_eq!(normalized.title, None);
    }

    #[test]
    fn stripped_fields_are_omitted_from_json() {
        let draft = EmployeeDraft {
            first_name: Some("Jo".to_string()),
            last_name: Some("Doe".to_string()),
            email: Some("jo@x.com".to_string()),
            department: Some(String::new()),
            ..Default::default()
        }
        .normalized();

        let value = serde_json::to_value(&draft).expect("json");
        let object = value.as_object().expect("object");
        assert!(!object.contains_key("department"));
        assert!(!object.contains_key("salary"));
        assert_eq!(object["first_name"], "Jo");
    }

    #[test]
    fn empty_draft_reports_empty() {
        assert!(EmployeeDraft::default().is_empty());
        let draft = EmployeeDraft {
            salary: Some(1.0),
            ..Default::default()
        };
        assert!(!draft.is_empty());
    }

    #[test]
    fn list_response_tolerates_missing_paging_metadata() {
        let raw = r#"{"data":[]}"#;
        let response: EmployeeListResponse = serde_json::from_str(raw).expect("response");
        assert!(response.data.is_empty());
        assert_eq!(response.total, 0);
    }
}
