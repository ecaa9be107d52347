use serde::{Deserialize, Serialize};

/// A selectable BREEAM assessment criterion as served by `/api/criteria`.
///
/// The full set is fetched once per form session and never mutated, only
/// filtered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditCriteria {
    pub criteria_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub criteria_type: Option<String>,
    pub issue_number: String,
    pub issue_name: String,
    pub category_number: String,
    pub category_name: String,
}

/// Binary premise flag, carried on the wire as `"ja"`/`"nei"` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Premise {
    Ja,
    Nei,
}

impl Premise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Premise::Ja => "ja",
            Premise::Nei => "nei",
        }
    }
}

/// Scalar form fields, serialized as the JSON `data` part of the upload.
///
/// Wire keys keep the backend's camelCase naming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFields {
    pub project_name: String,
    pub breeam_entrepreneur_responsible: String,
    pub breeam_civil_engineer_responsible: String,
    pub breeam_assessor: String,
    pub audit_criteria: String,
    pub premise: String,
    pub prepared_by: String,
}

impl SubmissionFields {
    /// Label of the first empty field, if any. Every field is required
    /// before submission; there is no format validation beyond presence.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        if self.project_name.is_empty() {
            Some("Project name")
        } else if self.breeam_entrepreneur_responsible.is_empty() {
            Some("BREEAM responsible (entrepreneur)")
        } else if self.breeam_civil_engineer_responsible.is_empty() {
            Some("BREEAM responsible (civil engineer)")
        } else if self.breeam_assessor.is_empty() {
            Some("BREEAM assessor")
        } else if self.audit_criteria.is_empty() {
            Some("Audit criteria")
        } else if self.premise.is_empty() {
            Some("Premise")
        } else if self.prepared_by.is_empty() {
            Some("Prepared by")
        } else {
            None
        }
    }
}

/// Body returned by `/api/upload/`. A body carrying `taskId` is treated
/// as acceptance; failure bodies carry `message` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by `/api/task-status/{taskId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusResponse {
    pub status: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client-side criteria filter: for a non-empty query, entries whose
/// `criteria_id` contains the query case-insensitively; for an empty
/// query, the full list.
pub fn filter_criteria<'a>(all: &'a [AuditCriteria], query: &str) -> Vec<&'a AuditCriteria> {
    if query.is_empty() {
        return all.iter().collect();
    }
    let needle = query.to_lowercase();
    all.iter()
        .filter(|crit| crit.criteria_id.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(id: &str) -> AuditCriteria {
        AuditCriteria {
            criteria_id: id.to_string(),
            name: format!("Criterion {}", id),
            description: "Minimum standard for project documentation".to_string(),
            criteria_type: None,
            issue_number: "Man 03".to_string(),
            issue_name: "Responsible construction practices".to_string(),
            category_number: "1".to_string(),
            category_name: "Management".to_string(),
        }
    }

    #[test]
    fn test_filter_empty_query_returns_full_list() {
        let all = vec![criterion("MAN-03-1"), criterion("ENE-01-2")];
        let filtered = filter_criteria(&all, "");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let all = vec![criterion("MAN-03-1"), criterion("ENE-01-2"), criterion("MAN-04-1")];
        let filtered = filter_criteria(&all, "man");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|c| c.criteria_id.starts_with("MAN")));

        let filtered = filter_criteria(&all, "01-2");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].criteria_id, "ENE-01-2");
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let all = vec![criterion("MAN-03-1")];
        assert!(filter_criteria(&all, "wat").is_empty());
    }

    #[test]
    fn test_criteria_deserialization() {
        let sample = r#"[
            {
                "criteria_id": "MAN-03-1",
                "name": "Responsible construction",
                "description": "Evidence of responsible construction management",
                "type": null,
                "issue_number": "Man 03",
                "issue_name": "Responsible construction practices",
                "category_number": "1",
                "category_name": "Management"
            }
        ]"#;

        let parsed: Vec<AuditCriteria> = serde_json::from_str(sample).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].criteria_id, "MAN-03-1");
        assert!(parsed[0].criteria_type.is_none());
        assert_eq!(parsed[0].category_name, "Management");
    }

    #[test]
    fn test_submission_fields_wire_keys_are_camel_case() {
        let fields = SubmissionFields {
            project_name: "Bygg A".to_string(),
            breeam_entrepreneur_responsible: "Kari Nordmann".to_string(),
            breeam_civil_engineer_responsible: "Ola Nordmann".to_string(),
            breeam_assessor: "Anne Hansen".to_string(),
            audit_criteria: "MAN-03-1".to_string(),
            premise: Premise::Ja.as_str().to_string(),
            prepared_by: "Per Olsen".to_string(),
        };

        let json: serde_json::Value = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["projectName"], "Bygg A");
        assert_eq!(json["breeamEntrepreneurResponsible"], "Kari Nordmann");
        assert_eq!(json["breeamCivilEngineerResponsible"], "Ola Nordmann");
        assert_eq!(json["breeamAssessor"], "Anne Hansen");
        assert_eq!(json["auditCriteria"], "MAN-03-1");
        assert_eq!(json["premise"], "ja");
        assert_eq!(json["preparedBy"], "Per Olsen");
    }

    #[test]
    fn test_first_missing_field_order() {
        let mut fields = SubmissionFields::default();
        assert_eq!(fields.first_missing_field(), Some("Project name"));

        fields.project_name = "Bygg A".to_string();
        fields.breeam_entrepreneur_responsible = "Kari".to_string();
        fields.breeam_civil_engineer_responsible = "Ola".to_string();
        fields.breeam_assessor = "Anne".to_string();
        assert_eq!(fields.first_missing_field(), Some("Audit criteria"));

        fields.audit_criteria = "MAN-03-1".to_string();
        fields.premise = "nei".to_string();
        fields.prepared_by = "Per".to_string();
        assert_eq!(fields.first_missing_field(), None);
    }

    #[test]
    fn test_task_status_deserialization() {
        let pending: TaskStatusResponse =
            serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(pending.status, "processing");
        assert!(pending.file_url.is_none());

        let done: TaskStatusResponse = serde_json::from_str(
            r#"{"status": "completed", "file_url": "http://127.0.0.1:8000/media/generated_audit_report.docx"}"#,
        )
        .unwrap();
        assert_eq!(done.status, "completed");
        assert_eq!(
            done.file_url.as_deref(),
            Some("http://127.0.0.1:8000/media/generated_audit_report.docx")
        );
    }

    #[test]
    fn test_upload_response_deserialization() {
        let accepted: UploadResponse = serde_json::from_str(
            r#"{"status": "success", "taskId": "7f3b", "message": "Data and file(s) processed successfully"}"#,
        )
        .unwrap();
        assert_eq!(accepted.task_id, "7f3b");
        assert!(accepted.message.is_some());
    }
}
