//! Column mapping between records and backend rows.
//!
//! Every backend stores records in a table with these snake_case columns:
//!
//! ```sql
//! id                  -- primary key, assigned by the store
//! department          TEXT NOT NULL
//! contact_name        TEXT NOT NULL
//! contact_phone       TEXT
//! contact_email       TEXT
//! problem_description TEXT NOT NULL
//! requirements        TEXT NOT NULL
//! priority            TEXT NOT NULL  -- 'low' | 'medium' | 'high'
//! expected_completion DATE / TEXT    -- YYYY-MM-DD
//! additional_notes    TEXT
//! created_at          TIMESTAMPTZ    -- assigned by the store
//! ```
//!
//! Both directions of the mapping live in this file. A column added on one
//! side and not the other is silently dropped, so keep them together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::record::{non_blank, FeedbackRecord, NewFeedback, Priority};

/// Date format of the `expected_completion` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifier that never occurs; `id != SENTINEL_ID` matches every row.
pub const SENTINEL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// A row as read back from the backend.
#[allow(missing_docs)] // columns are listed in the module docs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRow {
    /// Primary key. Accepts text or integer keys.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub department: String,
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    pub problem_description: String,
    pub requirements: String,
    pub priority: String,
    #[serde(default)]
    pub expected_completion: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    pub created_at: String,
}

/// A row as written on insert; the store fills in `id` and `created_at`.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertRow {
    pub department: String,
    pub contact_name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub problem_description: String,
    pub requirements: String,
    pub priority: &'static str,
    pub expected_completion: Option<String>,
    pub additional_notes: Option<String>,
}

impl From<&NewFeedback> for InsertRow {
    fn from(new: &NewFeedback) -> Self {
        Self {
            department: new.department.clone(),
            contact_name: new.contact_name.clone(),
            contact_phone: non_blank(new.contact_phone.clone()),
            contact_email: non_blank(new.contact_email.clone()),
            problem_description: new.problem_description.clone(),
            requirements: new.requirements.clone(),
            priority: new.priority.as_str(),
            expected_completion: new
                .expected_completion
                .map(|d| d.format(DATE_FORMAT).to_string()),
            additional_notes: non_blank(new.additional_notes.clone()),
        }
    }
}

impl TryFrom<FeedbackRow> for FeedbackRecord {
    type Error = Error;

    fn try_from(row: FeedbackRow) -> Result<Self> {
        let priority: Priority = row.priority.parse()?;

        let expected_completion = non_blank(row.expected_completion)
            .map(|s| {
                NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| {
                    Error::malformed_row(format!("expected_completion '{s}' for {}: {e}", row.id))
                })
            })
            .transpose()?;

        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                Error::malformed_row(format!("created_at '{}' for {}: {e}", row.created_at, row.id))
            })?;

        if row.id.is_empty() {
            return Err(Error::malformed_row("row without id"));
        }

        Ok(Self {
            id: row.id,
            department: row.department,
            contact_name: row.contact_name,
            contact_phone: non_blank(row.contact_phone),
            contact_email: non_blank(row.contact_email),
            problem_description: row.problem_description,
            requirements: row.requirements,
            priority,
            expected_completion,
            additional_notes: non_blank(row.additional_notes),
            created_at,
        })
    }
}

/// Convert fetched rows, dropping (and logging) any that don't map.
pub(crate) fn rows_to_records(rows: Vec<FeedbackRow>) -> Vec<FeedbackRecord> {
    rows.into_iter()
        .filter_map(|row| match FeedbackRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping unreadable row: {}", e);
                None
            }
        })
        .collect()
}

fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use serde_json::json;

    fn sample_row() -> FeedbackRow {
        FeedbackRow {
            id: "0b5c6a2e-0d8e-4f44-9d57-0c8f7a1f2b3c".to_string(),
            department: "财务部".to_string(),
            contact_name: "李雷".to_string(),
            contact_phone: Some(String::new()),
            contact_email: None,
            problem_description: "报表手工填写耗时".to_string(),
            requirements: "自动生成月报".to_string(),
            priority: "high".to_string(),
            expected_completion: Some("2025-03-01".to_string()),
            additional_notes: Some(String::new()),
            created_at: "2025-01-05T06:03:09.123456+00:00".to_string(),
        }
    }

    #[test]
    fn test_insert_row_uses_column_names() {
        let new = NewFeedback::new("财务部", "李雷", "报表手工填写耗时", "自动生成月报")
            .with_priority(Priority::High);
        let value = serde_json::to_value(InsertRow::from(&new)).unwrap();

        assert_eq!(value["department"], "财务部");
        assert_eq!(value["contact_name"], "李雷");
        assert_eq!(value["problem_description"], "报表手工填写耗时");
        assert_eq!(value["requirements"], "自动生成月报");
        assert_eq!(value["priority"], "high");
        assert!(value["contact_phone"].is_null());
        assert!(value.get("id").is_none());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_insert_row_formats_date() {
        let new = NewFeedback::new("a", "b", "c", "d")
            .with_expected_completion(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let row = InsertRow::from(&new);
        assert_eq!(row.expected_completion.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_row_to_record() {
        let record = FeedbackRecord::try_from(sample_row()).unwrap();

        assert_eq!(record.department, "财务部");
        assert_eq!(record.priority, Priority::High);
        assert_eq!(
            record.expected_completion,
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert!(record.contact_phone.is_none());
        assert!(record.additional_notes.is_none());
        assert_eq!(record.created_at.to_rfc3339(), "2025-01-05T06:03:09.123456+00:00");
    }

    #[test]
    fn test_row_with_unknown_priority_is_rejected() {
        let mut row = sample_row();
        row.priority = "urgent".to_string();
        assert!(matches!(
            FeedbackRecord::try_from(row),
            Err(Error::UnknownPriority(_))
        ));
    }

    #[test]
    fn test_row_with_bad_timestamp_is_rejected() {
        let mut row = sample_row();
        row.created_at = "yesterday".to_string();
        assert!(matches!(
            FeedbackRecord::try_from(row),
            Err(Error::MalformedRow(_))
        ));
    }

    #[test]
    fn test_row_deserializes_numeric_id_and_nulls() {
        let row: FeedbackRow = serde_json::from_value(json!({
            "id": 42,
            "department": "人事部",
            "contact_name": "韩梅梅",
            "contact_phone": null,
            "problem_description": "考勤统计",
            "requirements": "自动汇总",
            "priority": "low",
            "expected_completion": null,
            "created_at": "2025-01-05T06:03:09+00:00"
        }))
        .unwrap();

        assert_eq!(row.id, "42");
        assert!(row.contact_email.is_none());
        assert!(row.additional_notes.is_none());
    }

    #[test]
    fn test_rows_to_records_skips_bad_rows() {
        init_test_logging();
        let mut bad = sample_row();
        bad.priority = "critical".to_string();

        let records = rows_to_records(vec![sample_row(), bad]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_mapping_round_trip() {
        let new = NewFeedback::new("财务部", "李雷", "报表手工填写耗时", "自动生成月报")
            .with_priority(Priority::Low)
            .with_phone("13800000000")
            .with_email("lilei@example.com")
            .with_expected_completion(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
            .with_notes("月底前");
        let insert = InsertRow::from(&new);

        let row = FeedbackRow {
            id: "row-1".to_string(),
            department: insert.department,
            contact_name: insert.contact_name,
            contact_phone: insert.contact_phone,
            contact_email: insert.contact_email,
            problem_description: insert.problem_description,
            requirements: insert.requirements,
            priority: insert.priority.to_string(),
            expected_completion: insert.expected_completion,
            additional_notes: insert.additional_notes,
            created_at: "2025-01-05T06:03:09Z".to_string(),
        };

        let record = FeedbackRecord::try_from(row).unwrap();
        assert_eq!(record.to_new(), new);
    }
}
