//! Core record types for feedbackdesk.
//!
//! This module defines the feature-request record as the rest of the crate
//! sees it, independent of how any backend names its columns.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Loose address shape accepted for the contact email.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// How urgently a request should be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default for new submissions.
    #[default]
    Medium,
    /// Schedule first.
    High,
}

impl Priority {
    /// All priorities, highest first.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// The wire value stored in the `priority` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// The human-readable label shown in listings and exports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "低",
            Self::Medium => "中",
            Self::High => "高",
        }
    }

    /// Sort rank, 0 being the most urgent.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::UnknownPriority(other.to_string())),
        }
    }
}

/// A request as submitted, before the store assigns its identity.
///
/// Blank optional fields are held as `None`; use [`non_blank`] when filling
/// them from user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    /// Submitting department.
    pub department: String,
    /// Contact person.
    pub contact_name: String,
    /// Contact phone number.
    pub contact_phone: Option<String>,
    /// Contact email address.
    pub contact_email: Option<String>,
    /// The problem the department wants solved.
    pub problem_description: String,
    /// What the program is expected to do.
    pub requirements: String,
    /// Scheduling priority.
    pub priority: Priority,
    /// Desired completion date.
    pub expected_completion: Option<NaiveDate>,
    /// Anything else worth knowing.
    pub additional_notes: Option<String>,
}

impl NewFeedback {
    /// Create a submission with the four required fields and default priority.
    #[must_use]
    pub fn new(
        department: impl Into<String>,
        contact_name: impl Into<String>,
        problem_description: impl Into<String>,
        requirements: impl Into<String>,
    ) -> Self {
        Self {
            department: department.into(),
            contact_name: contact_name.into(),
            problem_description: problem_description.into(),
            requirements: requirements.into(),
            ..Self::default()
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the contact phone; blank input clears it.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact_phone = non_blank(Some(phone.into()));
        self
    }

    /// Set the contact email; blank input clears it.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = non_blank(Some(email.into()));
        self
    }

    /// Set the expected completion date.
    #[must_use]
    pub fn with_expected_completion(mut self, date: NaiveDate) -> Self {
        self.expected_completion = Some(date);
        self
    }

    /// Set the additional notes; blank input clears them.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.additional_notes = non_blank(Some(notes.into()));
        self
    }

    /// Check the submission before it is handed to a store.
    ///
    /// Stores accept whatever they are given; this is the only place the
    /// required fields are enforced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming every missing required field, or
    /// the malformed email address.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("department", &self.department),
            ("contact_name", &self.contact_name),
            ("problem_description", &self.problem_description),
            ("requirements", &self.requirements),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::validation(format!(
                "required fields missing: {}",
                missing.join(", ")
            )));
        }

        if let Some(email) = &self.contact_email {
            if !email_regex().is_match(email.trim()) {
                return Err(Error::validation(format!(
                    "contact_email is not an address: {email}"
                )));
            }
        }

        Ok(())
    }
}

/// A stored request.
///
/// Serializes with camelCase keys; the backend's snake_case column names are
/// confined to [`crate::store::row`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Identifier assigned by the store.
    pub id: String,
    /// Submitting department.
    pub department: String,
    /// Contact person.
    pub contact_name: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    /// Contact email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// The problem the department wants solved.
    pub problem_description: String,
    /// What the program is expected to do.
    pub requirements: String,
    /// Scheduling priority.
    pub priority: Priority,
    /// Desired completion date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_completion: Option<NaiveDate>,
    /// Anything else worth knowing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    /// Creation time assigned by the store.
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Attach store-assigned identity to a submission.
    #[must_use]
    pub fn from_new(id: String, created_at: DateTime<Utc>, new: NewFeedback) -> Self {
        Self {
            id,
            department: new.department,
            contact_name: new.contact_name,
            contact_phone: new.contact_phone,
            contact_email: new.contact_email,
            problem_description: new.problem_description,
            requirements: new.requirements,
            priority: new.priority,
            expected_completion: new.expected_completion,
            additional_notes: new.additional_notes,
            created_at,
        }
    }

    /// The submitted content of this record, without its identity.
    #[must_use]
    pub fn to_new(&self) -> NewFeedback {
        NewFeedback {
            department: self.department.clone(),
            contact_name: self.contact_name.clone(),
            contact_phone: self.contact_phone.clone(),
            contact_email: self.contact_email.clone(),
            problem_description: self.problem_description.clone(),
            requirements: self.requirements.clone(),
            priority: self.priority,
            expected_completion: self.expected_completion,
            additional_notes: self.additional_notes.clone(),
        }
    }
}

/// Treat empty and whitespace-only text as absent.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// # Panics
///
/// Panics if [`EMAIL_PATTERN`] does not compile.
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("Invalid email pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewFeedback {
        NewFeedback::new("财务部", "李雷", "报表手工填写耗时", "自动生成月报")
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(sample().priority, Priority::Medium);
    }

    #[test]
    fn test_priority_labels() {
        assert_eq!(Priority::High.label(), "高");
        assert_eq!(Priority::Medium.label(), "中");
        assert_eq!(Priority::Low.label(), "低");
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(Error::UnknownPriority(_))
        ));
        assert!("HIGH".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde_rejects_unknown() {
        assert_eq!(
            serde_json::to_string(&Priority::High).unwrap(),
            "\"high\""
        );
        assert!(serde_json::from_str::<Priority>("\"critical\"").is_err());
    }

    #[test]
    fn test_priority_rank_order() {
        let ranks: Vec<u8> = Priority::ALL.iter().map(Priority::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let new = NewFeedback::new("", "  ", "问题", "");
        let err = new.validate().unwrap_err().to_string();
        assert!(err.contains("department"));
        assert!(err.contains("contact_name"));
        assert!(err.contains("requirements"));
        assert!(!err.contains("problem_description"));
    }

    #[test]
    fn test_validate_email() {
        assert!(sample().with_email("lilei@example.com").validate().is_ok());
        let err = sample().with_email("not-an-email").validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_blank_optionals_are_none() {
        let new = sample().with_phone("").with_email("   ").with_notes("");
        assert!(new.contact_phone.is_none());
        assert!(new.contact_email.is_none());
        assert!(new.additional_notes.is_none());
    }

    #[test]
    fn test_from_new_and_back() {
        let new = sample()
            .with_priority(Priority::High)
            .with_phone("13800000000")
            .with_expected_completion(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let record = FeedbackRecord::from_new("abc".to_string(), Utc::now(), new.clone());

        assert_eq!(record.id, "abc");
        assert_eq!(record.to_new(), new);
    }

    #[test]
    fn test_record_json_skips_absent_optionals() {
        let record = FeedbackRecord::from_new("abc".to_string(), Utc::now(), sample());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"department\":\"财务部\""));
        assert!(json.contains("\"contactName\":\"李雷\""));
        assert!(!json.contains("contactPhone"));
    }
}
