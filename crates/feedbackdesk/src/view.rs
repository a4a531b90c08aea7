//! Dashboard helpers: filtering, ordering and rendering of records.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::record::{FeedbackRecord, Priority};

/// Display format for creation timestamps, in local time.
pub const DISPLAY_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Which priorities to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    /// Everything.
    #[default]
    All,
    /// Only one priority.
    Only(Priority),
}

impl PriorityFilter {
    /// Whether `record` passes the filter.
    #[must_use]
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(priority) => record.priority == *priority,
        }
    }
}

impl From<Option<Priority>> for PriorityFilter {
    fn from(priority: Option<Priority>) -> Self {
        priority.map_or(Self::All, Self::Only)
    }
}

/// Records per priority, as shown on the filter buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PriorityCounts {
    /// All records.
    pub total: usize,
    /// High priority records.
    pub high: usize,
    /// Medium priority records.
    pub medium: usize,
    /// Low priority records.
    pub low: usize,
}

impl PriorityCounts {
    /// Count `records` by priority.
    #[must_use]
    pub fn tally(records: &[FeedbackRecord]) -> Self {
        records.iter().fold(Self::default(), |mut counts, record| {
            counts.total += 1;
            match record.priority {
                Priority::High => counts.high += 1,
                Priority::Medium => counts.medium += 1,
                Priority::Low => counts.low += 1,
            }
            counts
        })
    }
}

/// Filter `records` and order them high → medium → low.
///
/// The sort is stable, so the store's newest-first order is kept within each
/// priority.
#[must_use]
pub fn arrange(records: &[FeedbackRecord], filter: PriorityFilter) -> Vec<&FeedbackRecord> {
    let mut shown: Vec<&FeedbackRecord> = records.iter().filter(|r| filter.matches(r)).collect();
    shown.sort_by_key(|r| r.priority.rank());
    shown
}

/// Format a creation timestamp for display, in local time.
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// One-line summary of a record (the collapsed card).
#[must_use]
pub fn summary_line(record: &FeedbackRecord) -> String {
    format!(
        "[{}] {}  {}  {}  ({})",
        record.priority.label(),
        record.department,
        record.contact_name,
        format_timestamp(&record.created_at),
        record.id
    )
}

/// Full rendering of a record (the expanded card).
///
/// Blank optional fields are left out.
#[must_use]
pub fn detail(record: &FeedbackRecord) -> String {
    let mut out = summary_line(record);
    out.push('\n');

    if let Some(phone) = &record.contact_phone {
        let _ = writeln!(out, "  电话：{phone}");
    }
    if let Some(email) = &record.contact_email {
        let _ = writeln!(out, "  邮箱：{email}");
    }
    if let Some(date) = &record.expected_completion {
        let _ = writeln!(out, "  期望完成：{date}");
    }

    let _ = writeln!(out, "  需要解决的问题：");
    push_indented(&mut out, &record.problem_description);
    let _ = writeln!(out, "  程序要求：");
    push_indented(&mut out, &record.requirements);

    if let Some(notes) = &record.additional_notes {
        let _ = writeln!(out, "  补充说明：");
        push_indented(&mut out, notes);
    }
    out
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "    {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewFeedback;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn record(id: &str, priority: Priority, minutes: i64) -> FeedbackRecord {
        let base = Utc.with_ymd_and_hms(2025, 1, 5, 6, 0, 0).unwrap();
        FeedbackRecord::from_new(
            id.to_string(),
            base + Duration::minutes(minutes),
            NewFeedback::new("财务部", "李雷", "报表手工填写耗时", "自动生成月报")
                .with_priority(priority),
        )
    }

    fn newest_first() -> Vec<FeedbackRecord> {
        vec![
            record("e", Priority::Low, 5),
            record("d", Priority::High, 4),
            record("c", Priority::Medium, 3),
            record("b", Priority::High, 2),
            record("a", Priority::Low, 1),
        ]
    }

    fn ids(records: &[&FeedbackRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_arrange_all_sorts_by_priority_stably() {
        let records = newest_first();
        let shown = arrange(&records, PriorityFilter::All);
        assert_eq!(ids(&shown), vec!["d", "b", "c", "e", "a"]);
    }

    #[test]
    fn test_arrange_filters() {
        let records = newest_first();
        let shown = arrange(&records, PriorityFilter::Only(Priority::High));
        assert_eq!(ids(&shown), vec!["d", "b"]);

        let shown = arrange(&records, PriorityFilter::Only(Priority::Medium));
        assert_eq!(ids(&shown), vec!["c"]);
    }

    #[test]
    fn test_arrange_empty() {
        assert!(arrange(&[], PriorityFilter::All).is_empty());
    }

    #[test]
    fn test_filter_from_option() {
        assert_eq!(PriorityFilter::from(None), PriorityFilter::All);
        assert_eq!(
            PriorityFilter::from(Some(Priority::Low)),
            PriorityFilter::Only(Priority::Low)
        );
    }

    #[test]
    fn test_counts() {
        let counts = PriorityCounts::tally(&newest_first());
        assert_eq!(
            counts,
            PriorityCounts {
                total: 5,
                high: 2,
                medium: 1,
                low: 2
            }
        );
    }

    #[test]
    fn test_format_timestamp_shape() {
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 6, 3, 9).unwrap();
        let shown = format_timestamp(&at);
        assert_eq!(shown.len(), "2025/01/05 06:03:09".len());
        assert!(shown.ends_with(":03:09"));
    }

    #[test]
    fn test_summary_line_shows_label() {
        let line = summary_line(&record("x", Priority::High, 0));
        assert!(line.starts_with("[高] 财务部"));
        assert!(line.contains("李雷"));
    }

    #[test]
    fn test_detail_skips_blank_optionals() {
        let text = detail(&record("x", Priority::Medium, 0));
        assert!(text.contains("报表手工填写耗时"));
        assert!(text.contains("自动生成月报"));
        assert!(!text.contains("电话"));
        assert!(!text.contains("补充说明"));
    }

    #[test]
    fn test_detail_shows_present_optionals() {
        let mut r = record("x", Priority::Medium, 0);
        r.contact_phone = Some("13800000000".to_string());
        r.expected_completion = NaiveDate::from_ymd_opt(2025, 3, 1);
        r.additional_notes = Some("第一行\n第二行".to_string());

        let text = detail(&r);
        assert!(text.contains("电话：13800000000"));
        assert!(text.contains("期望完成：2025-03-01"));
        assert!(text.contains("    第二行"));
    }
}
