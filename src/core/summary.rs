// FlowTrace - core/summary.rs
//
// Aggregate statistics over a parsed step sequence.
// Item timestamps are literal strings in the model; this is the one place
// they are interpreted as dates, and only to derive the overall time span.

use crate::core::model::{ContentPayload, Severity, Step};
use crate::util::constants;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Summary statistics for a parsed flow log.
#[derive(Debug, Clone, Default)]
pub struct FlowSummary {
    /// Number of steps, implicit Initialization step included.
    pub step_count: usize,

    /// Total content items across all steps.
    pub item_count: usize,

    /// Message counts by severity. Structural items are not counted here.
    pub messages_by_severity: HashMap<Severity, usize>,

    /// Item counts by structural kind ("message", "keyValue", "list", "json").
    pub items_by_kind: HashMap<&'static str, usize>,

    /// Earliest timestamp found (items with unparseable timestamps ignored).
    pub earliest: Option<NaiveDateTime>,

    /// Latest timestamp found.
    pub latest: Option<NaiveDateTime>,
}

impl FlowSummary {
    /// Count of messages at the given severity.
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.messages_by_severity
            .get(&severity)
            .copied()
            .unwrap_or(0)
    }
}

/// Compute summary statistics for a step sequence.
///
/// Never fails: timestamps that do not parse with the flow-log format are
/// simply excluded from the time bounds.
pub fn summarise(steps: &[Step]) -> FlowSummary {
    let mut summary = FlowSummary {
        step_count: steps.len(),
        ..Default::default()
    };

    for step in steps {
        for item in &step.content {
            summary.item_count += 1;
            *summary.items_by_kind.entry(item.payload.kind()).or_insert(0) += 1;

            if let ContentPayload::Message { severity, .. } = item.payload {
                *summary.messages_by_severity.entry(severity).or_insert(0) += 1;
            }

            if let Some(ref raw_ts) = item.timestamp {
                if let Ok(ts) = NaiveDateTime::parse_from_str(raw_ts, constants::TIMESTAMP_FORMAT)
                {
                    if summary.earliest.map_or(true, |e| ts < e) {
                        summary.earliest = Some(ts);
                    }
                    if summary.latest.map_or(true, |l| ts > l) {
                        summary.latest = Some(ts);
                    }
                }
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_steps;

    #[test]
    fn test_summary_of_empty_input() {
        let summary = summarise(&[]);
        assert_eq!(summary.step_count, 0);
        assert_eq!(summary.item_count, 0);
        assert!(summary.earliest.is_none());
        assert!(summary.latest.is_none());
    }

    #[test]
    fn test_counts_by_kind_and_severity() {
        let steps = parse_steps(
            "Step 1: A\n\
             Title: Engineer\n\
             Skills: [a, b]\n\
             Results: {\"ok\": true}\n\
             ERROR boom\n\
             INFO fine\n",
        )
        .steps;
        let summary = summarise(&steps);

        assert_eq!(summary.step_count, 1);
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.items_by_kind.get("keyValue"), Some(&1));
        assert_eq!(summary.items_by_kind.get("list"), Some(&1));
        assert_eq!(summary.items_by_kind.get("json"), Some(&1));
        assert_eq!(summary.items_by_kind.get("message"), Some(&2));
        assert_eq!(summary.severity_count(Severity::Error), 1);
        assert_eq!(summary.severity_count(Severity::Info), 1);
        assert_eq!(summary.severity_count(Severity::Plain), 0);
    }

    #[test]
    fn test_time_bounds_from_literal_timestamps() {
        let steps = parse_steps(
            "Step 1: A\n\
             2024-01-15 14:30:22 INFO first\n\
             2024-01-15 14:30:25 INFO last\n\
             no timestamp here\n",
        )
        .steps;
        let summary = summarise(&steps);
        assert_eq!(
            summary.earliest.unwrap().format("%H:%M:%S").to_string(),
            "14:30:22"
        );
        assert_eq!(
            summary.latest.unwrap().format("%H:%M:%S").to_string(),
            "14:30:25"
        );
    }

    /// A timestamp-shaped prefix that is not a real date (month 13) must
    /// not poison the bounds.
    #[test]
    fn test_invalid_dates_excluded_from_bounds() {
        let steps = parse_steps("Step 1: A\n2024-13-01 10:00:00 INFO odd\n").steps;
        let summary = summarise(&steps);
        assert!(summary.earliest.is_none());
        assert_eq!(summary.item_count, 1);
    }
}
