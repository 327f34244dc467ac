// FlowTrace - core/parser.rs
//
// Line-oriented recogniser for flow step logs.
// Core layer: accepts a text blob, never touches the filesystem.
//
// The step sequence is a total function of the input: parsing never fails
// and never panics, whatever the input. The only fallible operation —
// decoding an embedded JSON payload under a `Results` key — is caught
// locally, downgraded to a plain key-value item, and recorded as a
// non-fatal incident on the result.

use crate::core::model::{ContentItem, ContentPayload, Icon, Severity, Step};
use crate::util::constants;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Key whose brace-delimited values are decoded as embedded JSON.
const RESULTS_KEY: &str = "Results";

/// Result of parsing one log blob.
#[derive(Debug)]
pub struct ParseResult {
    /// Ordered steps, in first-appearance order.
    pub steps: Vec<Step>,
    /// Non-fatal incidents encountered (capped at MAX_PARSE_INCIDENTS).
    pub incidents: Vec<ParseIncident>,
    /// Total lines processed, including blank lines.
    pub lines_processed: u64,
}

/// A recoverable oddity noticed while parsing. Incidents never abort the
/// parse; they exist so callers can surface data-quality problems.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseIncident {
    /// A `Results` value looked like JSON but failed to decode. The item
    /// was kept as a key-value pair with the raw string value.
    JsonPayload {
        line_number: u64,
        key: String,
        raw_value: String,
        reason: String,
    },
}

impl fmt::Display for ParseIncident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonPayload {
                line_number,
                key,
                reason,
                ..
            } => write!(
                f,
                "line {line_number}: embedded JSON under '{key}' failed to decode \
                 ({reason}); kept as key-value"
            ),
        }
    }
}

// =============================================================================
// Compiled patterns
// =============================================================================

// Patterns are exercised by the unit tests below, so a mistake shows up as
// a failing test rather than a runtime panic.

fn step_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Step \d+:").expect("step header regex"))
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").expect("timestamp regex")
    })
}

fn list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+):\s*\[(.*)\]$").expect("list regex"))
}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+):\s*(.*)$").expect("key-value regex"))
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse raw flow-log text into an ordered sequence of steps.
///
/// A line matching `Step N:` at the start of a line opens a new step whose
/// header is the trimmed line. Every other non-blank line is classified
/// into exactly one [`ContentItem`] on the current step; content before the
/// first header lands in an implicit "Initialization" step so nothing is
/// lost. Blank lines (including lines that are blank after the timestamp
/// prefix is removed) contribute nothing.
pub fn parse_steps(content: &str) -> ParseResult {
    let mut steps: Vec<Step> = Vec::new();
    let mut current: Option<Step> = None;
    let mut incidents: Vec<ParseIncident> = Vec::new();
    let mut lines_processed: u64 = 0;

    for (line_idx, line) in content.split('\n').enumerate() {
        lines_processed += 1;
        let line_number = (line_idx as u64) + 1;

        // Header lines start a new step and are not emitted as content.
        if step_header_re().is_match(line) {
            if let Some(step) = current.take() {
                steps.push(step);
            }
            current = Some(Step::new(line.trim()));
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        // Lines reduced to nothing by timestamp stripping also carry no item.
        let Some(item) = classify_line(line, line_number, &mut incidents) else {
            continue;
        };

        current
            .get_or_insert_with(|| Step::new(Step::INIT_HEADER))
            .content
            .push(item);
    }

    if let Some(step) = current {
        steps.push(step);
    }

    tracing::debug!(
        steps = steps.len(),
        incidents = incidents.len(),
        lines = lines_processed,
        "Flow log parsed"
    );

    ParseResult {
        steps,
        incidents,
        lines_processed,
    }
}

/// Classify one non-header, non-blank line into a content item.
///
/// Precedence: list, then key-value (with JSON upgrade for `Results`),
/// then severity-keyword message, then plain message. A bracket-delimited
/// value is always a list even though the generic key-value pattern would
/// also match it.
///
/// Returns `None` when the line is whitespace-only after the timestamp
/// prefix is removed.
fn classify_line(
    line: &str,
    line_number: u64,
    incidents: &mut Vec<ParseIncident>,
) -> Option<ContentItem> {
    let (timestamp, text) = split_timestamp(line);
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = list_re().captures(&text) {
        let key = caps[1].trim().to_string();
        let values: Vec<String> = caps[2]
            .split(',')
            .map(|v| strip_quotes(v.trim()).to_string())
            .filter(|v| !v.is_empty())
            .collect();
        return Some(ContentItem {
            timestamp,
            raw_text: line.to_string(),
            icon: Icon::ListUl,
            payload: ContentPayload::List { key, values },
        });
    }

    if let Some(caps) = key_value_re().captures(&text) {
        let key = caps[1].trim().to_string();
        let value = caps[2].trim().to_string();

        if key == RESULTS_KEY && value.starts_with('{') && value.ends_with('}') {
            match serde_json::from_str::<serde_json::Value>(&value) {
                Ok(data) => {
                    return Some(ContentItem {
                        timestamp,
                        raw_text: line.to_string(),
                        icon: Icon::Code,
                        payload: ContentPayload::Json { key, data },
                    });
                }
                Err(e) => {
                    // Downgrade to key-value with the raw string preserved.
                    tracing::debug!(
                        line_number,
                        error = %e,
                        preview = truncate_preview(&value),
                        "Embedded JSON payload failed to decode"
                    );
                    if incidents.len() < constants::MAX_PARSE_INCIDENTS {
                        incidents.push(ParseIncident::JsonPayload {
                            line_number,
                            key: key.clone(),
                            raw_value: value.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        return Some(ContentItem {
            timestamp,
            raw_text: line.to_string(),
            icon: Icon::CaretRight,
            payload: ContentPayload::KeyValue { key, value },
        });
    }

    let severity = scan_severity(&text);
    Some(ContentItem {
        timestamp,
        raw_text: line.to_string(),
        icon: Icon::for_severity(severity),
        payload: ContentPayload::Message {
            severity,
            text,
        },
    })
}

/// Extract an optional leading `YYYY-MM-DD HH:MM:SS` timestamp, returning
/// the literal timestamp string and the trimmed remaining text.
fn split_timestamp(line: &str) -> (Option<String>, String) {
    match timestamp_re().find(line) {
        Some(m) => (
            Some(m.as_str().to_string()),
            line[m.end()..].trim().to_string(),
        ),
        None => (None, line.trim().to_string()),
    }
}

/// Severity from substring presence. The scan is deliberately case-exact
/// on the two spellings each producer actually emits (`ERROR`/`Error`
/// etc.); a lowercase `error` stays plain, matching the de facto contract.
fn scan_severity(text: &str) -> Severity {
    if text.contains("ERROR") || text.contains("Error") {
        Severity::Error
    } else if text.contains("WARNING") || text.contains("Warning") {
        Severity::Warning
    } else if text.contains("INFO") || text.contains("Info") {
        Severity::Info
    } else if text.contains("SUCCESS") || text.contains("Success") {
        Severity::Success
    } else {
        Severity::Plain
    }
}

/// Strip one leading and one trailing quote character (`'` or `"`).
fn strip_quotes(v: &str) -> &str {
    let quotes: &[char] = &['\'', '"'];
    let v = v.strip_prefix(quotes).unwrap_or(v);
    v.strip_suffix(quotes).unwrap_or(v)
}

/// Bounded preview of a line for debug logging.
fn truncate_preview(s: &str) -> &str {
    let max = constants::DEBUG_MAX_LINE_PREVIEW;
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_item(input: &str) -> ContentItem {
        let result = parse_steps(input);
        assert_eq!(result.steps.len(), 1, "expected one step for {input:?}");
        assert_eq!(
            result.steps[0].content.len(),
            1,
            "expected one item for {input:?}"
        );
        result.steps[0].content[0].clone()
    }

    // -------------------------------------------------------------------------
    // Step accumulation
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_input_yields_no_steps() {
        let result = parse_steps("");
        assert!(result.steps.is_empty());
        assert!(result.incidents.is_empty());
    }

    #[test]
    fn test_blank_only_input_yields_no_steps() {
        let result = parse_steps("\n   \n\t\n");
        assert!(result.steps.is_empty());
    }

    #[test]
    fn test_headers_demarcate_steps_in_order() {
        let result = parse_steps(
            "Step 1: Extracting job fields\n\
             Title: Senior Engineer\n\
             Step 2: Scoring resumes\n\
             Scored 3 resumes\n",
        );
        assert_eq!(result.steps.len(), 2);
        assert_eq!(
            result.steps[0].header.as_deref(),
            Some("Step 1: Extracting job fields")
        );
        assert_eq!(
            result.steps[1].header.as_deref(),
            Some("Step 2: Scoring resumes")
        );
        assert_eq!(result.steps[0].content.len(), 1);
        assert_eq!(result.steps[1].content.len(), 1);
    }

    #[test]
    fn test_header_line_is_not_emitted_as_content() {
        let result = parse_steps("Step 1: Setup\n");
        assert_eq!(result.steps.len(), 1);
        assert!(result.steps[0].content.is_empty());
    }

    #[test]
    fn test_header_requires_line_start() {
        // Indented "Step N:" is ordinary content, not a header.
        let result = parse_steps("Step 1: Setup\n  Step 2: not a header\n");
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].content.len(), 1);
    }

    #[test]
    fn test_preheader_content_lands_in_initialization_step() {
        let result = parse_steps("Created sample resume\nStep 1: Setup\nINFO ready\n");
        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps[0].header.as_deref(), Some(Step::INIT_HEADER));
        assert_eq!(result.steps[0].content.len(), 1);
    }

    /// Leading blank lines before pre-header content must not suppress the
    /// implicit step: it is created lazily on the first non-blank line.
    #[test]
    fn test_blank_lines_before_preheader_content() {
        let result = parse_steps("\n\nstarting up\nStep 1: Go\n");
        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps[0].header.as_deref(), Some(Step::INIT_HEADER));
        assert_eq!(result.steps[0].content.len(), 1);
    }

    /// Pre-header content uses the full classification chain, structured
    /// shapes included.
    #[test]
    fn test_preheader_content_is_fully_classified() {
        let result = parse_steps("Tags: [a, b]\nStep 1: Go\n");
        let item = &result.steps[0].content[0];
        assert!(matches!(
            item.payload,
            ContentPayload::List { ref key, ref values }
                if key == "Tags" && values == &vec!["a".to_string(), "b".to_string()]
        ));
    }

    #[test]
    fn test_final_step_is_flushed_at_end_of_input() {
        // No trailing newline.
        let result = parse_steps("Step 1: Only");
        assert_eq!(result.steps.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Blank-line and order invariants
    // -------------------------------------------------------------------------

    #[test]
    fn test_blank_lines_are_dropped_within_steps() {
        let result = parse_steps("Step 1: Setup\n\none\n   \ntwo\n");
        assert_eq!(result.steps[0].content.len(), 2);
    }

    /// A line holding only a timestamp is blank after stripping and is
    /// skipped entirely.
    #[test]
    fn test_timestamp_only_line_is_skipped() {
        let result = parse_steps("Step 1: Setup\n2024-01-01 10:00:00   \n");
        assert!(result.steps[0].content.is_empty());
    }

    #[test]
    fn test_items_preserve_source_line_order() {
        let result = parse_steps("Step 1: Setup\nfirst\nsecond\nthird\n");
        let texts: Vec<_> = result.steps[0]
            .content
            .iter()
            .map(|i| i.search_text().to_string())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    /// Every non-blank non-header line maps to exactly one item.
    #[test]
    fn test_nonblank_line_count_equals_item_count() {
        let input = "intro\nStep 1: A\nx: 1\n\ny: [a]\nStep 2: B\nSUCCESS done\n";
        let result = parse_steps(input);
        let non_blank_non_header = input
            .split('\n')
            .filter(|l| !l.trim().is_empty() && !step_header_re().is_match(l))
            .count();
        let total_items: usize = result.steps.iter().map(|s| s.content.len()).sum();
        assert_eq!(total_items, non_blank_non_header);
    }

    // -------------------------------------------------------------------------
    // Classification: lists
    // -------------------------------------------------------------------------

    #[test]
    fn test_list_round_trip() {
        let item = single_item("Tags: [a, b, 'c', \"d\"]");
        assert_eq!(item.icon, Icon::ListUl);
        match item.payload {
            ContentPayload::List { key, values } => {
                assert_eq!(key, "Tags");
                assert_eq!(values, vec!["a", "b", "c", "d"]);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_list_discards_empty_entries() {
        let item = single_item("Skills: [Python, , '', SQL]");
        match item.payload {
            ContentPayload::List { values, .. } => {
                assert_eq!(values, vec!["Python", "SQL"]);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_brackets_yield_empty_list() {
        let item = single_item("Achievements: []");
        match item.payload {
            ContentPayload::List { values, .. } => assert!(values.is_empty()),
            other => panic!("expected list, got {other:?}"),
        }
    }

    /// Bracket-delimited values are lists even though the generic
    /// key-value pattern also matches the line.
    #[test]
    fn test_list_takes_precedence_over_key_value() {
        let item = single_item("Skills: [Python]");
        assert!(matches!(item.payload, ContentPayload::List { .. }));
    }

    // -------------------------------------------------------------------------
    // Classification: key-value and JSON
    // -------------------------------------------------------------------------

    #[test]
    fn test_key_value_basic() {
        let item = single_item("  Title: Senior Software Engineer");
        assert_eq!(item.icon, Icon::CaretRight);
        match item.payload {
            ContentPayload::KeyValue { key, value } => {
                assert_eq!(key, "Title");
                assert_eq!(value, "Senior Software Engineer");
            }
            other => panic!("expected key-value, got {other:?}"),
        }
    }

    #[test]
    fn test_key_value_empty_value() {
        let item = single_item("Location:");
        match item.payload {
            ContentPayload::KeyValue { key, value } => {
                assert_eq!(key, "Location");
                assert_eq!(value, "");
            }
            other => panic!("expected key-value, got {other:?}"),
        }
    }

    #[test]
    fn test_results_json_success() {
        let item = single_item("Results: {\"a\": 1}");
        assert_eq!(item.icon, Icon::Code);
        match item.payload {
            ContentPayload::Json { key, data } => {
                assert_eq!(key, "Results");
                assert_eq!(data["a"], 1);
            }
            other => panic!("expected json, got {other:?}"),
        }
    }

    #[test]
    fn test_results_json_fallback_keeps_raw_value() {
        let input = "Step 1: Run\nResults: {not valid json}\n";
        let result = parse_steps(input);
        let item = &result.steps[0].content[0];
        match &item.payload {
            ContentPayload::KeyValue { key, value } => {
                assert_eq!(key, "Results");
                assert_eq!(value, "{not valid json}");
            }
            other => panic!("expected key-value fallback, got {other:?}"),
        }
        assert_eq!(result.incidents.len(), 1);
        assert!(matches!(
            result.incidents[0],
            ParseIncident::JsonPayload { line_number: 2, .. }
        ));
    }

    /// Only the exact `Results` key triggers JSON decoding.
    #[test]
    fn test_non_results_braces_stay_key_value() {
        let item = single_item("Payload: {\"a\": 1}");
        assert!(matches!(item.payload, ContentPayload::KeyValue { .. }));
    }

    // -------------------------------------------------------------------------
    // Classification: messages and severities
    // -------------------------------------------------------------------------

    #[test]
    fn test_severity_scan_with_timestamp() {
        let item = single_item("2024-01-01 10:00:00 ERROR disk full");
        assert_eq!(item.timestamp.as_deref(), Some("2024-01-01 10:00:00"));
        assert_eq!(item.icon, Icon::ExclamationCircle);
        match item.payload {
            ContentPayload::Message { severity, text } => {
                assert_eq!(severity, Severity::Error);
                assert_eq!(text, "ERROR disk full");
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_severity_precedence_error_wins() {
        // Contains both markers; ERROR is checked first.
        let item = single_item("ERROR while handling WARNING state");
        assert_eq!(item.severity(), Severity::Error);
    }

    #[test]
    fn test_severity_is_case_exact() {
        let item = single_item("an error occurred");
        assert_eq!(item.severity(), Severity::Plain);
    }

    #[test]
    fn test_mixed_case_spellings_match() {
        assert_eq!(single_item("Warning issued").severity(), Severity::Warning);
        assert_eq!(single_item("INFO starting").severity(), Severity::Info);
        assert_eq!(single_item("Success at last").severity(), Severity::Success);
    }

    #[test]
    fn test_plain_message_keeps_trimmed_text() {
        let item = single_item("   Created sample resume   ");
        assert_eq!(item.severity(), Severity::Plain);
        assert_eq!(item.search_text(), "Created sample resume");
        assert_eq!(item.icon, Icon::CircleNotch);
    }

    #[test]
    fn test_raw_text_preserves_original_line() {
        let item = single_item("  Title: Engineer");
        assert_eq!(item.raw_text, "  Title: Engineer");
    }

    // -------------------------------------------------------------------------
    // End-to-end shape
    // -------------------------------------------------------------------------

    #[test]
    fn test_end_to_end_two_steps() {
        let result =
            parse_steps("Step 1: Setup\nINFO starting\nStep 2: Run\nResults: {\"x\":2}\n");
        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps[0].header.as_deref(), Some("Step 1: Setup"));
        assert_eq!(result.steps[1].header.as_deref(), Some("Step 2: Run"));

        assert_eq!(result.steps[0].content.len(), 1);
        assert_eq!(result.steps[0].content[0].severity(), Severity::Info);

        assert_eq!(result.steps[1].content.len(), 1);
        match &result.steps[1].content[0].payload {
            ContentPayload::Json { data, .. } => assert_eq!(data["x"], 2),
            other => panic!("expected json, got {other:?}"),
        }
    }

    #[test]
    fn test_incident_list_is_capped() {
        let mut input = String::from("Step 1: Flood\n");
        for _ in 0..(constants::MAX_PARSE_INCIDENTS + 10) {
            input.push_str("Results: {broken}\n");
        }
        let result = parse_steps(&input);
        assert_eq!(result.incidents.len(), constants::MAX_PARSE_INCIDENTS);
        // Every line still produced an item despite the cap.
        assert_eq!(
            result.steps[0].content.len(),
            constants::MAX_PARSE_INCIDENTS + 10
        );
    }
}
