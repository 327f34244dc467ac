// FlowTrace - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// rendering dependencies. These types are the shared vocabulary across
// the parser, filter, summary, export, and rendering layers.

use serde::Serialize;

// =============================================================================
// Step (named group of log content)
// =============================================================================

/// A named group of log content, demarcated by a recognised `Step N:`
/// header line. Content appearing before the first header is collected
/// under an implicit "Initialization" step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Trimmed header line (`"Step 1: Extracting job fields"`), or the
    /// implicit `"Initialization"` label. `None` is accepted by all
    /// consumers for forward compatibility, though the parser always
    /// assigns a header.
    pub header: Option<String>,

    /// Classified content items, in source-line order.
    pub content: Vec<ContentItem>,
}

impl Step {
    /// Label for the implicit step that collects pre-header content.
    pub const INIT_HEADER: &'static str = "Initialization";

    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            content: Vec::new(),
        }
    }
}

// =============================================================================
// Content item (one classified unit of log output)
// =============================================================================

/// One classified unit of log output: a message, key-value pair, list,
/// or embedded JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    /// Leading timestamp exactly as it appeared in the source line
    /// (`YYYY-MM-DD HH:MM:SS`). Kept as a literal string; the summary
    /// layer parses it separately when deriving time bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Original unmodified source line.
    pub raw_text: String,

    /// Presentational icon identifier chosen by the classification.
    /// Not semantically load-bearing.
    pub icon: Icon,

    /// The classified payload.
    #[serde(flatten)]
    pub payload: ContentPayload,
}

impl ContentItem {
    /// Severity of the item, for filtering and summary counts.
    /// Structural items (key-value, list, JSON) carry no severity and
    /// report `Plain`.
    pub fn severity(&self) -> Severity {
        match &self.payload {
            ContentPayload::Message { severity, .. } => *severity,
            _ => Severity::Plain,
        }
    }

    /// Text the filter layer searches: the message text for messages,
    /// the remaining classified fields otherwise. Falls back to the raw
    /// line so structured items stay searchable by their values.
    pub fn search_text(&self) -> &str {
        match &self.payload {
            ContentPayload::Message { text, .. } => text,
            _ => &self.raw_text,
        }
    }
}

/// Tagged payload variant over the four structural classifications.
///
/// The serialised shape mirrors the de facto contract of existing flow-log
/// consumers: a `type` tag plus variant-specific fields (`key`/`value`,
/// `key`/`values`, `key`/`jsonData`, or `text`/`severity`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ContentPayload {
    /// Free-form message with a severity sub-classification.
    #[serde(rename = "message")]
    Message { severity: Severity, text: String },

    /// `key: value` pair.
    #[serde(rename = "keyValue")]
    KeyValue { key: String, value: String },

    /// `key: [a, b, c]` list. Values are trimmed, quote-stripped, and
    /// never empty.
    #[serde(rename = "list")]
    List { key: String, values: Vec<String> },

    /// Embedded JSON payload (only produced for the `Results` key).
    #[serde(rename = "json")]
    Json {
        key: String,
        #[serde(rename = "jsonData")]
        data: serde_json::Value,
    },
}

impl ContentPayload {
    /// Short kind label used in CSV export and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::KeyValue { .. } => "keyValue",
            Self::List { .. } => "list",
            Self::Json { .. } => "json",
        }
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Plain-message sub-classification derived from substring presence,
/// ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
    #[default]
    Plain,
}

impl Severity {
    /// Returns all variants in display order (most severe first).
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Error,
            Severity::Warning,
            Severity::Info,
            Severity::Success,
            Severity::Plain,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
            Severity::Success => "Success",
            Severity::Plain => "Plain",
        }
    }

    /// Short label for compact display (e.g. table columns).
    pub fn short_label(&self) -> &'static str {
        match self {
            Severity::Error => "ERR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
            Severity::Success => "OK",
            Severity::Plain => "-",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Icon
// =============================================================================

/// Symbolic icon identifier attached to every content item.
///
/// Purely presentational: downstream consumers map these to whatever visual
/// representation they use. The serialised names keep the identifiers the
/// existing flow-log consumers already recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Icon {
    /// Plain message.
    #[serde(rename = "fa-circle-notch")]
    CircleNotch,

    /// Key-value pair.
    #[serde(rename = "fa-caret-right")]
    CaretRight,

    /// List of values.
    #[serde(rename = "fa-list-ul")]
    ListUl,

    /// Embedded JSON payload.
    #[serde(rename = "fa-code")]
    Code,

    /// Error message.
    #[serde(rename = "fa-exclamation-circle")]
    ExclamationCircle,

    /// Warning message.
    #[serde(rename = "fa-exclamation-triangle")]
    ExclamationTriangle,

    /// Informational message.
    #[serde(rename = "fa-info-circle")]
    InfoCircle,

    /// Success message.
    #[serde(rename = "fa-check-circle")]
    CheckCircle,
}

impl Icon {
    /// Stable identifier, identical to the serialised form.
    pub fn name(&self) -> &'static str {
        match self {
            Icon::CircleNotch => "fa-circle-notch",
            Icon::CaretRight => "fa-caret-right",
            Icon::ListUl => "fa-list-ul",
            Icon::Code => "fa-code",
            Icon::ExclamationCircle => "fa-exclamation-circle",
            Icon::ExclamationTriangle => "fa-exclamation-triangle",
            Icon::InfoCircle => "fa-info-circle",
            Icon::CheckCircle => "fa-check-circle",
        }
    }

    /// Single-character glyph for terminal rendering.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::CircleNotch => "·",
            Icon::CaretRight => "▸",
            Icon::ListUl => "≡",
            Icon::Code => "{}",
            Icon::ExclamationCircle => "✖",
            Icon::ExclamationTriangle => "⚠",
            Icon::InfoCircle => "ℹ",
            Icon::CheckCircle => "✔",
        }
    }

    /// Icon for a message with the given severity.
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Error => Icon::ExclamationCircle,
            Severity::Warning => Icon::ExclamationTriangle,
            Severity::Info => Icon::InfoCircle,
            Severity::Success => Icon::CheckCircle,
            Severity::Plain => Icon::CircleNotch,
        }
    }
}
