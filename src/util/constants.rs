// FlowTrace - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "FlowTrace";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input limits
// =============================================================================

/// Maximum size of a log file accepted for parsing, in bytes. Flow logs are
/// written by a single workflow run and are small; anything beyond this is
/// almost certainly the wrong file.
pub const MAX_LOG_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50 MB

/// Maximum bytes read from stdin before the read is aborted.
pub const MAX_STDIN_BYTES: u64 = MAX_LOG_FILE_SIZE;

// =============================================================================
// Parsing limits
// =============================================================================

/// Maximum number of JSON-payload incidents recorded per parse before
/// suppression. Parsing itself always continues; only the incident list
/// stops growing.
pub const MAX_PARSE_INCIDENTS: usize = 1_000;

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

/// chrono format string matching the literal timestamp prefix convention
/// (`YYYY-MM-DD HH:MM:SS`). Used only to derive summary time bounds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Export
// =============================================================================

/// Maximum number of content items that can be exported in a single operation.
pub const MAX_EXPORT_ITEMS: usize = 1_000_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
