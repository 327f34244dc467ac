// FlowTrace - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal
// chain for diagnostic logging.
//
// Note that parsing itself has no error type: the step parser is a total
// function of its input. Malformed embedded JSON is recorded as a
// `ParseIncident` on the parse result, not raised as an error.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all FlowTrace operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum FlowTraceError {
    /// Reading the log source failed.
    Read(ReadError),

    /// Filter operation failed.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),
}

impl fmt::Display for FlowTraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "Read error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for FlowTraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Read errors
// ---------------------------------------------------------------------------

/// Errors related to retrieving the raw log text.
#[derive(Debug)]
pub enum ReadError {
    /// The log file does not exist.
    NotFound { path: PathBuf },

    /// The path exists but is a directory, not a file.
    NotAFile { path: PathBuf },

    /// The log source exceeds the maximum accepted size.
    TooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Log content is not valid UTF-8.
    InvalidEncoding {
        path: PathBuf,
        source: std::str::Utf8Error,
    },

    /// I/O error while reading the log source.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Log file '{}' does not exist", path.display())
            }
            Self::NotAFile { path } => {
                write!(f, "'{}' is not a file", path.display())
            }
            Self::TooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Log '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::InvalidEncoding { path, source } => {
                write!(f, "'{}': invalid UTF-8 encoding: {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEncoding { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ReadError> for FlowTraceError {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter operations.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid filter regex '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
        }
    }
}

impl From<FilterError> for FlowTraceError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export output.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum item count.
    TooManyItems { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyItems { count, max } => write!(
                f,
                "Export of {count} items exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for FlowTraceError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for FlowTrace results.
pub type Result<T> = std::result::Result<T, FlowTraceError>;
