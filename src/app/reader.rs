// FlowTrace - app/reader.rs
//
// The log-retrieval collaborator: hands the parser a fully-read text blob.
// The parser itself never performs I/O.

use crate::util::constants;
use crate::util::error::ReadError;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read the raw log text from a file, or from stdin when `path` is `None`.
///
/// Size limits are enforced before reading (file) or while reading (stdin)
/// so a mis-pointed path cannot balloon memory.
pub fn read_log_text(path: Option<&Path>) -> Result<String, ReadError> {
    match path {
        Some(path) => read_file(path),
        None => read_stdin(),
    }
}

fn read_file(path: &Path) -> Result<String, ReadError> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReadError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(ReadError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if !metadata.is_file() {
        return Err(ReadError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    if metadata.len() > constants::MAX_LOG_FILE_SIZE {
        return Err(ReadError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_LOG_FILE_SIZE,
        });
    }

    let bytes = fs::read(path).map_err(|e| ReadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    decode(bytes, path)
}

fn read_stdin() -> Result<String, ReadError> {
    let label = PathBuf::from("<stdin>");
    let mut bytes = Vec::new();

    // Read one byte past the limit so an over-long stream is detected
    // rather than silently truncated.
    std::io::stdin()
        .lock()
        .take(constants::MAX_STDIN_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| ReadError::Io {
            path: label.clone(),
            source: e,
        })?;

    if bytes.len() as u64 > constants::MAX_STDIN_BYTES {
        return Err(ReadError::TooLarge {
            path: label,
            size: bytes.len() as u64,
            max_size: constants::MAX_STDIN_BYTES,
        });
    }

    decode(bytes, &label)
}

fn decode(bytes: Vec<u8>, path: &Path) -> Result<String, ReadError> {
    let text = String::from_utf8(bytes).map_err(|e| ReadError::InvalidEncoding {
        path: path.to_path_buf(),
        source: e.utf8_error(),
    })?;

    tracing::debug!(
        source = %path.display(),
        bytes = text.len(),
        "Log text read"
    );
    Ok(text)
}
