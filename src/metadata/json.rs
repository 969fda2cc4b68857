//! Whole-file JSON reads and writes with the indentation each record uses

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::metadata::error::MetadataError;

/// Indentation used when a record is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Tab,
    TwoSpaces,
}

impl Indent {
    fn as_bytes(&self) -> &'static [u8] {
        match self {
            Indent::Tab => b"\t",
            Indent::TwoSpaces => b"  ",
        }
    }
}

/// Read and deserialize a JSON file.
///
/// Returns `Ok(None)` when the file does not exist so callers can decide
/// whether absence is an error.
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, MetadataError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(MetadataError::Io {
                path: path.to_path_buf(),
                action: "read",
                source,
            });
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| MetadataError::CorruptRecord {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Serialize `value` with the given indentation and a trailing newline
pub fn to_json_bytes<T: Serialize>(
    value: &T,
    indent: Indent,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Replace the whole file at `path` with the serialized `value`
pub fn write_record<T: Serialize>(
    path: &Path,
    value: &T,
    indent: Indent,
) -> Result<(), MetadataError> {
    let bytes = to_json_bytes(value, indent).map_err(|e| MetadataError::CorruptRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    fs::write(path, bytes).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        action: "write",
        source,
    })?;

    debug!("Wrote {}", path.display());
    Ok(())
}
