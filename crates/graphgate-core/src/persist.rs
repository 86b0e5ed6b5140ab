//! Whole-document artifact I/O.
//!
//! Reads load the complete file before decoding. Writes go to a temporary
//! file in the destination directory and are renamed into place, so readers
//! never observe a partial document.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{GateError, Result};

/// Read a whole text document.
///
/// # Errors
///
/// Returns [`GateError::Read`] if the file cannot be read.
pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| GateError::read(path, e))
}

/// Read and decode an optional JSON artifact.
///
/// `artifact` names the document in error messages. A missing file yields
/// `Ok(None)`. A file that exists but cannot be read or decoded is still an
/// error.
///
/// # Errors
///
/// Returns [`GateError::Read`] if the file exists but is unreadable and
/// [`GateError::Malformed`] if it does not match the schema.
pub fn read_optional_artifact<T: DeserializeOwned>(path: &Path, artifact: &str) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(text) => decode(&text, artifact).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "optional artifact absent");
            Ok(None)
        }
        Err(e) => Err(GateError::read(path, e)),
    }
}

fn decode<T: DeserializeOwned>(text: &str, artifact: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| GateError::malformed(artifact, e.to_string()))
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
///
/// # Errors
///
/// Returns [`GateError::Write`] if the document cannot be written.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)
        .map_err(|e| GateError::write(path, std::io::Error::other(e)))?;
    text.push('\n');
    write_text(path, &text)
}

/// Atomically replace `path` with `contents`.
///
/// # Errors
///
/// Returns [`GateError::Write`] if the temporary file cannot be created,
/// written, or renamed into place.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GateError::write(path, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| GateError::write(path, e))?;
    tmp.persist(path).map_err(|e| GateError::write(path, e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(())
}

/// Create `dir` (and parents) if it does not exist.
///
/// # Errors
///
/// Returns [`GateError::Write`] if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| GateError::write(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ValidationArtifact;

    #[test]
    fn optional_artifact_absent_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded: Option<ValidationArtifact> =
            read_optional_artifact(&dir.path().join("missing.json"), "validation").expect("ok");
        assert!(loaded.is_none());
    }

    #[test]
    fn optional_artifact_malformed_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").expect("write");
        let err = read_optional_artifact::<ValidationArtifact>(&path, "validation").unwrap_err();
        assert!(matches!(err, GateError::Malformed { .. }));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.validation.json");
        let report = ValidationArtifact::default();
        write_json(&path, &report).expect("write");
        let back: Option<ValidationArtifact> =
            read_optional_artifact(&path, "validation").expect("read");
        assert_eq!(back, Some(report));
        let text = fs::read_to_string(&path).expect("read raw");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("deps.dot");
        write_text(&path, "old").expect("first write");
        write_text(&path, "new").expect("second write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "new");
    }

    #[test]
    fn missing_document_is_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_document(&dir.path().join("x.json")).unwrap_err();
        assert!(matches!(err, GateError::Read { .. }));
    }
}
