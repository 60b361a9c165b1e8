//! Exporting serialized graphs to a destination.
//!
//! The serializer's contract ends at producing a string. Delivering that
//! string somewhere (a file, stdout, a `data:` URI for a download link) is the
//! job of a [`Sink`].
//!
//! [`export_graph`] runs serialize-then-deliver and returns any failure to
//! the caller, which reports it.

use reactree_graph::{GraphSerializer, SerializationError, Value, WalkStats, select_entry};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of the download-link payload.
pub const DATA_URI_PREFIX: &str = "data:text/json;charset=utf-8,";

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "data.json";

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serializing the graph failed.
    #[error("Failed to serialize graph: {0}")]
    Serialization(#[from] SerializationError),

    /// Writing the payload failed.
    #[error("Failed to write {destination}: {source}")]
    WriteError {
        destination: String,
        #[source]
        source: std::io::Error,
    },
}

/// How the payload is framed before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// Raw JSON text.
    #[default]
    Json,
    /// JSON wrapped as a `data:text/json` URI.
    DataUri,
}

impl PayloadFormat {
    /// Frame the serialized text.
    pub fn frame(&self, json: &str) -> String {
        match self {
            PayloadFormat::Json => json.to_string(),
            PayloadFormat::DataUri => format!("{}{}", DATA_URI_PREFIX, json),
        }
    }
}

/// A destination for exported payloads.
pub trait Sink {
    /// Deliver the framed payload.
    fn deliver(&mut self, payload: &str) -> Result<(), ExportError>;

    /// Human-readable description of the destination.
    fn describe(&self) -> String;
}

/// Writes the payload to a file, creating parent directories.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_FILE)
    }
}

impl Sink for FileSink {
    fn deliver(&mut self, payload: &str) -> Result<(), ExportError> {
        let write_error = |source| ExportError::WriteError {
            destination: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }
        fs::write(&self.path, payload).map_err(write_error)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes the payload to any writer (stdout, a buffer).
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    label: String,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), "stdout")
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn deliver(&mut self, payload: &str) -> Result<(), ExportError> {
        let write_error = |source| ExportError::WriteError {
            destination: self.label.clone(),
            source,
        };
        writeln!(self.writer, "{}", payload).map_err(write_error)?;
        self.writer.flush().map_err(write_error)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Options for one export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Field of the root to export instead of the root itself.
    pub entry_field: Option<String>,
    pub format: PayloadFormat,
}

/// Summary of a finished export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Where the payload went; `None` if nothing was delivered.
    pub destination: Option<String>,
    /// Bytes delivered.
    pub bytes: usize,
    pub stats: WalkStats,
}

impl ExportReport {
    /// Whether the root was absent and nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
    }
}

/// Serialize `root` and deliver it to `sink`.
///
/// An absent root (or a missing entry field) delivers nothing and is not an
/// error.
pub fn export_graph(
    serializer: &GraphSerializer,
    root: &Value,
    options: &ExportOptions,
    sink: &mut dyn Sink,
) -> Result<ExportReport, ExportError> {
    let selected;
    let target = match &options.entry_field {
        Some(field) => {
            selected = select_entry(root, field);
            &selected
        }
        None => root,
    };

    let encoded = serializer.encode(target)?;
    if encoded.is_absent() {
        tracing::warn!("Nothing to export: the selected root is absent");
        return Ok(ExportReport {
            destination: None,
            bytes: 0,
            stats: encoded.stats,
        });
    }

    let payload = options.format.frame(&encoded.text);
    sink.deliver(&payload)?;
    tracing::info!(
        "Exported {} bytes to {} ({} nodes, {} back-references pruned)",
        payload.len(),
        sink.describe(),
        encoded.stats.recorded,
        encoded.stats.pruned
    );

    Ok(ExportReport {
        destination: Some(sink.describe()),
        bytes: payload.len(),
        stats: encoded.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reactree_graph::{Object, Opaque};
    use tempfile::tempdir;

    fn cyclic_container() -> Object {
        let container = Object::new().with("tag", 1);
        let current = Object::new().with("tag", 3).with("stateNode", container.clone());
        container.set("current", current);
        container
    }

    fn buffer_sink() -> WriterSink<Vec<u8>> {
        WriterSink::new(Vec::new(), "buffer")
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data.json");
        let mut sink = FileSink::new(&path);
        let container = cyclic_container();

        let report = export_graph(
            &GraphSerializer::default(),
            &container.clone().into(),
            &ExportOptions {
                entry_field: Some("current".to_string()),
                format: PayloadFormat::Json,
            },
            &mut sink,
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, r#"{"tag":3,"stateNode":{"tag":1}}"#);
        assert_eq!(report.bytes, written.len());
        assert_eq!(report.stats.pruned, 1);
        assert!(!report.is_empty());

        container.clear();
    }

    #[test]
    fn test_export_data_uri() {
        let mut sink = buffer_sink();
        let root = Object::new().with("id", 1);

        export_graph(
            &GraphSerializer::default(),
            &root.into(),
            &ExportOptions {
                entry_field: None,
                format: PayloadFormat::DataUri,
            },
            &mut sink,
        )
        .unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "data:text/json;charset=utf-8,{\"id\":1}\n");
    }

    #[test]
    fn test_absent_entry_delivers_nothing() {
        let mut sink = buffer_sink();
        let root = Object::new().with("id", 1);

        let report = export_graph(
            &GraphSerializer::default(),
            &root.into(),
            &ExportOptions {
                entry_field: Some("current".to_string()),
                ..ExportOptions::default()
            },
            &mut sink,
        )
        .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.bytes, 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_serialization_failure_is_returned() {
        let mut sink = buffer_sink();
        let root = Object::new().with("stateNode", Opaque::new("HTMLCanvasElement"));

        let err = export_graph(
            &GraphSerializer::default(),
            &root.into(),
            &ExportOptions::default(),
            &mut sink,
        )
        .unwrap_err();

        assert!(matches!(err, ExportError::Serialization(_)));
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_unwritable_destination_is_write_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be written as a file.
        let mut sink = FileSink::new(dir.path());
        let root = Object::new().with("id", 1);

        let err = export_graph(
            &GraphSerializer::default(),
            &root.into(),
            &ExportOptions::default(),
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::WriteError { .. }));
    }

    #[test]
    fn test_default_file_sink() {
        assert_eq!(FileSink::default().path(), Path::new("data.json"));
    }
}
