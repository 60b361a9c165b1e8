//! The `reactree dump` command.
//!
//! Loads a component-tree snapshot fixture, serializes it with cycle pruning
//! and writes the result to the configured export file (`data.json` by
//! default) or to stdout.

use crate::config::ReactreeConfig;
use crate::errors::ReactreeError;
use crate::export::{self, ExportOptions, ExportReport, FileSink, PayloadFormat, Sink, WriterSink};
use crate::fixture;
use crate::output;
use reactree_graph::{FunctionPolicy, GraphSerializer};
use std::path::{Path, PathBuf};

/// Options for the dump command.
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Path to the snapshot fixture
    pub fixture: String,
    /// Path to the configuration file
    pub config: Option<String>,
    /// Override the export file
    pub output: Option<String>,
    /// Write to stdout instead of a file
    pub stdout: bool,
    /// Wrap the payload as a data URI
    pub data_uri: bool,
    /// Override the entry field
    pub entry_field: Option<String>,
    /// Export the snapshot root itself
    pub no_entry: bool,
    /// Pretty-print the JSON
    pub pretty: bool,
    /// Fail on functions outside the type-descriptor field
    pub strict_functions: bool,
}

/// Run the dump command.
pub fn run_dump(options: DumpOptions) -> Result<ExportReport, ReactreeError> {
    let mut config = match &options.config {
        Some(path) => ReactreeConfig::load_from_path(Path::new(path))?,
        None => ReactreeConfig::load_or_default()?,
    };
    apply_overrides(&mut config, &options);
    config.validate()?;

    let root = fixture::load_fixture(Path::new(&options.fixture))?;
    output::verbose(&format!("Loaded snapshot: {}", options.fixture));

    let serializer = GraphSerializer::new(config.serializer.clone());
    let export_options = ExportOptions {
        entry_field: config.entry_field.clone(),
        format: if config.output.data_uri {
            PayloadFormat::DataUri
        } else {
            PayloadFormat::Json
        },
    };

    let mut sink: Box<dyn Sink> = if options.stdout {
        // Keep stdout clean for the payload.
        output::set_quiet(true);
        Box::new(WriterSink::stdout())
    } else {
        Box::new(FileSink::new(config.output.path.clone()))
    };

    let report = export::export_graph(&serializer, &root, &export_options, sink.as_mut())?;
    if report.is_empty() {
        output::warning(&output::export_summary(&report));
    } else {
        output::success(&output::export_summary(&report));
    }

    Ok(report)
}

/// Command-line flags win over the configuration file.
fn apply_overrides(config: &mut ReactreeConfig, options: &DumpOptions) {
    if let Some(path) = &options.output {
        config.output.path = PathBuf::from(path);
    }
    if options.data_uri {
        config.output.data_uri = true;
    }
    if let Some(field) = &options.entry_field {
        config.entry_field = Some(field.clone());
    }
    if options.no_entry {
        config.entry_field = None;
    }
    if options.pretty {
        config.serializer.pretty = true;
    }
    if options.strict_functions {
        config.serializer.function_policy = FunctionPolicy::Reject;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flags_override_config() {
        let mut config = ReactreeConfig::default();
        let options = DumpOptions {
            output: Some("out.json".to_string()),
            data_uri: true,
            no_entry: true,
            entry_field: Some("ignored".to_string()),
            pretty: true,
            strict_functions: true,
            ..DumpOptions::default()
        };

        apply_overrides(&mut config, &options);

        assert_eq!(config.output.path, PathBuf::from("out.json"));
        assert!(config.output.data_uri);
        assert_eq!(config.entry_field, None);
        assert!(config.serializer.pretty);
        assert_eq!(config.serializer.function_policy, FunctionPolicy::Reject);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = ReactreeConfig::default();
        apply_overrides(&mut config, &DumpOptions::default());
        assert_eq!(config, ReactreeConfig::default());
    }

    #[test]
    fn test_entry_field_override() {
        let mut config = ReactreeConfig::default();
        let options = DumpOptions {
            entry_field: Some("root".to_string()),
            ..DumpOptions::default()
        };
        apply_overrides(&mut config, &options);
        assert_eq!(config.entry_field.as_deref(), Some("root"));
    }
}
