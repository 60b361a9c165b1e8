//! Reactree CLI library - snapshot loading, export and commands.
//!
//! Exposed as a library to enable integration testing.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`fixture`]: Load component-tree snapshots with shared references from JSON
//! - [`export`]: Deliver serialized graphs to files, stdout or data URIs
//! - [`commands`]: `init` and `dump`

pub mod commands;
pub mod config;
pub mod errors;
pub mod export;
pub mod fixture;
pub mod output;

// Re-export commonly used types for convenience
pub use config::{ConfigError, OutputConfig, ReactreeConfig};
pub use errors::ReactreeError;
pub use export::{
    ExportError, ExportOptions, ExportReport, FileSink, PayloadFormat, Sink, WriterSink,
    export_graph,
};
pub use fixture::{FixtureError, load_fixture, parse_fixture};
