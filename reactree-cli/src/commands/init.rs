//! Implementation of the `reactree init` command.
//!
//! Generates a `reactree.yaml` with every setting spelled out and commented.
//!
//! # Usage
//!
//! ```bash
//! # Create reactree.yaml in current directory
//! reactree init
//!
//! # Specify output path
//! reactree init --output config/reactree.yaml
//!
//! # Overwrite existing file
//! reactree init --force
//! ```

use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::config::CONFIG_FILE_NAME;
use crate::output;

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
    /// Configuration file already exists and --force was not specified.
    #[error("Configuration file already exists: {path}. Use --force to overwrite.")]
    FileExists { path: String },

    /// Failed to write the configuration file.
    #[error("Failed to write configuration file: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Default configuration template with comments.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# reactree.yaml - Reactree configuration file

# ===============================================================================
# SERIALIZER
# ===============================================================================

serializer:
  # Field holding the constructor/factory of a node.
  # A function here is exported as { "name": "<function name>" }.
  type_descriptor_field: "elementType"

  # Field holding a node's flat props bag.
  # Exported as-is, without cycle bookkeeping on the bag itself.
  opaque_payload_field: "memoizedProps"

  # Functions under any other field: "drop" (omit the field) or "reject" (fail)
  function_policy: "drop"

  # Nesting limit; deeper trees fail with a depth error
  max_depth: 256

  # Pretty-print the exported JSON
  pretty: false

# ===============================================================================
# ENTRY
# ===============================================================================
# Field of the snapshot root holding the tree to export.
# Set to null to export the root itself.

entry_field: "current"

# ===============================================================================
# OUTPUT
# ===============================================================================

output:
  # File the export is written to (supports ~ for home directory)
  path: "data.json"

  # Write a data:text/json URI instead of raw JSON
  data_uri: false
"#;

/// Options for the `reactree init` command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output path for the configuration file.
    pub output: Option<String>,
    /// Whether to overwrite an existing file.
    pub force: bool,
}

/// Run the `reactree init` command.
pub fn run_init(options: InitOptions) -> Result<(), InitError> {
    let output_path = options
        .output
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let path = Path::new(&output_path);

    if path.exists() && !options.force {
        return Err(InitError::FileExists { path: output_path });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())?;

    output::success(&format!("Created configuration file: {}", output_path));
    output::verbose("Next: reactree dump <snapshot.json>");

    Ok(())
}
