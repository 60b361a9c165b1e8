use crate::commands::init::InitError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::fixture::FixtureError;
use crate::output;
use reactree_graph::SerializationError;
use thiserror::Error;

/// Top-level error for every Reactree command.
#[derive(Debug, Error)]
pub enum ReactreeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Init(#[from] InitError),
}

impl ReactreeError {
    /// Get a suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ReactreeError::Config(ConfigError::NotFound(_)) => Some(
                "Run 'reactree init' to create a configuration file, or omit --config to use defaults",
            ),
            ReactreeError::Config(ConfigError::ParseError(_)) => {
                Some("Check reactree.yaml for YAML syntax errors and unknown values.")
            }
            ReactreeError::Config(_) => None,
            ReactreeError::Fixture(FixtureError::UnresolvedRef { .. }) => Some(
                "A $ref must point at an object or array literal, e.g. {\"$ref\": \"/current\"}.",
            ),
            ReactreeError::Fixture(_) => None,
            ReactreeError::Export(ExportError::Serialization(
                SerializationError::UnsupportedFunction { .. },
            )) => Some(
                "Drop --strict-functions and use function_policy \"drop\" to omit function fields.",
            ),
            ReactreeError::Export(ExportError::Serialization(
                SerializationError::DepthLimitExceeded { .. },
            )) => Some("Raise serializer.max_depth in reactree.yaml if the tree is this deep."),
            ReactreeError::Export(ExportError::Serialization(
                SerializationError::EncodingError { .. },
            )) => Some("Native handles cannot be exported; remove them from the snapshot."),
            ReactreeError::Export(_) => None,
            ReactreeError::Init(InitError::FileExists { .. }) => {
                Some("Use --force to overwrite the existing file.")
            }
            ReactreeError::Init(_) => None,
        }
    }

    /// Format error with suggestion for CLI output
    pub fn format_for_cli(&self) -> String {
        let mut output = format!("Error: {}", self);

        if let Some(suggestion) = self.suggestion() {
            output.push_str(&format!("\n\nSuggestion: {}", suggestion));
        }

        output
    }

    /// Report the error once on the console. The log only sees it at debug
    /// level, so stderr carries a single copy.
    pub fn report(&self) {
        tracing::debug!("Command failed: {:?}", self);
        output::error(&self.format_for_cli());
    }
}
