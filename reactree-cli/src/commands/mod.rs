//! CLI commands for Reactree.
//!
//! - `reactree init` - Initialize a new `reactree.yaml` configuration file
//! - `reactree dump` - Serialize a component-tree snapshot to `data.json`

pub mod dump;
pub mod init;

pub use dump::{DumpOptions, run_dump};
pub use init::{InitOptions, run_init};
