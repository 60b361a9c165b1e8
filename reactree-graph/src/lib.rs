//! # reactree-graph
//!
//! Cycle-safe serialization of component object graphs.
//!
//! UI frameworks keep their component trees in object graphs full of parent
//! pointers, alternates and closures. This crate models such a graph with
//! shared [`Value`] handles and turns it into plain JSON:
//!
//! - **Value model**: primitives, functions, opaque host handles, and
//!   identity-carrying [`Object`] / [`Array`] handles
//! - **GraphSerializer**: depth-first walk that prunes repeated references,
//!   reduces constructor fields to their name and passes props bags through
//!
//! ## Example
//!
//! ```rust
//! use reactree_graph::{GraphSerializer, Object};
//!
//! let parent = Object::new().with("id", 1);
//! let child = Object::new().with("id", 2).with("parent", parent.clone());
//! parent.set("child", child);
//!
//! let json = GraphSerializer::default().serialize(&parent.clone().into()).unwrap();
//! assert_eq!(json, r#"{"id":1,"child":{"id":2}}"#);
//!
//! // Break the cycle so the snapshot can be freed.
//! parent.clear();
//! ```

pub mod error;
pub mod serializer;
pub mod value;

pub use error::SerializationError;
pub use serializer::{
    DEFAULT_MAX_DEPTH, DEFAULT_OPAQUE_PAYLOAD_FIELD, DEFAULT_TYPE_DESCRIPTOR_FIELD, Encoded,
    FunctionPolicy, GraphSerializer, SerializerConfig, VisitedSet, WalkStats, select_entry,
};
pub use value::{Array, Function, Identity, Object, Opaque, Value};
