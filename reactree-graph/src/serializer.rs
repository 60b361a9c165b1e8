//! Cycle-safe serializer for host object graphs.
//!
//! Walks a [`Value`] graph depth-first, pre-order, in natural field order and
//! produces a tree-shaped [`serde_json::Value`]. A compound value is recorded
//! in the pass's [`VisitedSet`] before its fields are visited; any later edge
//! to a recorded compound is dropped from the output.
//!
//! Two field names get special treatment:
//!
//! - the **type-descriptor** field (default `elementType`): a function value
//!   is reduced to `{ "name": "<declared name>" }`
//! - the **opaque-payload** field (default `memoizedProps`): an object value is
//!   passed through without being checked against or recorded in the visited
//!   set. A payload that is one of its own ancestors is still dropped.
//!
//! ## Example
//!
//! ```rust
//! use reactree_graph::{Function, GraphSerializer, Object};
//!
//! let root = Object::new()
//!     .with("elementType", Function::named("CompA"))
//!     .with("memoizedProps", Object::new().with("x", 5))
//!     .with("other", Object::new());
//!
//! let json = GraphSerializer::default().serialize(&root.into()).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"elementType":{"name":"CompA"},"memoizedProps":{"x":5},"other":{}}"#
//! );
//! ```

use crate::error::SerializationError;
use crate::value::{Array, Identity, Object, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashSet;

/// Default name of the field holding a node's constructor/factory.
pub const DEFAULT_TYPE_DESCRIPTOR_FIELD: &str = "elementType";

/// Default name of the field holding a node's flat props bag.
pub const DEFAULT_OPAQUE_PAYLOAD_FIELD: &str = "memoizedProps";

/// Default nesting limit.
///
/// The walk itself keeps no call stack per level, but encoding and dropping
/// the finished document still recurse once per level.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What to do with a function found outside the type-descriptor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FunctionPolicy {
    /// Omit the field (array slots become `null`).
    #[default]
    Drop,
    /// Fail with [`SerializationError::UnsupportedFunction`].
    Reject,
}

impl std::str::FromStr for FunctionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(FunctionPolicy::Drop),
            "reject" => Ok(FunctionPolicy::Reject),
            _ => Err(format!(
                "Invalid function policy '{}'. Expected one of: drop, reject",
                s
            )),
        }
    }
}

/// Serializer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Field whose function value is reduced to its name.
    #[serde(default = "default_type_descriptor_field")]
    pub type_descriptor_field: String,

    /// Field whose object value is passed through unchanged.
    #[serde(default = "default_opaque_payload_field")]
    pub opaque_payload_field: String,

    /// Policy for functions under any other field.
    #[serde(default)]
    pub function_policy: FunctionPolicy,

    /// Maximum nesting depth before the walk gives up.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Pretty-print the encoded text.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            type_descriptor_field: default_type_descriptor_field(),
            opaque_payload_field: default_opaque_payload_field(),
            function_policy: FunctionPolicy::default(),
            max_depth: default_max_depth(),
            pretty: false,
        }
    }
}

fn default_type_descriptor_field() -> String {
    DEFAULT_TYPE_DESCRIPTOR_FIELD.to_string()
}

fn default_opaque_payload_field() -> String {
    DEFAULT_OPAQUE_PAYLOAD_FIELD.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Identities of the compounds recorded during one serialization pass.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<Identity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity. Returns false if it was already recorded.
    pub fn insert(&mut self, id: Identity) -> bool {
        self.seen.insert(id)
    }

    pub fn contains(&self, id: Identity) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Counters collected during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Compounds recorded in the visited set.
    pub recorded: usize,
    /// Edges dropped because their target was already recorded.
    pub pruned: usize,
    /// Functions dropped under [`FunctionPolicy::Drop`].
    pub dropped_functions: usize,
}

/// Result of [`GraphSerializer::encode`].
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Encoded text; empty when the root is absent.
    pub text: String,
    pub stats: WalkStats,
}

impl Encoded {
    /// Whether the root was absent and nothing was produced.
    pub fn is_absent(&self) -> bool {
        self.text.is_empty()
    }
}

/// Converts host object graphs into cycle-free JSON.
#[derive(Debug, Clone, Default)]
pub struct GraphSerializer {
    config: SerializerConfig,
}

impl GraphSerializer {
    /// Create a serializer with the given configuration.
    pub fn new(config: SerializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Serialize a graph to JSON text.
    ///
    /// A `Null` or `Undefined` root produces an empty string.
    pub fn serialize(&self, root: &Value) -> Result<String, SerializationError> {
        self.encode(root).map(|encoded| encoded.text)
    }

    /// Serialize the value held in `entry_field` of `root`.
    ///
    /// The root container is not recorded as visited, so an edge from the
    /// entry back to the container expands the container once.
    pub fn serialize_entry(
        &self,
        root: &Value,
        entry_field: &str,
    ) -> Result<String, SerializationError> {
        self.serialize(&select_entry(root, entry_field))
    }

    /// Serialize a graph and report walk counters.
    pub fn encode(&self, root: &Value) -> Result<Encoded, SerializationError> {
        let (document, stats) = self.walk(root)?;
        let text = match document {
            None => String::new(),
            Some(doc) if self.config.pretty => serde_json::to_string_pretty(&doc)?,
            Some(doc) => serde_json::to_string(&doc)?,
        };
        Ok(Encoded { text, stats })
    }

    /// Build the output document without encoding it.
    ///
    /// Returns `None` when the root is absent.
    pub fn to_document(&self, root: &Value) -> Result<Option<Json>, SerializationError> {
        self.walk(root).map(|(document, _)| document)
    }

    fn walk(&self, root: &Value) -> Result<(Option<Json>, WalkStats), SerializationError> {
        if root.is_nullish() {
            return Ok((None, WalkStats::default()));
        }

        let mut walk = Walk::new(&self.config);
        let document = walk.run(root)?;
        tracing::debug!(
            "Serialized object graph: {} recorded, {} pruned, {} functions dropped",
            walk.stats.recorded,
            walk.stats.pruned,
            walk.stats.dropped_functions
        );
        Ok((document, walk.stats))
    }
}

/// Pick the value held in `field` of `root`, or `Undefined` if there is none.
pub fn select_entry(root: &Value, field: &str) -> Value {
    root.as_object()
        .and_then(|obj| obj.get(field))
        .unwrap_or(Value::Undefined)
}

/// Longest path printed in full; longer ones keep their head and tail.
const MAX_PATH_SEGMENTS: usize = 32;
const PATH_HEAD: usize = 8;
const PATH_TAIL: usize = 16;

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_FLOAT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A compound whose members are being visited.
enum Container {
    Object(Object),
    Array(Array),
}

impl Container {
    fn identity(&self) -> Identity {
        match self {
            Container::Object(obj) => obj.identity(),
            Container::Array(arr) => arr.identity(),
        }
    }

    /// Key (for objects) and value of the member at `index`.
    fn member(&self, index: usize) -> Option<(Option<String>, Value)> {
        match self {
            Container::Object(obj) => obj
                .fields()
                .get(index)
                .map(|(key, value)| (Some(key.clone()), value.clone())),
            Container::Array(arr) => arr.items().get(index).map(|value| (None, value.clone())),
        }
    }
}

/// Output of a container that is still being filled.
enum Partial {
    Map(serde_json::Map<String, Json>),
    List(Vec<Json>),
}

impl Partial {
    fn finish(self) -> Json {
        match self {
            Partial::Map(map) => Json::Object(map),
            Partial::List(items) => Json::Array(items),
        }
    }
}

/// One open container on the walk stack.
struct Frame {
    container: Container,
    out: Partial,
    next: usize,
    /// Field under which the finished output lands in the parent.
    key: Option<String>,
}

impl Frame {
    fn new(container: Container, key: Option<String>) -> Self {
        let out = match &container {
            Container::Object(obj) => Partial::Map(serde_json::Map::with_capacity(obj.len())),
            Container::Array(arr) => Partial::List(Vec::with_capacity(arr.len())),
        };
        Self {
            container,
            out,
            next: 0,
            key,
        }
    }

    fn next_member(&mut self) -> Option<(usize, Option<String>, Value)> {
        let index = self.next;
        let (key, value) = self.container.member(index)?;
        self.next += 1;
        Some((index, key, value))
    }

    fn attach(&mut self, key: Option<String>, encoded: Option<Json>) {
        match &mut self.out {
            Partial::Map(map) => {
                if let (Some(key), Some(encoded)) = (key, encoded) {
                    map.insert(key, encoded);
                }
            }
            // Positions are significant, so absent elements encode as null.
            Partial::List(items) => items.push(encoded.unwrap_or(Json::Null)),
        }
    }
}

/// What a single value turns into.
enum Step {
    Leaf(Option<Json>),
    Descend(Container),
}

/// State of a single pass. Never outlives one call.
struct Walk<'c> {
    config: &'c SerializerConfig,
    visited: VisitedSet,
    path: Vec<String>,
    stats: WalkStats,
}

impl<'c> Walk<'c> {
    fn new(config: &'c SerializerConfig) -> Self {
        Self {
            config,
            visited: VisitedSet::new(),
            path: Vec::new(),
            stats: WalkStats::default(),
        }
    }

    /// Depth-first, pre-order walk on an explicit stack, so graph depth is
    /// bounded by `max_depth` rather than by the thread's stack.
    fn run(&mut self, root: &Value) -> Result<Option<Json>, SerializationError> {
        let mut stack: Vec<Frame> = Vec::new();
        match self.step(None, root, &stack)? {
            Step::Leaf(encoded) => return Ok(encoded),
            Step::Descend(container) => stack.push(Frame::new(container, None)),
        }

        while let Some(top) = stack.last_mut() {
            let Some((index, key, member)) = top.next_member() else {
                let Some(done) = stack.pop() else { break };
                let encoded = done.out.finish();
                match stack.last_mut() {
                    Some(parent) => {
                        self.path.pop();
                        parent.attach(done.key, Some(encoded));
                    }
                    None => return Ok(Some(encoded)),
                }
                continue;
            };

            self.path.push(key.clone().unwrap_or_else(|| index.to_string()));
            match self.step(key.as_deref(), &member, &stack)? {
                Step::Leaf(encoded) => {
                    self.path.pop();
                    if let Some(top) = stack.last_mut() {
                        top.attach(key, encoded);
                    }
                }
                Step::Descend(container) => stack.push(Frame::new(container, key)),
            }
        }
        Ok(None)
    }

    /// Apply the field rules to one value found under `field`.
    fn step(
        &mut self,
        field: Option<&str>,
        value: &Value,
        ancestors: &[Frame],
    ) -> Result<Step, SerializationError> {
        if let Value::Function(func) = value {
            if field == Some(self.config.type_descriptor_field.as_str()) {
                return Ok(Step::Leaf(Some(serde_json::json!({ "name": func.name() }))));
            }
        }

        let container = match value {
            Value::Object(obj) => Container::Object(obj.clone()),
            Value::Array(arr) => Container::Array(arr.clone()),
            other => return self.leaf(other).map(Step::Leaf),
        };

        let id = container.identity();
        let fresh = if field == Some(self.config.opaque_payload_field.as_str()) {
            // Payloads skip the visited set, but one that contains itself
            // would never end.
            let open = ancestors.iter().any(|frame| frame.container.identity() == id);
            if open {
                self.stats.pruned += 1;
            }
            !open
        } else {
            self.record(id)
        };
        if !fresh {
            return Ok(Step::Leaf(None));
        }

        self.check_depth(ancestors.len())?;
        Ok(Step::Descend(container))
    }

    fn leaf(&mut self, value: &Value) -> Result<Option<Json>, SerializationError> {
        match value {
            Value::Null => Ok(Some(Json::Null)),
            Value::Undefined => Ok(None),
            Value::Bool(b) => Ok(Some(Json::Bool(*b))),
            Value::Integer(n) => Ok(Some(Json::from(*n))),
            Value::Unsigned(n) => Ok(Some(Json::from(*n))),
            Value::Float(f) => Ok(Some(encode_float(*f))),
            Value::String(s) => Ok(Some(Json::String(s.clone()))),
            Value::Function(func) => match self.config.function_policy {
                FunctionPolicy::Drop => {
                    self.stats.dropped_functions += 1;
                    Ok(None)
                }
                FunctionPolicy::Reject => {
                    tracing::debug!("Rejected function '{}' at {}", func.name(), self.location());
                    Err(SerializationError::UnsupportedFunction {
                        path: self.location(),
                        name: func.name().to_string(),
                    })
                }
            },
            Value::Opaque(handle) => Err(SerializationError::EncodingError {
                path: self.location(),
                kind: handle.kind().to_string(),
            }),
            Value::Object(_) | Value::Array(_) => Ok(None),
        }
    }

    fn record(&mut self, id: Identity) -> bool {
        if self.visited.insert(id) {
            self.stats.recorded += 1;
            true
        } else {
            self.stats.pruned += 1;
            false
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), SerializationError> {
        if depth > self.config.max_depth {
            return Err(SerializationError::DepthLimitExceeded {
                path: self.location(),
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    /// JSON-pointer-style location of the value being visited. Very deep
    /// paths are shortened to their first and last segments.
    fn location(&self) -> String {
        if self.path.is_empty() {
            return "/".to_string();
        }

        let len = self.path.len();
        let mut out = String::new();
        if len > MAX_PATH_SEGMENTS {
            push_segments(&mut out, &self.path[..PATH_HEAD]);
            out.push_str(&format!("/...({} more)", len - PATH_HEAD - PATH_TAIL));
            push_segments(&mut out, &self.path[len - PATH_TAIL..]);
        } else {
            push_segments(&mut out, &self.path);
        }
        out
    }
}

fn push_segments(out: &mut String, segments: &[String]) {
    for segment in segments {
        out.push('/');
        out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
}

/// Integral floats print without a fraction, the way a JS host prints them.
/// Non-finite values have no JSON form and become `null`.
fn encode_float(f: f64) -> Json {
    if f.fract() == 0.0 && f.abs() < MAX_SAFE_FLOAT_INTEGER {
        return Json::from(f as i64);
    }
    serde_json::Number::from_f64(f)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}
