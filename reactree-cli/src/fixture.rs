//! Loading host graph snapshots from JSON fixtures.
//!
//! Plain JSON cannot express shared references, functions or native handles,
//! so fixtures use single-key marker objects:
//!
//! | marker | meaning |
//! |---|---|
//! | `{"$ref": "/child/0"}` | the object or array at that JSON pointer (`""` is the root) |
//! | `{"$fn": "CompA"}` | a function with the given declared name |
//! | `{"$opaque": "HTMLDivElement"}` | a native handle that cannot be encoded |
//! | `{"$undefined": true}` | a field that exists but holds nothing |
//!
//! `$ref` pointers are resolved against the fixture document, so a reference
//! may point forward or backward and cycles are allowed. The target must be a
//! literal object or array, not another marker.
//!
//! ```json
//! {
//!   "current": {
//!     "tag": 3,
//!     "stateNode": { "$ref": "" },
//!     "child": {
//!       "elementType": { "$fn": "App" },
//!       "return": { "$ref": "/current" }
//!     }
//!   }
//! }
//! ```

use reactree_graph::{Array, Function, Object, Opaque, Value};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Fixture file was not found.
    #[error("Fixture file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the fixture file.
    #[error("Failed to read fixture: {0}")]
    ReadError(#[from] std::io::Error),

    /// The fixture is not valid JSON.
    #[error("Failed to parse fixture: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A `$ref` points at nothing, or at something without identity.
    #[error("Unresolved reference '{pointer}' at {at}")]
    UnresolvedRef { pointer: String, at: String },

    /// A marker object is malformed.
    #[error("Invalid marker at {at}: {reason}")]
    InvalidMarker { at: String, reason: String },
}

/// Load a fixture file into a value graph.
pub fn load_fixture(path: &Path) -> Result<Value, FixtureError> {
    if !path.exists() {
        return Err(FixtureError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let value = parse_fixture(&content)?;
    tracing::debug!("Loaded fixture {}", path.display());
    Ok(value)
}

/// Parse fixture text into a value graph.
pub fn parse_fixture(content: &str) -> Result<Value, FixtureError> {
    let json: Json = serde_json::from_str(content)?;
    from_json(&json)
}

/// Build a value graph from an already-parsed fixture document.
pub fn from_json(json: &Json) -> Result<Value, FixtureError> {
    let mut loader = Loader::default();
    let root = match loader.build(json, String::new())? {
        Built::Value(value) => value,
        Built::Ref(pointer) => {
            return Err(FixtureError::InvalidMarker {
                at: display_pointer(""),
                reason: format!("the root cannot be a reference (to '{}')", pointer),
            });
        }
    };
    loader.resolve()?;
    Ok(root)
}

/// Outcome of building one JSON node.
enum Built {
    Value(Value),
    /// A `$ref` to be patched in once every compound exists.
    Ref(String),
}

/// A slot waiting for a `$ref` target.
enum Slot {
    Field(Object, String),
    Index(Array, usize),
}

struct Pending {
    slot: Slot,
    pointer: String,
    at: String,
}

#[derive(Default)]
struct Loader {
    /// Compounds by the JSON pointer of their literal.
    compounds: HashMap<String, Value>,
    pending: Vec<Pending>,
}

impl Loader {
    fn build(&mut self, json: &Json, pointer: String) -> Result<Built, FixtureError> {
        let value = match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Unsigned(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => {
                let arr = Array::new();
                self.compounds.insert(pointer.clone(), arr.clone().into());
                for (index, item) in items.iter().enumerate() {
                    let child = format!("{}/{}", pointer, index);
                    match self.build(item, child.clone())? {
                        Built::Value(value) => arr.push(value),
                        Built::Ref(target) => {
                            arr.push(Value::Null);
                            self.pending.push(Pending {
                                slot: Slot::Index(arr.clone(), index),
                                pointer: target,
                                at: display_pointer(&child),
                            });
                        }
                    }
                }
                Value::Array(arr)
            }
            Json::Object(map) => {
                if let Some(marker) = self.marker(map, &pointer)? {
                    return Ok(marker);
                }

                let obj = Object::new();
                self.compounds.insert(pointer.clone(), obj.clone().into());
                for (key, item) in map {
                    let child = format!("{}/{}", pointer, escape_token(key));
                    match self.build(item, child.clone())? {
                        Built::Value(value) => obj.set(key.clone(), value),
                        Built::Ref(target) => {
                            // Placeholder keeps the field in document order.
                            obj.set(key.clone(), Value::Undefined);
                            self.pending.push(Pending {
                                slot: Slot::Field(obj.clone(), key.clone()),
                                pointer: target,
                                at: display_pointer(&child),
                            });
                        }
                    }
                }
                Value::Object(obj)
            }
        };
        Ok(Built::Value(value))
    }

    /// Interpret a single-key `$` object, if it is one.
    fn marker(
        &self,
        map: &serde_json::Map<String, Json>,
        pointer: &str,
    ) -> Result<Option<Built>, FixtureError> {
        if map.len() != 1 {
            return Ok(None);
        }
        let Some((key, value)) = map.iter().next() else {
            return Ok(None);
        };

        let invalid = |reason: &str| FixtureError::InvalidMarker {
            at: display_pointer(pointer),
            reason: reason.to_string(),
        };

        let built = match key.as_str() {
            "$ref" => {
                let target = value
                    .as_str()
                    .ok_or_else(|| invalid("$ref must be a JSON pointer string"))?;
                let target = target.strip_prefix('#').unwrap_or(target);
                Built::Ref(target.to_string())
            }
            "$fn" => {
                let name = value
                    .as_str()
                    .ok_or_else(|| invalid("$fn must be a function name string"))?;
                Built::Value(Function::named(name).into())
            }
            "$opaque" => {
                let kind = value
                    .as_str()
                    .ok_or_else(|| invalid("$opaque must be a handle kind string"))?;
                Built::Value(Opaque::new(kind).into())
            }
            "$undefined" => {
                if value != &Json::Bool(true) {
                    return Err(invalid("$undefined must be true"));
                }
                Built::Value(Value::Undefined)
            }
            _ => return Ok(None),
        };
        Ok(Some(built))
    }

    /// Patch every pending `$ref` slot with its target compound.
    fn resolve(self) -> Result<(), FixtureError> {
        let resolved = self.pending.len();
        for pending in self.pending {
            let target = self.compounds.get(&pending.pointer).cloned().ok_or_else(|| {
                FixtureError::UnresolvedRef {
                    pointer: pending.pointer.clone(),
                    at: pending.at.clone(),
                }
            })?;

            match pending.slot {
                Slot::Field(obj, key) => obj.set(key, target),
                Slot::Index(arr, index) => {
                    arr.set(index, target);
                }
            }
        }
        tracing::debug!("Resolved {} fixture references", resolved);
        Ok(())
    }
}

/// Escape a key as an RFC 6901 reference token.
fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn display_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
