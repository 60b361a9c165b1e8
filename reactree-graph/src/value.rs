//! Dynamic value model for host object graphs.
//!
//! A [`Value`] mirrors what a UI host hands us: primitives, functions, opaque
//! native handles, and compound values ([`Object`], [`Array`]) that are shared
//! handles. Cloning an `Object` or `Array` clones the handle, not the contents,
//! so back-references and cycles can be expressed.
//!
//! Cyclic graphs built from these handles are reference-counted and are not
//! reclaimed on their own. Call [`Object::clear`] / [`Array::clear`] on a
//! member of the cycle when the snapshot is no longer needed.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Reference identity of a compound value.
///
/// Derived from the allocation address of the shared handle, so it is only
/// meaningful while the value is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// A value in a host object graph.
#[derive(Debug, Clone)]
pub enum Value {
    /// Explicit null.
    Null,
    /// A field that exists but holds nothing; dropped on encode.
    Undefined,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    String(String),
    Object(Object),
    Array(Array),
    Function(Function),
    Opaque(Opaque),
}

impl Value {
    /// Identity of the compound behind this value, if it is one.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Object(obj) => Some(obj.identity()),
            Value::Array(arr) => Some(arr.identity()),
            _ => None,
        }
    }

    /// Whether this is an object or array.
    pub fn is_compound(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    /// Whether this is `Null` or `Undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Unsigned(n),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Array> for Value {
    fn from(arr: Array) -> Self {
        Value::Array(arr)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<Opaque> for Value {
    fn from(handle: Opaque) -> Self {
        Value::Opaque(handle)
    }
}

/// A shared object with named fields in insertion order.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<Vec<(String, Value)>>>);

impl Object {
    /// Create a new empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Replaces the value in place if the key exists, otherwise
    /// appends it.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut fields = self.0.borrow_mut();
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => fields.push((key, value)),
        }
    }

    /// Builder-style [`Object::set`].
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a field value (a cheap handle clone for compounds).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Remove a field, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut fields = self.0.borrow_mut();
        let pos = fields.iter().position(|(k, _)| k == key)?;
        Some(fields.remove(pos).1)
    }

    /// Borrow the fields in enumeration order.
    pub fn fields(&self) -> Ref<'_, Vec<(String, Value)>> {
        self.0.borrow()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Drop every field, breaking any cycle that runs through this object.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn identity(&self) -> Identity {
        Identity(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// Contents may be cyclic, so only the handle is printed.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({}, {} fields)", self.identity(), self.len())
    }
}

/// A shared ordered sequence.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Builder-style [`Array::push`].
    pub fn with(self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    /// Replace the element at `index`. Returns false if out of bounds.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Drop every element, breaking any cycle that runs through this array.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn identity(&self) -> Identity {
        Identity(Rc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array(Rc::new(RefCell::new(iter.into_iter().collect())))
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array({}, {} items)", self.identity(), self.len())
    }
}

/// A function value. Only its declared name survives serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
}

impl Function {
    /// A function with a declared name, e.g. a component constructor.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// A function with no declared name.
    pub fn anonymous() -> Self {
        Self {
            name: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A native host handle (DOM node, timer, ...) that has no text encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    kind: String,
}

impl Opaque {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    /// The host's name for the handle type.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_in_place() {
        let obj = Object::new().with("a", 1).with("b", 2);
        obj.set("a", 3);

        let keys: Vec<String> = obj.fields().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(obj.get("a"), Some(Value::Integer(3))));
    }

    #[test]
    fn test_identity_is_per_handle() {
        let a = Object::new().with("id", 1);
        let b = Object::new().with("id", 1);
        let a2 = a.clone();

        assert_eq!(a.identity(), a2.identity());
        assert_ne!(a.identity(), b.identity());
        assert!(a.ptr_eq(&a2));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_debug_does_not_follow_cycles() {
        let obj = Object::new();
        obj.set("self", obj.clone());

        let rendered = format!("{:?}", Value::Object(obj.clone()));
        assert!(rendered.contains("1 fields"));

        obj.clear();
        assert!(obj.is_empty());
    }

    #[test]
    fn test_array_set_and_get() {
        let arr = Array::new().with(1).with("two");
        assert!(arr.set(0, true));
        assert!(!arr.set(5, true));
        assert!(matches!(arr.get(0), Some(Value::Bool(true))));
        assert_eq!(arr.len(), 2);
    }

    #[test]
    fn test_remove_field() {
        let obj = Object::new().with("a", 1).with("b", 2);
        assert!(matches!(obj.remove("a"), Some(Value::Integer(1))));
        assert!(obj.remove("a").is_none());
        assert_eq!(obj.len(), 1);
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::from("x").kind(), "string");
        assert_eq!(Value::from(Function::anonymous()).kind(), "function");
        assert_eq!(Value::from(Opaque::new("HTMLDivElement")).kind(), "opaque");
        assert!(Value::Undefined.is_nullish());
        assert!(Value::from(Array::new()).is_compound());
    }

    #[test]
    fn test_u64_prefers_signed() {
        assert!(matches!(Value::from(7u64), Value::Integer(7)));
        assert!(matches!(Value::from(u64::MAX), Value::Unsigned(u64::MAX)));
        assert_eq!(Value::from(u64::MAX).kind(), "number");
    }
}
