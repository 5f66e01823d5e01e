//! The dynamic value model exchanged with a scripting host.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::ScriptError;
use crate::handle::BufferRef;
use crate::library::Library;

/// Return values of a library call. Most calls return zero, one or two.
pub type Values = SmallVec<[Value; 2]>;

/// Signature of a native library function.
pub type Handler = fn(&Library, &[Value]) -> Result<Values, ScriptError>;

/// A host value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absence of a value. Missing arguments read as `Nil`.
    #[default]
    Nil,
    /// A boolean.
    Boolean(bool),
    /// A host integer.
    Integer(i64),
    /// A host float.
    Number(f64),
    /// A string.
    Str(String),
    /// A key/value table.
    Table(Table),
    /// A shared buffer handle.
    Buffer(BufferRef),
    /// A native function.
    Function(Function),
}

impl Value {
    /// Host-facing type name, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
            Value::Buffer(_) => "buffer",
            Value::Function(_) => "function",
        }
    }

    /// Whether the value is `Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Whether the value is an integer or a float.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Number(_))
    }

    /// The value as an integer, accepting floats with an exact integer
    /// representation.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(v) => Some(v),
            Value::Number(v) => float_to_integer(v),
            _ => None,
        }
    }

    /// The value as a float.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Value::Integer(v) => Some(v as f64),
            Value::Number(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The buffer handle, if this is a buffer.
    pub fn as_buffer(&self) -> Option<&BufferRef> {
        match self {
            Value::Buffer(buf) => Some(buf),
            _ => None,
        }
    }

    /// The table, if this is a table.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// The function, if this is a function.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Normalise to a table key. Integral floats become integer keys;
    /// `Nil`, NaN and non-scalar values cannot be keys.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            Value::Str(s) => Some(Key::Str(s.clone())),
            other => other.as_integer().map(Key::Int),
        }
    }
}

/// `f` as an `i64` if it has an exact integer representation.
fn float_to_integer(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Value {
    /// Scalars compare by value (`1 == 1.0`); tables, buffers and functions
    /// compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Integer(i), Value::Number(f)) | (Value::Number(f), Value::Integer(i)) => {
                float_to_integer(*f) == Some(*i)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a.ptr_eq(b),
            (Value::Buffer(a), Value::Buffer(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Table> for Value {
    fn from(v: Table) -> Self {
        Value::Table(v)
    }
}

impl From<BufferRef> for Value {
    fn from(v: BufferRef) -> Self {
        Value::Buffer(v)
    }
}

impl From<Function> for Value {
    fn from(v: Function) -> Self {
        Value::Function(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

// ── Tables ──────────────────────────────────────────────────────

/// A table key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Str(v.to_string())
    }
}

/// A shared, insertion-ordered key/value table.
///
/// Cloning a `Table` clones the handle, not the contents.
#[derive(Clone, Default)]
pub struct Table(Rc<RefCell<IndexMap<Key, Value>>>);

impl Table {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding `values` at integer keys starting from `base`.
    pub fn from_list(base: i64, values: impl IntoIterator<Item = Value>) -> Self {
        let table = Self::new();
        for (key, value) in (base..).zip(values) {
            table.set(Key::Int(key), value);
        }
        table
    }

    /// The value at `key`, or `Nil`.
    pub fn get(&self, key: &Key) -> Value {
        self.0.borrow().get(key).cloned().unwrap_or_default()
    }

    /// Store `value` at `key`. Storing `Nil` removes the entry.
    pub fn set(&self, key: Key, value: Value) {
        let mut map = self.0.borrow_mut();
        if value.is_nil() {
            map.shift_remove(&key);
        } else {
            map.insert(key, value);
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the keys, in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Whether two handles refer to the same table.
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(map) => f.debug_map().entries(map.iter()).finish(),
            Err(_) => f.write_str("Table(<borrowed>)"),
        }
    }
}

// ── Functions ───────────────────────────────────────────────────

/// A native library function exposed to the host.
#[derive(Clone, Copy)]
pub struct Function {
    pub(crate) name: &'static str,
    pub(crate) handler: Handler,
}

impl Function {
    /// The name the function is registered under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the function.
    pub fn call(&self, lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
        (self.handler)(lib, args)
    }
}

impl PartialEq for Function {
    /// Same registered name and same handler.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.handler, other.handler)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function: {}", self.name)
    }
}
