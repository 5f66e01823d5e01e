//! Property and index dispatch on buffer objects.
//!
//! `buf[key]` tries, in order: numeric keys as element reads, the getter
//! table (`size`, `length`, `type`), then the library table, so that
//! `buf:get(1)` finds `get`. Assignment tries numeric keys as element
//! writes, then the setter table; other names are ignored.

use smallvec::smallvec;

use crate::error::ScriptError;
use crate::handle::BufferRef;
use crate::library::{Library, LIBRARY};
use crate::resolve::check_integer;
use crate::value::{Function, Value, Values};

type Getter = fn(&Library, &BufferRef) -> Result<Value, ScriptError>;
type Setter = fn(&Library, &BufferRef, &Value) -> Result<(), ScriptError>;

static GETTERS: &[(&str, Getter)] = &[
    ("size", |lib, buf| Ok(Value::Integer(lib.get_size(buf)))),
    ("length", |lib, buf| {
        lib.get_length(buf, &Value::Nil).map(Value::Integer)
    }),
    ("type", |lib, buf| Ok(Value::Integer(lib.get_type(buf)))),
];

static SETTERS: &[(&str, Setter)] = &[
    ("size", |lib, buf, value| {
        lib.set_size(buf, check_integer("setsize", 2, value)?)
    }),
    ("length", |lib, buf, value| {
        lib.set_length(buf, check_integer("setlength", 2, value)?, &Value::Nil)
    }),
    ("type", |lib, buf, value| lib.set_type(buf, value)),
];

impl Library {
    /// `buf[key]`.
    pub fn index(&self, buf: &BufferRef, key: &Value) -> Result<Value, ScriptError> {
        let name = match key {
            Value::Str(name) => name.as_str(),
            key if key.is_number() => {
                return self.get(buf, check_integer("get", 2, key)?, &Value::Nil);
            }
            _ => return Ok(Value::Nil),
        };
        if let Some((_, getter)) = GETTERS.iter().find(|(n, _)| *n == name) {
            return getter(self, buf);
        }
        let value = self.lookup(name);
        #[cfg(debug_assertions)]
        if !value.is_nil() && !LIBRARY.iter().any(|op| op.method && op.name == name) {
            eprintln!(
                "rebuf: '{name}' resolved through the library table but does not take a buffer"
            );
        }
        Ok(value)
    }

    /// `buf[key] = value`.
    pub fn new_index(&self, buf: &BufferRef, key: &Value, value: &Value) -> Result<(), ScriptError> {
        match key {
            Value::Str(name) => match SETTERS.iter().find(|(n, _)| *n == name.as_str()) {
                Some((_, setter)) => setter(self, buf, value),
                None => Ok(()),
            },
            key if key.is_number() => {
                self.set(buf, check_integer("set", 2, key)?, value, &Value::Nil)
            }
            _ => Ok(()),
        }
    }

    /// `#buf`: length under the current type.
    pub fn len(&self, buf: &BufferRef) -> Result<i64, ScriptError> {
        self.get_length(buf, &Value::Nil)
    }

    /// `ipairs(obj)`: the `(iter, obj, start)` triple a generic `for` loop
    /// consumes. Works for buffers and integer-keyed tables.
    ///
    /// # Examples
    ///
    /// ```
    /// use rebuf_script::{Library, Value};
    ///
    /// let lib = Library::default();
    /// let buf = lib.calloc(3, &Value::from("short")).unwrap();
    /// let obj = Value::Buffer(buf);
    ///
    /// let triple = lib.ipairs(&obj);
    /// let (iter, mut control) = (triple[0].clone(), triple[2].clone());
    /// let mut seen = 0;
    /// loop {
    ///     let step = lib.invoke(&iter, &[obj.clone(), control]).unwrap();
    ///     if step[0].is_nil() {
    ///         break;
    ///     }
    ///     control = step[0].clone();
    ///     seen += 1;
    /// }
    /// assert_eq!(seen, 3);
    /// ```
    pub fn ipairs(&self, obj: &Value) -> Values {
        let iter = LIBRARY
            .iter()
            .find(|op| op.name == "iter")
            .map_or(Value::Nil, |op| {
                Value::Function(Function {
                    name: op.name,
                    handler: op.handler,
                })
            });
        smallvec![
            iter,
            obj.clone(),
            Value::Integer(self.config().index_base.offset() - 1)
        ]
    }
}
