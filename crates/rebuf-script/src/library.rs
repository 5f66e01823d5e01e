//! The buffer library: validated operations and the static function table.

use smallvec::smallvec;

use rebuf_core::{Capabilities, ConfigError, ElemType, HostNumerics, Scalar};
use rebuf_engine::{Buffer, EngineError};

use crate::config::AdapterConfig;
use crate::error::ScriptError;
use crate::handle::{current_type, set_type, type_code, BufferRef};
use crate::resolve::{check_integer, check_number, resolve_type, Args};
use crate::value::{Function, Handler, Key, Table, Value, Values};

/// One entry of the library table.
pub(crate) struct Op {
    pub(crate) name: &'static str,
    pub(crate) handler: Handler,
    /// Whether the function takes a buffer as its first argument and so
    /// makes sense as a method.
    pub(crate) method: bool,
}

const fn op(name: &'static str, handler: Handler, method: bool) -> Op {
    Op {
        name,
        handler,
        method,
    }
}

/// Every library function, in registration order.
pub(crate) static LIBRARY: &[Op] = &[
    op("new", lib_new, false),
    op("calloc", lib_calloc, false),
    op("getsize", lib_getsize, true),
    op("setsize", lib_setsize, true),
    op("getlength", lib_getlength, true),
    op("setlength", lib_setlength, true),
    op("gettype", lib_gettype, true),
    op("settype", lib_settype, true),
    op("get", lib_get, true),
    op("set", lib_set, true),
    op("iter", lib_iter, false),
];

/// A configured buffer library for one host.
///
/// Holds the host's capability table and the `types` name table. All
/// operations validate their arguments and report failures as
/// [`ScriptError`]s; none of them panic on bad input.
///
/// # Examples
///
/// ```
/// use rebuf_script::{Library, Value};
///
/// let lib = Library::default();
/// let buf = lib.calloc(4, &Value::from("signed int")).unwrap();
/// lib.set(&buf, 1, &Value::Integer(-5), &Value::Nil).unwrap();
/// assert_eq!(lib.get(&buf, 1, &Value::Nil).unwrap(), Value::Integer(-5));
/// assert_eq!(lib.get_length(&buf, &Value::from("char")).unwrap(), 16);
/// ```
pub struct Library {
    config: AdapterConfig,
    caps: Capabilities,
    types: Table,
}

impl Library {
    /// Build a library for the host described by `config`.
    pub fn new(config: AdapterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let caps = Capabilities::new(config.numerics);
        let types = types_table(&caps);
        Ok(Self {
            config,
            caps,
            types,
        })
    }

    /// The configuration this library was built with.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// The host capability table.
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// The `types` table: type name → unsigned type code, for every type
    /// the host can use.
    pub fn types(&self) -> &Table {
        &self.types
    }

    /// The library function registered under `name`.
    pub fn function(&self, name: &str) -> Option<Function> {
        LIBRARY.iter().find(|op| op.name == name).map(|op| Function {
            name: op.name,
            handler: op.handler,
        })
    }

    /// Look `name` up in the library table: a function, the `types` table,
    /// or `Nil`.
    pub fn lookup(&self, name: &str) -> Value {
        match name {
            "types" => Value::Table(self.types.clone()),
            _ => self.function(name).map_or(Value::Nil, Value::Function),
        }
    }

    /// The whole library as a host table, the way a host module loader
    /// would publish it.
    pub fn exports(&self) -> Table {
        let table = Table::new();
        for op in LIBRARY {
            table.set(Key::from(op.name), self.lookup(op.name));
        }
        table.set(Key::from("types"), Value::Table(self.types.clone()));
        table
    }

    /// Call the library function `name` with positional arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Values, ScriptError> {
        let function = self
            .function(name)
            .ok_or_else(|| ScriptError::runtime("attempt to call a nil value"))?;
        function.call(self, args)
    }

    /// Call a function value, such as one returned by [`index`](Self::index)
    /// or [`ipairs`](Self::ipairs).
    pub fn invoke(&self, callee: &Value, args: &[Value]) -> Result<Values, ScriptError> {
        match callee {
            Value::Function(function) => function.call(self, args),
            _ => Err(ScriptError::runtime("attempt to call a non-function value")),
        }
    }

    // ── Creation ────────────────────────────────────────────────

    /// `new(size)`: a buffer of `size` bytes with type `unsigned char`.
    pub fn create(&self, size: i64) -> Result<BufferRef, ScriptError> {
        if size <= 0 {
            return Err(ScriptError::arg("new", 1, "size must be positive"));
        }
        let size = usize::try_from(size).map_err(|_| EngineError::CapacityOverflow)?;
        Ok(BufferRef::new(Buffer::allocate(size)?))
    }

    /// `calloc(length, elem)`: a zero-filled buffer of `length` elements.
    ///
    /// A numeric `elem` is an element size in bytes and the buffer keeps
    /// type `unsigned char`. Anything else is resolved as a type; its width
    /// becomes the element size and it becomes the buffer's type.
    pub fn calloc(&self, length: i64, elem: &Value) -> Result<BufferRef, ScriptError> {
        if length <= 0 {
            return Err(ScriptError::arg("calloc", 1, "length must be positive"));
        }
        let (elem_size, ty) = if elem.is_number() {
            (check_integer("calloc", 2, elem)?, ElemType::UNSIGNED_CHAR)
        } else {
            let ty = resolve_type(&self.caps, "calloc", 2, elem, None)?;
            (ty.width() as i64, ty)
        };
        if elem_size <= 0 {
            return Err(ScriptError::arg("calloc", 2, "element size must be positive"));
        }
        let overflow = |_| EngineError::CapacityOverflow;
        let length = usize::try_from(length).map_err(overflow)?;
        let elem_size = usize::try_from(elem_size).map_err(overflow)?;
        let mut buf = Buffer::allocate_zeroed(length, elem_size)?;
        set_type(&mut buf, ty);
        Ok(BufferRef::new(buf))
    }

    // ── Size ────────────────────────────────────────────────────

    /// `getsize(buf)`: size in bytes.
    pub fn get_size(&self, buf: &BufferRef) -> i64 {
        buf.borrow().size() as i64
    }

    /// `setsize(buf, size)`: resize to `size` bytes.
    pub fn set_size(&self, buf: &BufferRef, size: i64) -> Result<(), ScriptError> {
        if size <= 0 {
            return Err(ScriptError::arg("setsize", 2, "the size must be positive"));
        }
        resize(buf, usize::try_from(size).ok())
    }

    // ── Length ──────────────────────────────────────────────────

    /// `getlength(buf, type?)`: number of whole elements of `ty` (default:
    /// the buffer's type).
    pub fn get_length(&self, buf: &BufferRef, ty: &Value) -> Result<i64, ScriptError> {
        let buf = buf.borrow();
        let ty = resolve_type(&self.caps, "getlength", 2, ty, Some(&*buf))?;
        Ok(buf.len_as(ty) as i64)
    }

    /// `setlength(buf, length, type?)`: resize to `length` elements of `ty`
    /// (default: the buffer's type). The buffer's type is not changed.
    pub fn set_length(&self, buf: &BufferRef, length: i64, ty: &Value) -> Result<(), ScriptError> {
        let ty = resolve_type(&self.caps, "setlength", 3, ty, Some(&*buf.borrow()))?;
        if length <= 0 {
            return Err(ScriptError::arg("setlength", 2, "the length must be positive"));
        }
        let size = usize::try_from(length)
            .ok()
            .and_then(|length| length.checked_mul(ty.width()));
        resize(buf, size)
    }

    // ── Type ────────────────────────────────────────────────────

    /// `gettype(buf)`: the buffer's current type code.
    pub fn get_type(&self, buf: &BufferRef) -> i64 {
        i64::from(type_code(&buf.borrow()))
    }

    /// `settype(buf, type)`: change the buffer's current type. Only the type
    /// bits of the tag change.
    pub fn set_type(&self, buf: &BufferRef, ty: &Value) -> Result<(), ScriptError> {
        let ty = resolve_type(&self.caps, "settype", 2, ty, Some(&*buf.borrow()))?;
        set_type(&mut buf.borrow_mut(), ty);
        Ok(())
    }

    // ── Elements ────────────────────────────────────────────────

    /// `get(buf, index, type?)`: the element at host index `index`, or `Nil`
    /// when out of range.
    pub fn get(&self, buf: &BufferRef, index: i64, ty: &Value) -> Result<Value, ScriptError> {
        let buf = buf.borrow();
        let ty = resolve_type(&self.caps, "get", 3, ty, Some(&*buf))?;
        let value = self
            .config
            .index_base
            .slot(index)
            .and_then(|slot| buf.read(slot, ty));
        Ok(value.map_or(Value::Nil, |scalar| to_host(self.config.numerics, scalar)))
    }

    /// `set(buf, index, value, type?)`: store `value` at host index `index`.
    ///
    /// Out-of-range indices are ignored before `value` is inspected. Integer
    /// types need an integer value and wrap it to the element width; float
    /// types accept any number.
    pub fn set(
        &self,
        buf: &BufferRef,
        index: i64,
        value: &Value,
        ty: &Value,
    ) -> Result<(), ScriptError> {
        let mut buf = buf.borrow_mut();
        let ty = resolve_type(&self.caps, "set", 4, ty, Some(&*buf))?;
        let Some(slot) = self.config.index_base.slot(index) else {
            return Ok(());
        };
        if slot >= buf.len_as(ty) {
            return Ok(());
        }
        let scalar = if ty.kind.is_float() {
            Scalar::Float(check_number("set", 3, value)?)
        } else {
            Scalar::Signed(check_integer("set", 3, value)?)
        };
        buf.write(slot, ty, scalar);
        Ok(())
    }

    // ── Iteration ───────────────────────────────────────────────

    /// `iter(obj, index)`: one step of integer-keyed iteration over any
    /// indexable value.
    ///
    /// Returns `(index + 1, obj[index + 1])`, or a lone `Nil` once that
    /// element is `Nil`.
    pub fn iter(&self, obj: &Value, index: i64) -> Result<Values, ScriptError> {
        let Some(next) = index.checked_add(1) else {
            return Ok(smallvec![Value::Nil]);
        };
        let value = match obj {
            Value::Buffer(buf) => self.index(buf, &Value::Integer(next))?,
            Value::Table(table) => table.get(&Key::Int(next)),
            other => {
                return Err(ScriptError::wrong_type(
                    "iter",
                    1,
                    "indexable value",
                    other.type_name(),
                ))
            }
        };
        if value.is_nil() {
            Ok(smallvec![Value::Nil])
        } else {
            Ok(smallvec![Value::Integer(next), value])
        }
    }

    /// The current type of `buf`, decoded.
    pub fn current_type(&self, buf: &BufferRef) -> ElemType {
        current_type(&buf.borrow())
    }
}

impl Default for Library {
    /// A library for a 64-bit, one-based host.
    fn default() -> Self {
        let caps = Capabilities::default();
        Self {
            config: AdapterConfig::default(),
            types: types_table(&caps),
            caps,
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn types_table(caps: &Capabilities) -> Table {
    let types = Table::new();
    for (name, code) in caps.type_names() {
        types.set(Key::from(name), Value::Integer(i64::from(code)));
    }
    types
}

fn resize(buf: &BufferRef, size: Option<usize>) -> Result<(), ScriptError> {
    let size = size.ok_or_else(|| ScriptError::resize(EngineError::CapacityOverflow))?;
    buf.borrow_mut().resize(size).map_err(ScriptError::resize)
}

/// Convert an element to a host value. Integers wrap to the host integer
/// width; floats round to the host float width.
fn to_host(numerics: HostNumerics, scalar: Scalar) -> Value {
    match scalar {
        Scalar::Float(v) if numerics.float_bits < 64 => Value::Number(f64::from(v as f32)),
        Scalar::Float(v) => Value::Number(v),
        integer => {
            let shift = 64 - numerics.integer_bits.min(64);
            Value::Integer((integer.to_i64_wrapping() << shift) >> shift)
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────

fn lib_new(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("new", args);
    let buf = lib.create(args.integer(1)?)?;
    Ok(smallvec![Value::Buffer(buf)])
}

fn lib_calloc(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("calloc", args);
    let buf = lib.calloc(args.integer(1)?, args.get(2))?;
    Ok(smallvec![Value::Buffer(buf)])
}

fn lib_getsize(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let buf = Args::new("getsize", args).buffer(1)?;
    Ok(smallvec![Value::Integer(lib.get_size(&buf))])
}

fn lib_setsize(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("setsize", args);
    let buf = args.buffer(1)?;
    lib.set_size(&buf, args.integer(2)?)?;
    Ok(Values::new())
}

fn lib_getlength(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("getlength", args);
    let buf = args.buffer(1)?;
    Ok(smallvec![Value::Integer(lib.get_length(&buf, args.get(2))?)])
}

fn lib_setlength(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("setlength", args);
    let buf = args.buffer(1)?;
    lib.set_length(&buf, args.integer(2)?, args.get(3))?;
    Ok(Values::new())
}

fn lib_gettype(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let buf = Args::new("gettype", args).buffer(1)?;
    Ok(smallvec![Value::Integer(lib.get_type(&buf))])
}

fn lib_settype(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("settype", args);
    let buf = args.buffer(1)?;
    lib.set_type(&buf, args.get(2))?;
    Ok(Values::new())
}

fn lib_get(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("get", args);
    let buf = args.buffer(1)?;
    let value = lib.get(&buf, args.integer(2)?, args.get(3))?;
    Ok(smallvec![value])
}

fn lib_set(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("set", args);
    let buf = args.buffer(1)?;
    lib.set(&buf, args.integer(2)?, args.get(3), args.get(4))?;
    Ok(Values::new())
}

fn lib_iter(lib: &Library, args: &[Value]) -> Result<Values, ScriptError> {
    let args = Args::new("iter", args);
    lib.iter(args.get(1), args.integer(2)?)
}
