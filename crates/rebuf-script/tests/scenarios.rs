//! End-to-end scenarios driven through the library table, the way a host
//! would call it.

use proptest::prelude::*;
use rebuf_script::{AdapterConfig, Library, ScriptError, Value};

fn int(v: i64) -> Value {
    Value::Integer(v)
}

fn call1(lib: &Library, name: &str, args: &[Value]) -> Value {
    lib.call(name, args).unwrap().into_iter().next().unwrap_or_default()
}

#[test]
fn ints_reinterpreted_as_floats() {
    let lib = Library::default();
    let buf = call1(&lib, "calloc", &[int(25), int(4)]);
    assert_eq!(call1(&lib, "getsize", &[buf.clone()]), int(100));

    for i in 0..25i64 {
        let bits = (i as u32).wrapping_mul(0x1000_0000);
        lib.call(
            "set",
            &[buf.clone(), int(i + 1), int(i64::from(bits as i32)), Value::from("signed int")],
        )
        .unwrap();
    }
    for i in 0..25i64 {
        let bits = (i as u32).wrapping_mul(0x1000_0000);
        let got = call1(&lib, "get", &[buf.clone(), int(i + 1), Value::from("float")]);
        let Value::Number(got) = got else {
            panic!("expected a number at {i}, got {got:?}");
        };
        assert_eq!((got as f32).to_bits(), bits, "index {i}");
    }
    assert_eq!(
        call1(&lib, "get", &[buf, int(1), Value::from("float")]),
        Value::Number(0.0)
    );
}

#[test]
fn shorts_reinterpreted_as_chars() {
    let lib = Library::default();
    let buf = call1(&lib, "calloc", &[int(16), Value::from("short")]);
    let handle = buf.as_buffer().unwrap().clone();
    assert_eq!(lib.index(&handle, &Value::from("size")).unwrap(), int(32));
    assert_eq!(lib.len(&handle).unwrap(), 16);

    for i in 0..16 {
        lib.new_index(&handle, &int(i + 1), &int(1 << i)).unwrap();
    }
    assert_eq!(lib.index(&handle, &int(16)).unwrap(), int(1 << 15));

    lib.new_index(&handle, &Value::from("type"), &Value::from("char"))
        .unwrap();
    assert_eq!(lib.len(&handle).unwrap(), 32);

    for i in 0..16 {
        let bytes = ((1i64 << i) as i16).to_ne_bytes();
        assert_eq!(
            lib.index(&handle, &int(2 * i + 1)).unwrap(),
            int(i64::from(bytes[0]))
        );
        assert_eq!(
            lib.index(&handle, &int(2 * i + 2)).unwrap(),
            int(i64::from(bytes[1]))
        );
    }
}

#[test]
fn signed_short_wraps_at_bit_fifteen() {
    let lib = Library::default();
    let buf = lib.calloc(16, &Value::from("signed short")).unwrap();
    lib.set(&buf, 16, &int(1 << 15), &Value::Nil).unwrap();
    assert_eq!(lib.get(&buf, 16, &Value::Nil).unwrap(), int(-32768));
}

#[test]
fn non_positive_sizes_are_argument_errors() {
    let lib = Library::default();
    for size in [0, -1] {
        let err = lib.call("new", &[int(size)]).unwrap_err();
        assert!(matches!(err, ScriptError::Arg { function: "new", arg: 1, .. }));
    }
}

#[test]
fn settype_then_gettype() {
    let lib = Library::default();
    let buf = call1(&lib, "new", &[int(8)]);
    lib.call("settype", &[buf.clone(), Value::from("signed int")])
        .unwrap();
    let int_code = lib.types().get(&"int".into());
    assert_eq!(
        call1(&lib, "gettype", &[buf]),
        int(int_code.as_integer().unwrap() | 0x10)
    );
}

#[test]
fn setlength_keeps_type_tag() {
    let lib = Library::default();
    let buf = call1(&lib, "calloc", &[int(4), Value::from("int")]);
    let before = call1(&lib, "gettype", &[buf.clone()]);
    lib.call("setlength", &[buf.clone(), int(3), Value::from("double")])
        .unwrap();
    assert_eq!(call1(&lib, "getsize", &[buf.clone()]), int(24));
    assert_eq!(call1(&lib, "gettype", &[buf]), before);
}

#[test]
fn dropping_last_handle_releases_buffer() {
    let lib = Library::default();
    let buf = lib.create(64).unwrap();
    assert_eq!(buf.handle_count(), 1);
    let alias = Value::Buffer(buf.clone());
    assert_eq!(buf.handle_count(), 2);
    drop(alias);
    assert_eq!(buf.handle_count(), 1);
    assert!(buf.try_unwrap().is_ok());
}

#[test]
fn python_host_is_zero_based() {
    let lib = Library::new(AdapterConfig::python()).unwrap();
    let buf = lib.calloc(2, &Value::from("int16")).unwrap();
    lib.new_index(&buf, &int(0), &int(7)).unwrap();
    lib.new_index(&buf, &int(1), &int(8)).unwrap();
    lib.new_index(&buf, &int(2), &int(9)).unwrap();
    let values: Vec<Value> = (0..3).map(|i| lib.index(&buf, &int(i)).unwrap()).collect();
    assert_eq!(values, vec![int(7), int(8), Value::Nil]);
}

proptest! {
    #[test]
    fn boundary_access(length in 1i64..64, code in prop::sample::select(vec![0x0i64, 0x11, 0x2, 0x5, 0x6, 0x18, 0xa])) {
        let lib = Library::default();
        let buf = lib.create(length * 8).unwrap();
        lib.set_type(&buf, &int(code)).unwrap();
        let len = lib.len(&buf).unwrap();
        let before: Vec<u8> = buf.borrow().as_bytes().to_vec();
        prop_assert_eq!(lib.get(&buf, len + 1, &Value::Nil).unwrap(), Value::Nil);
        lib.set(&buf, len + 1, &int(1), &Value::Nil).unwrap();
        {
            let bytes = buf.borrow();
            prop_assert_eq!(bytes.as_bytes(), &before[..]);
        }
        prop_assert!(!lib.get(&buf, len, &Value::Nil).unwrap().is_nil());
    }

    #[test]
    fn length_times_width_is_size(length in 1i64..256, name in prop::sample::select(vec!["char", "short", "int", "long", "long long", "float", "double", "8", "16", "32", "64"])) {
        let lib = Library::default();
        let buf = lib.calloc(length, &Value::from(name)).unwrap();
        let width = lib.current_type(&buf).width() as i64;
        prop_assert_eq!(lib.get_size(&buf), length * width);
        prop_assert_eq!(lib.len(&buf).unwrap(), length);
    }
}
