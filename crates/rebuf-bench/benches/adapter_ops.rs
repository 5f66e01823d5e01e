//! Criterion micro-benchmarks for the scripting adapter.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rebuf_bench::{ramp_script_buffer, ELEMENT_COUNT};
use rebuf_script::{Library, Value};

/// Benchmark: Element reads through `Library::index`, as a host would issue
/// them for `buf[i]`.
fn bench_index_reads(c: &mut Criterion) {
    let lib = Library::default();
    let buf = ramp_script_buffer(&lib, ELEMENT_COUNT);
    c.bench_function("index_read_16k", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for i in 1..=ELEMENT_COUNT as i64 {
                if let Value::Integer(v) = lib.index(&buf, &Value::Integer(i)).unwrap() {
                    acc = acc.wrapping_add(v);
                }
            }
            black_box(acc);
        });
    });
}

/// Benchmark: Named-type writes through the library table dispatch.
fn bench_call_set(c: &mut Criterion) {
    let lib = Library::default();
    let buf = Value::Buffer(ramp_script_buffer(&lib, ELEMENT_COUNT));
    let ty = Value::from("signed int");
    c.bench_function("call_set_named_type_16k", |b| {
        b.iter(|| {
            for i in 1..=ELEMENT_COUNT as i64 {
                lib.call("set", &[buf.clone(), Value::Integer(i), Value::Integer(-i), ty.clone()])
                    .unwrap();
            }
        });
    });
}

/// Benchmark: A full `ipairs` traversal.
fn bench_ipairs(c: &mut Criterion) {
    let lib = Library::default();
    let obj = Value::Buffer(ramp_script_buffer(&lib, ELEMENT_COUNT));
    c.bench_function("ipairs_16k", |b| {
        b.iter(|| {
            let triple = lib.ipairs(&obj);
            let mut control = triple[2].clone();
            let mut count = 0usize;
            loop {
                let step = lib.invoke(&triple[0], &[obj.clone(), control]).unwrap();
                if step[0].is_nil() {
                    break;
                }
                control = step[0].clone();
                count += 1;
            }
            black_box(count);
        });
    });
}

criterion_group!(benches, bench_index_reads, bench_call_set, bench_ipairs);
criterion_main!(benches);
