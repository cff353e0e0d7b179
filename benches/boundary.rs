//! Boundary call benchmarks
//!
//! Measures a full encode, native call, copy-out, release and decode
//! round through the in-process exports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use protolink::{greet, NativeLibrary, Person};

fn bench_greet(c: &mut Criterion) {
    let library = NativeLibrary::in_process().shared();
    let mut group = c.benchmark_group("greet");

    for size in [4, 64, 256].iter() {
        group.bench_with_input(BenchmarkId::new("name_len", size), size, |b, &size| {
            let name = "m".repeat(size);
            b.iter(|| greet(&library, black_box(&name)));
        });
    }

    group.bench_function("rejected", |b| {
        b.iter(|| greet(&library, black_box("")));
    });

    group.finish();
}

fn bench_person(c: &mut Criterion) {
    let library = NativeLibrary::in_process().shared();
    let mut group = c.benchmark_group("person");

    group.bench_function("greet", |b| {
        let person = Person::new(&library, "Alice", 30).unwrap();
        b.iter(|| person.greet(black_box("Mike")));
    });

    group.bench_function("create_release", |b| {
        b.iter(|| {
            let person = Person::new(&library, black_box("Alice"), 30).unwrap();
            person.dispose()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_greet, bench_person);
criterion_main!(benches);
