use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use mutbson_core::{Document, Modifier, ModifierPull, ModifierPush, Value};

const COUNTS: &[u64] = &[10, 100, 1_000];

fn filled(count: u64) -> Document {
    let items = Value::array((0..count as i64).map(Value::Int64));
    Document::from_value(&Value::doc([("items", items)])).unwrap()
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for &count in COUNTS {
        group.bench_with_input(BenchmarkId::new("single", count), &count, |b, &count| {
            b.iter_batched(
                Document::new,
                |mut doc| {
                    let root = doc.root();
                    for i in 0..count {
                        let value = Value::Int64(i as i64);
                        let mut push = ModifierPush::init("items", &value).unwrap();
                        push.prepare(&doc, root, "").unwrap();
                        push.apply(&mut doc).unwrap();
                    }
                    doc
                },
                BatchSize::SmallInput,
            );
        });

        let each = (0..count as i64).map(|i| Value::doc([("k", (i * 7919) % 1_000)]));
        let each = Value::array(each);
        let arg = Value::doc([
            ("$each", each),
            ("$slice", Value::from(-((count / 2) as i32))),
            ("$sort", Value::doc([("k", 1)])),
        ]);
        group.bench_with_input(BenchmarkId::new("each-sort-slice", count), &arg, |b, arg| {
            b.iter_batched(
                Document::new,
                |mut doc| {
                    let root = doc.root();
                    let mut push = ModifierPush::init("items", arg).unwrap();
                    push.prepare(&doc, root, "").unwrap();
                    push.apply(&mut doc).unwrap();
                    doc
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_pull(c: &mut Criterion) {
    let mut group = c.benchmark_group("pull");
    for &count in COUNTS {
        group.bench_with_input(BenchmarkId::new("evens", count), &count, |b, &count| {
            b.iter_batched(
                || filled(count),
                |mut doc| {
                    let root = doc.root();
                    let is_even = |v: &Value| matches!(v, Value::Int64(n) if n % 2 == 0);
                    let mut pull = ModifierPull::init("items", is_even).unwrap();
                    if !pull.prepare(&doc, root, "").unwrap().no_op {
                        pull.apply(&mut doc).unwrap();
                    }
                    doc
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    for &count in COUNTS {
        let doc = filled(count);
        group.bench_with_input(BenchmarkId::new("to_object", count), &doc, |b, doc| {
            b.iter(|| black_box(doc.to_object().unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_push, bench_pull, bench_export);
criterion_main!(benches);
