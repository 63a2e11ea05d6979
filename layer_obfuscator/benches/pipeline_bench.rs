use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use layer_obfuscator::pipeline::Pipeline;
use std::hint::black_box;
use std::time::Duration;

fn corpus() -> Vec<(&'static str, String)> {
    vec![
        ("short", "Hello".to_string()),
        ("sentence", "Room 255 is booked for 3 nights, ref 00731".to_string()),
        ("unicode", "日本語のテキスト と émojis 🚀 ".repeat(20)),
        ("paragraph", "lorem ipsum dolor sit amet 1234 ".repeat(200)),
    ]
}

fn benchmark_pipeline(c: &mut Criterion) {
    let pipeline = Pipeline::default();

    let mut group = c.benchmark_group("pipeline");
    group.measurement_time(Duration::from_millis(1000));

    for (name, input) in corpus() {
        let encoded = pipeline.encode(&input).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", name), &input, |b, input| {
            b.iter(|| pipeline.encode(black_box(input)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, encoded| {
            b.iter(|| pipeline.decode(black_box(encoded)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
