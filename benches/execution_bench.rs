use criterion::{Criterion, criterion_group, criterion_main};
use func_runner::{OutputValidator, TestCase, run};
use std::hint::black_box;

fn cat_cases(count: usize, payload_len: usize) -> Vec<TestCase> {
    let payload = vec![b'x'; payload_len];
    (0..count)
        .map(|i| {
            TestCase::builder(format!("cat-{i}"))
                .stdin(payload.clone())
                .expect_stdout(OutputValidator::exact(payload[..payload_len.min(4096)].to_vec()))
                .build()
                .unwrap()
        })
        .collect()
}

fn bench_run_suite(c: &mut Criterion) {
    let small = cat_cases(16, 64);
    let large = cat_cases(16, 256 * 1024);

    c.bench_function("run_16_cat_small_stdin", |b| {
        b.iter(|| run(black_box("/bin/cat"), black_box(&small)).unwrap());
    });
    c.bench_function("run_16_cat_256k_stdin", |b| {
        b.iter(|| run(black_box("/bin/cat"), black_box(&large)).unwrap());
    });
}

criterion_group!(benches, bench_run_suite);
criterion_main!(benches);
