use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sieve_core::Codec;

fn bench_codecs(c: &mut Criterion) {
    let postings: Vec<u32> = (1..=20_000u32).map(|i| i * 12 + (i % 11)).collect();
    for codec in Codec::ALL {
        let mut encoded = Vec::new();
        codec.encode(&postings, &mut encoded).unwrap();

        c.bench_function(&format!("encode_{}", codec.name()), |b| {
            b.iter(|| {
                let mut out = Vec::with_capacity(encoded.len());
                codec.encode(black_box(&postings), &mut out).unwrap();
                out
            })
        });
        c.bench_function(&format!("decode_{}", codec.name()), |b| {
            b.iter(|| {
                let mut pos = 0;
                codec.decode(black_box(&encoded), &mut pos).unwrap()
            })
        });
    }
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
