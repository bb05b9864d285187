use criterion::{criterion_group, criterion_main, Criterion};
use simsearch_core::{rank, CorpusIndex, CorpusRecord, Tokenizer};

const WORDS: &[&str] = &[
    "buffer", "overflow", "injection", "script", "token", "session", "cookie", "header", "payload",
    "credential", "privilege", "escalation", "memory", "heap", "stack", "kernel", "driver", "parser",
];

fn corpus(n: usize) -> Vec<CorpusRecord> {
    (0..n)
        .map(|i| {
            let desc: Vec<&str> = (0..12).map(|k| WORDS[(i * 7 + k * 3) % WORDS.len()]).collect();
            CorpusRecord::new(i.to_string(), format!("Pattern {i}"), desc.join(" "))
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let records = corpus(3000);
    c.bench_function("build_3000", |b| b.iter(|| CorpusIndex::build(records.clone(), Tokenizer::default())));

    let index = CorpusIndex::build(records, Tokenizer::default()).expect("non-empty corpus");
    c.bench_function("encode_and_rank_3000", |b| {
        b.iter(|| {
            let q = index.encode("heap buffer overflow in a kernel driver");
            rank(&index, &q, 0.1)
        })
    });
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
