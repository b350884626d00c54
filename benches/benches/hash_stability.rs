//! Hash throughput and whitespace/comment stability for `SourceContent`'s
//! `stripped_hash` and `Chunk`'s `content_hash` (spec §4.A, §4.E).

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use zen_core::{Chunk, SourceContent, SourceForm};

fn dense_source(lines: usize) -> String {
    (0..lines).map(|i| format!("int field_{i} = {i}; // inline comment {i}\n")).collect()
}

fn sparse_source(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("int    field_{i}   =   {i}  ;   \n\n/* block comment {i} */\n\n"))
        .collect()
}

fn bench_stripped_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("stripped_hash");
    for &lines in &[100usize, 1_000, 10_000] {
        let dense = dense_source(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &dense, |b, src| {
            b.iter(|| {
                let content = SourceContent::new(src);
                black_box(content.stripped_hash())
            });
        });
    }
    group.finish();
}

/// Two renderings of the "same" construct — one dense, one padded with
/// whitespace and comments — must hash identically (spec §4.E invariant),
/// exercised here as a correctness check riding along the throughput bench.
fn bench_whitespace_invariance(c: &mut Criterion) {
    let lines = 2_000;
    let dense = dense_source(lines);
    let sparse = sparse_source(lines);

    let dense_hash = SourceContent::new(&dense).stripped_hash();
    let sparse_content = SourceContent::new(&sparse);
    assert_eq!(dense_hash, sparse_content.stripped_hash(), "comment/whitespace padding must not change stripped_hash");

    c.bench_function("stripped_hash_sparse_equivalent", |b| {
        b.iter(|| {
            let content = SourceContent::new(&sparse);
            black_box(content.stripped_hash())
        });
    });
}

fn bench_chunk_content_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_content_hash");
    for &lines in &[100usize, 1_000, 10_000] {
        let src = dense_source(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &src, |b, src| {
            b.iter(|| {
                let content = SourceContent::new(src);
                let whole = Chunk::whole(content, SourceForm::Stripped);
                black_box(whole.content_hash())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stripped_hash, bench_whitespace_invariance, bench_chunk_content_hash);
criterion_main!(benches);
