//! Parse throughput over a synthetic translation unit of varying size,
//! exercising comment stripping, component factory dispatch, and
//! construct-graph construction together (spec §2's "leaves first" data
//! flow, end to end).

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use zen_core::{Chunk, SourceContent, SourceForm};
use zen_graph::ConstructGraph;
use zen_parse::parse_file;

fn synthetic_source(classes: usize) -> String {
    let mut src = String::new();
    src.push_str("#include <vector>\n#include <string>\n\n");
    for i in 0..classes {
        src.push_str(&format!(
            "// ZEN(generated)\nclass Widget{i} {{\npublic:\n  int value() const {{ return helper_{i}() + 1; }}\n  int helper_{i}() const {{ return {i}; }}\nprivate:\n  int field_{i} = {i};\n}};\n\nint make_widget_{i}() {{ Widget{i} w; return w.value(); }}\n\n",
            i = i
        ));
    }
    src
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_file");
    for &classes in &[10usize, 100, 500] {
        let src = synthetic_source(classes);
        group.bench_with_input(BenchmarkId::from_parameter(classes), &src, |b, src| {
            b.iter(|| {
                let content = SourceContent::new(src);
                let whole = Chunk::whole(content, SourceForm::Stripped);
                let block = parse_file(whole).expect("synthetic source parses cleanly");
                black_box(block.children.len())
            });
        });
    }
    group.finish();
}

fn bench_construct_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct_graph");
    for &classes in &[10usize, 100, 500] {
        let src = synthetic_source(classes);
        let content = SourceContent::new(&src);
        let whole = Chunk::whole(content, SourceForm::Stripped);
        let block = parse_file(whole).expect("synthetic source parses cleanly");
        group.bench_with_input(BenchmarkId::from_parameter(classes), &block, |b, block| {
            b.iter(|| {
                let graph = ConstructGraph::from_components(block.children.iter());
                black_box(graph.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_construct_graph);
criterion_main!(benches);
