//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use treealign::codec::{read_record, render_record};
use treealign::{AlignerConfig, NodeArena, TreeAligner};

/// Record text for a pair over `leaves` words: the left side brackets words
/// in twos, the right side in threes, and word `i` links to word `i`.
fn synthetic_record(leaves: usize) -> String {
    fn side(letter: char, base: usize, leaves: usize, width: usize, out: &mut Vec<String>) -> usize {
        let groups: Vec<Vec<usize>> = (0..leaves)
            .collect::<Vec<_>>()
            .chunks(width)
            .map(|c| c.iter().map(|i| base + i).collect())
            .collect();
        let first_group = base + leaves;
        let root = first_group + groups.len();
        for (g, children) in groups.iter().enumerate() {
            let ids: Vec<String> = children.iter().map(usize::to_string).collect();
            out.push(format!("{}{} [{}]", letter, first_group + g, ids.join(" ")));
        }
        let tops: Vec<String> = (first_group..root).map(|g| g.to_string()).collect();
        out.push(format!("{}{} [{}]", letter, root, tops.join(" ")));
        root + 1
    }

    let mut nodes = Vec::new();
    let right_base = side('L', 0, leaves, 2, &mut nodes);
    let total = side('R', right_base, leaves, 3, &mut nodes);
    for i in 0..leaves {
        nodes.push(format!("L{} ({})", i, right_base + i));
        nodes.push(format!("R{}", right_base + i));
    }
    format!("{}\n{}\n", total, nodes.join(" "))
}

fn benchmark_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    for leaves in [12, 48, 192] {
        let pair: NodeArena = read_record(&synthetic_record(leaves)).unwrap();
        for (name, config) in [
            ("exact_only", AlignerConfig::exact_only()),
            ("full", AlignerConfig::default()),
        ] {
            let aligner = TreeAligner::new(config).unwrap();
            group.bench_with_input(BenchmarkId::new(name, leaves), &pair, |b, pair| {
                b.iter(|| {
                    let mut arena = pair.clone();
                    black_box(aligner.align(&mut arena).unwrap());
                    arena
                });
            });
        }
    }
    group.finish();
}

fn benchmark_codec(c: &mut Criterion) {
    let text = synthetic_record(192);
    c.bench_function("decode_192", |b| b.iter(|| read_record(black_box(&text)).unwrap()));

    let mut arena = read_record(&text).unwrap();
    TreeAligner::new(AlignerConfig::default())
        .unwrap()
        .align(&mut arena)
        .unwrap();
    c.bench_function("render_192", |b| b.iter(|| render_record(black_box(&arena))));
}

criterion_group!(benches, benchmark_alignment, benchmark_codec);
criterion_main!(benches);
