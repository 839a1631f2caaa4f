use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use podreload_logic::distribute::distribute;
use podreload_logic::transferables::{Category, Stack, Transferable};

fn make_transferables(kinds: usize) -> Vec<Transferable> {
    (0..kinds)
        .map(|i| {
            // Deterministic spread of counts, with a clear anchor at the end.
            let count = if i == kinds - 1 { 5000 } else { (i as u32 * 37) % 400 };
            Transferable {
                kind: i as u32,
                label: format!("kind-{i}"),
                category: Category::Item,
                stacks: vec![Stack { thing: i as u64, count: count.max(1) }],
                count_to_transfer: count,
            }
        })
        .collect()
}

fn bench_distribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("distribute");
    for &kinds in &[16usize, 256, 4096] {
        for &pods in &[1usize, 8, 64] {
            group.bench_function(format!("kinds{kinds}_pods{pods}"), |b| {
                b.iter_batched(
                    || make_transferables(kinds),
                    |ts| distribute(&ts, pods),
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_distribute);
criterion_main!(benches);
