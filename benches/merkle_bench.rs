//! Benchmarks for the native hash and Merkle tree operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tumbler::{commitment, hash2, poseidon_config, Fp, MerkleTree};

fn bench_hash2(c: &mut Criterion) {
    let params = poseidon_config::<Fp>();
    let a = Fp::from(12345u64);
    let b = Fp::from(67890u64);

    c.bench_function("hash2", |bench| {
        bench.iter(|| hash2(&params, black_box(a), black_box(b)))
    });
}

fn bench_commitment(c: &mut Criterion) {
    let params = poseidon_config::<Fp>();
    let nullifier = Fp::from(111u64);
    let secret = Fp::from(222u64);

    c.bench_function("commitment", |bench| {
        bench.iter(|| commitment(&params, black_box(nullifier), black_box(secret)))
    });
}

fn bench_tree_insert_and_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle");

    for n in [16u64, 64, 128] {
        group.bench_with_input(BenchmarkId::new("insert_and_root", n), &n, |bench, &n| {
            bench.iter(|| {
                let mut tree = MerkleTree::new();
                for i in 0..n {
                    tree.insert(Fp::from(i + 1));
                }
                black_box(tree.root())
            })
        });
    }

    group.finish();
}

fn bench_get_path(c: &mut Criterion) {
    let mut tree = MerkleTree::new();
    for i in 0..64u64 {
        tree.insert(Fp::from(i + 1));
    }

    c.bench_function("get_path", |bench| {
        bench.iter(|| tree.get_path(black_box(37)))
    });
}

criterion_group!(
    benches,
    bench_hash2,
    bench_commitment,
    bench_tree_insert_and_root,
    bench_get_path
);
criterion_main!(benches);
