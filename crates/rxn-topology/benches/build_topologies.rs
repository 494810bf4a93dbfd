use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rxn_topology::{canonical_hash, create_isobar_topologies};

fn isobar_bench(c: &mut Criterion) {
    c.bench_function("isobar_1_to_5", |b| {
        b.iter(|| {
            let topologies = create_isobar_topologies(1, 5).unwrap();
            black_box(topologies);
        });
    });
    let topologies = create_isobar_topologies(1, 6).unwrap();
    c.bench_function("canonical_hash_1_to_6", |b| {
        b.iter(|| {
            for topology in &topologies {
                black_box(canonical_hash(topology));
            }
        });
    });
}

criterion_group!(benches, isobar_bench);
criterion_main!(benches);
