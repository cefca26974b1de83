//! Benchmarks for this crate's [`SkipList`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::{Rng, SeedableRng, rngs::StdRng};
use skipgrid::SkipList;

/// Benchmarking sizes.
const SIZES: [usize; 5] = [1, 10, 100, 1000, 10_000];

/// Build a list of `size` distinct random elements.
fn filled(rng: &mut StdRng, size: usize) -> SkipList<u64> {
    let mut list = SkipList::new(u64::MIN, u64::MAX).expect("bounds are ordered");
    while list.len() < size {
        let _ = list.insert(rng.random_range(1..u64::MAX));
    }
    list
}

/// Benchmarking insertion of random elements.
#[inline]
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut list = filled(&mut rng, size);

            b.iter(|| {
                let _ = list.insert(rng.random_range(1..u64::MAX));
            });
        });
    }
}

/// Benchmarking predecessor search of random probes.
#[inline]
pub fn search(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Search");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let list = filled(&mut rng, size);

            b.iter(|| {
                black_box(list.search(&rng.random_range(1..u64::MAX)).value());
            });
        });
    }
}

/// Run all benchmarks in this module.
pub fn benchmark(c: &mut Criterion) {
    insert(c);
    search(c);
}
