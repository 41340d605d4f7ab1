//! Region expansion benchmarks.
//!
//! Measures uncached expansion cost as the target resolution grows, and the
//! cost of a cache hit.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geoimpact_core::Resolution;
use geoimpact_grid::{expand_compact, CellIndex, GeoRegion, GridConfig, InMemoryRegionStore, RegionCellResolver};
use std::sync::Arc;

/// A compact region of a few coarse cells plus a scattering of fine ones.
fn compact_region() -> Vec<CellIndex> {
    let mut cells = Vec::new();
    for base in [20u8, 21, 22] {
        for d in 0..7u8 {
            if let Ok(c) = CellIndex::from_parts(base, &[d, 3]) {
                cells.push(c);
            }
        }
    }
    for d in 0..7u8 {
        if let Ok(c) = CellIndex::from_parts(30, &[1, 2, 3, d]) {
            cells.push(c);
        }
    }
    cells
}

fn bench_expand(c: &mut Criterion) {
    let cells = compact_region();
    let mut group = c.benchmark_group("expand_compact");
    for res in [4i64, 5, 6, 7] {
        let resolution = Resolution::new(res).unwrap();
        let size = expand_compact(&cells, resolution).unwrap().len();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(res), &resolution, |b, r| {
            b.iter(|| expand_compact(black_box(&cells), *r).unwrap())
        });
    }
    group.finish();
}

fn bench_cached(c: &mut Criterion) {
    let store = InMemoryRegionStore::from_regions([GeoRegion::new("bench", compact_region())]).unwrap();
    let resolver = RegionCellResolver::new(Arc::new(store), GridConfig::default());
    let region = "bench".into();
    resolver.expand(&region, 7).unwrap();

    c.bench_function("expand_cached_hit", |b| {
        b.iter(|| resolver.expand(black_box(&region), 7).unwrap())
    });
}

criterion_group!(benches, bench_expand, bench_cached);
criterion_main!(benches);
