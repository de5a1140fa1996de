use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

// Import the buffer manager and in-memory store from the crate
use bufmgr::buffer::BufMgr;
use bufmgr::store::{FileRef, MemStore, PageStore};
use bufmgr::types::PageNo;

// Test configuration
const NUM_FRAMES: usize = 64;
const OPERATIONS: usize = 10_000;

fn setup(num_pages: usize) -> (FileRef, Vec<PageNo>) {
    let store = Arc::new(MemStore::new());
    let pages = (0..num_pages)
        .map(|_| store.allocate_page().unwrap())
        .collect();
    let file: FileRef = store;
    (file, pages)
}

fn run_workload(mgr: &mut BufMgr, file: &FileRef, pages: &[PageNo], rng: &mut StdRng) {
    for _ in 0..OPERATIONS {
        let page_no = pages[rng.gen_range(0..pages.len())];
        let dirty = rng.gen_bool(0.2);
        let page = mgr.read_page(file, page_no).unwrap();
        if dirty {
            page.write_bytes(0, &page_no.to_le_bytes());
        }
        mgr.unpin_page(file, page_no, dirty).unwrap();
    }
}

// Benchmark a working set that fits in the pool: hits only after warm-up
pub fn bench_resident_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("ClockReplacement");

    group.bench_function("ResidentHits", |b| {
        let (file, pages) = setup(NUM_FRAMES / 2);
        let mut mgr = BufMgr::new(NUM_FRAMES);
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| run_workload(&mut mgr, &file, &pages, &mut rng));
    });

    group.finish();
}

// Benchmark a working set four times the pool size: constant eviction
pub fn bench_eviction_pressure(c: &mut Criterion) {
    let mut group = c.benchmark_group("ClockReplacement");

    group.bench_function("EvictionPressure", |b| {
        let (file, pages) = setup(NUM_FRAMES * 4);
        let mut mgr = BufMgr::new(NUM_FRAMES);
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| run_workload(&mut mgr, &file, &pages, &mut rng));
    });

    group.finish();
}

// Benchmark allocating fresh pages and flushing the file
pub fn bench_alloc_and_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("AllocFlush");

    group.bench_function("AllocThenFlushFile", |b| {
        b.iter_batched(
            || {
                let file: FileRef = Arc::new(MemStore::new());
                (BufMgr::new(NUM_FRAMES), file)
            },
            |(mut mgr, file)| {
                for _ in 0..NUM_FRAMES {
                    let (page_no, _) = mgr.alloc_page(&file).unwrap();
                    mgr.unpin_page(&file, page_no, true).unwrap();
                }
                mgr.flush_file(&file).unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resident_hits,
    bench_eviction_pressure,
    bench_alloc_and_flush
);
criterion_main!(benches);
