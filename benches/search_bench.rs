//! Benchmarks for linear search and histogram extraction

use cbir_histogram::descriptor::compute_rgb_histogram;
use cbir_histogram::{Descriptor, DescriptorIndex, ImageCatalog, SearchEngine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, RgbImage};

fn create_random_engine(n: usize, dim: usize) -> SearchEngine {
    let names = (0..n).map(|i| format!("{}.jpg", i)).collect();
    let vectors = (0..n)
        .map(|_| Descriptor::new((0..dim).map(|_| rand::random::<f64>()).collect()))
        .collect();
    SearchEngine::new(
        ImageCatalog::new("images", names),
        DescriptorIndex::new(vectors).unwrap(),
    )
    .unwrap()
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 10000].iter() {
        let engine = create_random_engine(*size, 64);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| engine.search(black_box("0.jpg"), black_box(Some(10))));
        });
    }

    group.finish();
}

fn benchmark_rgb_histogram(c: &mut Criterion) {
    let data: Vec<u8> = (0..256 * 256 * 3).map(|_| rand::random::<u8>()).collect();
    let image = DynamicImage::ImageRgb8(RgbImage::from_raw(256, 256, data).unwrap());

    c.bench_function("rgb_histogram_8x8x8", |b| {
        b.iter(|| compute_rgb_histogram(black_box(&image), 8, 8, 8).unwrap());
    });
}

criterion_group!(benches, benchmark_search, benchmark_rgb_histogram);
criterion_main!(benches);
