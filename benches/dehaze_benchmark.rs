use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array2, Array3};

use morph_dehaze::filters::morphology::{erode, StructuringElement};
use morph_dehaze::{dehaze_image, DehazeParams, RawImage};

fn synthetic_map(height: usize, width: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(y, x)| ((x * 31 + y * 17) % 256) as f32 / 255.0)
}

fn synthetic_image(height: usize, width: usize) -> RawImage {
    let pixels = Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        (120 + (x * 7 + y * 3 + c * 11) % 120) as u8
    });
    RawImage::from_array(pixels).expect("synthetic image is valid")
}

fn bench_erode(c: &mut Criterion) {
    let map = synthetic_map(480, 640);
    let mut group = c.benchmark_group("erode_640x480");
    for size in [3usize, 15, 51] {
        let se = StructuringElement::square(size).expect("odd size");
        group.bench_with_input(BenchmarkId::from_parameter(size), &se, |b, &se| {
            b.iter(|| erode(black_box(map.view()), se))
        });
    }
    group.finish();
}

fn bench_dehaze(c: &mut Criterion) {
    let raw = synthetic_image(480, 640);
    let params = DehazeParams::default();
    c.bench_function("dehaze_image_640x480", |b| {
        b.iter(|| dehaze_image(black_box(&raw), &params).expect("dehaze succeeds"))
    });
}

criterion_group!(benches, bench_erode, bench_dehaze);
criterion_main!(benches);
