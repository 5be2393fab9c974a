//! Benchmarks for the Atelier upload pipeline.
//!
//! Run with: cargo bench -p atelier-core

use atelier_core::config::VariantsConfig;
use atelier_core::pipeline::decode::decode_bytes;
use atelier_core::pipeline::resize::{crop_fit_plan, fit_dimensions};
use atelier_core::pipeline::VariantRenderer;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("fixture encodes");
    out.into_inner()
}

fn benchmark_dimension_math(c: &mut Criterion) {
    c.bench_function("fit_dimensions", |b| {
        b.iter(|| fit_dimensions(black_box((4032, 3024)), black_box((800, 800))))
    });
    c.bench_function("crop_fit_plan", |b| {
        b.iter(|| crop_fit_plan(black_box((4032, 3024)), black_box((400, 400))))
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let bytes = encoded_jpeg(2000, 1500);

    c.bench_function("decode_jpeg_2000x1500", |b| {
        b.iter(|| {
            let _ = decode_bytes(black_box(&bytes), "image/jpeg", "bench.jpg");
        })
    });
}

fn benchmark_render_all(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(2000, 1500);
    let renderer = VariantRenderer::new(VariantsConfig::default());

    let mut group = c.benchmark_group("variants");
    group.sample_size(10);
    group.bench_function("render_all_2000x1500", |b| {
        b.iter(|| {
            let _ = renderer.render_all(black_box(&img));
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_dimension_math,
    benchmark_decode,
    benchmark_render_all,
);
criterion_main!(benches);
