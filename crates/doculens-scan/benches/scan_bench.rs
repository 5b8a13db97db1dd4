// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the doculens-scan crate: edge preprocessing,
// quadrilateral detection, and the full per-frame pipeline on a synthetic
// 640x480 frame.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use doculens_core::ScannerConfig;
use doculens_scan::{DocumentScanner, extract_best_quadrilateral, preprocess};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Dark 640x480 frame with a bright sheet from (100, 100) to (500, 400).
fn synthetic_frame() -> DynamicImage {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([30, 30, 30]));
    for y in 100..400 {
        for x in 100..500 {
            img.put_pixel(x, y, Rgb([240, 240, 240]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_preprocess(c: &mut Criterion) {
    let frame = synthetic_frame();
    let config = ScannerConfig::default();

    c.bench_function("preprocess (640x480)", |b| {
        b.iter(|| black_box(preprocess(black_box(&frame), &config)));
    });
}

fn bench_detection(c: &mut Criterion) {
    let config = ScannerConfig::default();
    let mask = preprocess(&synthetic_frame(), &config);

    c.bench_function("extract_best_quadrilateral (640x480)", |b| {
        b.iter(|| black_box(extract_best_quadrilateral(black_box(&mask), &config)));
    });
}

/// Full pipeline including overlay, rectification, and the 2x2 composite.
fn bench_process_frame(c: &mut Criterion) {
    let frame = synthetic_frame();
    let scanner = DocumentScanner::default();

    c.bench_function("process_frame (640x480)", |b| {
        b.iter(|| black_box(scanner.process_frame(black_box(&frame))));
    });
}

criterion_group!(benches, bench_preprocess, bench_detection, bench_process_frame);
criterion_main!(benches);
