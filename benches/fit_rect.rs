// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, Criterion};
use iced::Size;
use iced_preview::ui::preview::fit_rect;
use std::hint::black_box;

fn fit_rect_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_rect");
    let viewport = Size::new(390.0, 844.0);

    group.bench_function("landscape", |b| {
        b.iter(|| fit_rect(black_box(Size::new(4032.0, 3024.0)), black_box(viewport)));
    });

    group.bench_function("long_image", |b| {
        b.iter(|| fit_rect(black_box(Size::new(1080.0, 12000.0)), black_box(viewport)));
    });

    group.bench_function("degenerate", |b| {
        b.iter(|| fit_rect(black_box(Size::new(0.0, 100.0)), black_box(viewport)));
    });

    group.finish();
}

criterion_group!(benches, fit_rect_benchmark);
criterion_main!(benches);
