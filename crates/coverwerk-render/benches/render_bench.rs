// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the Coverwerk compositor. Renders a synthetic
// gradient-only snapshot at screen resolution -- the hot path shared by
// every export, without the I/O-bound asset decoding.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use coverwerk_assets::ResolvedAssets;
use coverwerk_core::{DesignState, RenderConfig, RenderOptions};
use coverwerk_render::Compositor;

/// Benchmark a full artwork-only render of the default 6x9 trade paperback
/// at 72 dpi (a ~954x666 canvas, three gradient fills plus orchestration).
fn bench_artwork_only_render(c: &mut Criterion) {
    let state = DesignState::default();
    let assets = ResolvedAssets::empty();
    let compositor = Compositor::new(RenderConfig {
        dpi: 72.0,
        ..RenderConfig::default()
    });

    c.bench_function("artwork_only_render (6x9 @ 72dpi)", |b| {
        b.iter(|| {
            let canvas = compositor
                .render(black_box(&state), &assets, RenderOptions::ARTWORK_ONLY)
                .expect("gradient-only render cannot fail");
            black_box(canvas);
        });
    });
}

criterion_group!(benches, bench_artwork_only_render);
criterion_main!(benches);
