#[macro_use]
extern crate criterion;

use criterion::Criterion;
use mandelreveal::palette::Palette;
use mandelreveal::render::render_chunk;
use mandelreveal::reveal::RevealOrder;
use mandelreveal::{Geometry, RunParameters, Session, View};
use std::sync::Arc;

fn one_chunk(c: &mut Criterion) {
    let geometry = Geometry::new(256, 128).unwrap();
    let view = View::default();
    let reveal = RevealOrder::build(geometry.len());
    let palette = Arc::new(Palette::build());
    let params = RunParameters::new(8, 500, num_cpus::get(), 8).unwrap();
    c.bench_function("render 8k pixels", move |b| {
        b.iter(|| render_chunk(0, 8 * 1024, geometry, view, &params, &reveal, &palette).unwrap())
    });
}

fn whole_frame(c: &mut Criterion) {
    c.bench_function("reveal a 128x64 frame", |b| {
        b.iter(|| {
            let mut session = Session::new(
                Geometry::new(128, 64).unwrap(),
                View::new(-0.5, 0.0, 1.5).unwrap(),
                RunParameters::new(2, 200, 4, 8).unwrap(),
            );
            session.run_frame(|_, _| Ok(())).unwrap()
        })
    });
}

fn build_reveal_order(c: &mut Criterion) {
    c.bench_function("shuffle 1024x512", |b| b.iter(|| RevealOrder::build(1024 * 512)));
}

criterion_group!(benches, one_chunk, whole_frame, build_reveal_order);
criterion_main!(benches);
