// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tile worker pool and the compositor.
//!
//! A render pass covers one contiguous run of reveal positions.  The
//! run is split by residue class: with W workers, worker `part` takes
//! every position `k` with `k mod W == part`.  Each worker paints its
//! pixels onto a private, fully transparent canvas, so no two threads
//! ever touch the same buffer and nothing needs a lock.  When every
//! worker has reported back, the canvases are stacked into one: the
//! first replaces the (empty) composite outright, the rest are blended
//! over it.  Since the workers' pixel sets are disjoint and opaque,
//! the result is simply their union on a transparent background.

use crossbeam::thread::ScopedJoinHandle;
use image::{Rgba, RgbaImage};
use log::{debug, warn};
use std::sync::Arc;

use crate::errors::{MandelError, Result};
use crate::escape::escape_count;
use crate::palette::{ColorMapper, DensityPalette, Palette};
use crate::params::{RunParameters, MAX_WORKERS};
use crate::planes::{Geometry, PlaneMapper, PointMapper, View};
use crate::reveal::RevealOrder;

/// An RGBA buffer with independent alpha, one byte per channel.
pub type Canvas = RgbaImage;

/// A canvas of the given geometry with every pixel transparent.
pub fn blank_canvas(geometry: Geometry) -> Canvas {
    RgbaImage::new(geometry.width() as u32, geometry.height() as u32)
}

/// The positions in `[start, end)` congruent to `part` modulo
/// `workers`, in increasing order.  `workers` must be positive.
pub fn residue_class(
    start: usize,
    end: usize,
    workers: usize,
    part: usize,
) -> impl Iterator<Item = usize> {
    let first = start + (part + workers - start % workers) % workers;
    (first..end.max(first)).step_by(workers)
}

/// Stacks worker canvases into a single composite.
#[derive(Debug)]
pub struct Compositor {
    geometry: Geometry,
    composite: Option<Canvas>,
}

impl Compositor {
    /// An empty compositor for canvases of this geometry.
    pub fn new(geometry: Geometry) -> Self {
        Compositor {
            geometry,
            composite: None,
        }
    }

    /// The first layer becomes the composite as-is.  Every later layer
    /// is blended over it, pixel by pixel.
    pub fn merge(&mut self, layer: Canvas) {
        match self.composite {
            None => self.composite = Some(layer),
            Some(ref mut base) => {
                for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
                    blend_over(dst, src);
                }
            }
        }
    }

    /// The merged canvas.  A compositor that never saw a layer yields a
    /// blank canvas.
    pub fn finish(self) -> Canvas {
        let geometry = self.geometry;
        self.composite.unwrap_or_else(|| blank_canvas(geometry))
    }
}

/// Straight-alpha source-over: `src` painted on top of `dst`.
pub fn blend_over(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    match src.0[3] {
        0 => (),
        255 => *dst = *src,
        sa => {
            let sa = f32::from(sa) / 255.0;
            let da = f32::from(dst.0[3]) / 255.0 * (1.0 - sa);
            let out_a = sa + da;
            for c in 0..3 {
                let mixed = (f32::from(src.0[c]) * sa + f32::from(dst.0[c]) * da) / out_a;
                dst.0[c] = mixed.round() as u8;
            }
            dst.0[3] = (out_a * 255.0).round() as u8;
        }
    }
}

/// Everything one render pass reads.  All of it is borrowed, shared
/// between the workers, and left untouched.
pub struct TileRenderer<'a, P: PointMapper, C: ColorMapper> {
    geometry: Geometry,
    mapper: &'a P,
    colors: &'a C,
    reveal: &'a RevealOrder,
    iteration_budget: u32,
}

impl<'a, P: PointMapper, C: ColorMapper> TileRenderer<'a, P, C> {
    /// Constructor.
    pub fn new(
        geometry: Geometry,
        mapper: &'a P,
        colors: &'a C,
        reveal: &'a RevealOrder,
        iteration_budget: u32,
    ) -> Self {
        TileRenderer {
            geometry,
            mapper,
            colors,
            reveal,
            iteration_budget,
        }
    }

    /// Paint one residue class onto a fresh transparent canvas.
    fn paint_class(&self, start: usize, end: usize, workers: usize, part: usize) -> Result<Canvas> {
        let mut canvas = blank_canvas(self.geometry);
        for k in residue_class(start, end, workers, part) {
            let index = self.reveal.get(k)?;
            let pixel = self.geometry.pixel_at(index);
            if index >= self.geometry.len() {
                return Err(MandelError::OutOfBounds {
                    right: pixel.right,
                    down: pixel.down,
                    width: self.geometry.width(),
                    height: self.geometry.height(),
                });
            }
            let point = self.mapper.pixel_to_point(pixel)?;
            let count = escape_count(point, self.iteration_budget);
            canvas.put_pixel(pixel.right as u32, pixel.down as u32, self.colors.color(count));
        }
        Ok(canvas)
    }

    /// Render reveal positions `[start, end)` with `workers` threads
    /// and composite the result.  Every worker is joined before this
    /// returns.  If any worker failed, panicked, or could not be
    /// started, the first failure (in worker order) is returned and the
    /// partial composite is dropped.
    pub fn render(&self, start: usize, end: usize, workers: usize) -> Result<Canvas> {
        if workers == 0 || workers > MAX_WORKERS {
            return Err(MandelError::invalid(
                "m",
                workers.to_string(),
                format!("must be between 1 and {}", MAX_WORKERS),
            ));
        }
        if end > self.reveal.len() {
            return Err(MandelError::RevealIndex {
                index: end - 1,
                len: self.reveal.len(),
            });
        }
        debug!("rendering positions {}..{} with {} workers", start, end, workers);

        crossbeam::scope(|spawner| {
            let mut handles: Vec<ScopedJoinHandle<Result<Canvas>>> = Vec::with_capacity(workers);
            let mut unstarted: Option<MandelError> = None;
            for part in 0..workers {
                let spawned = spawner
                    .builder()
                    .name(format!("tile-{}", part))
                    .spawn(move |_| self.paint_class(start, end, workers, part));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        warn!("could not start worker {} of {}: {}", part, workers, e);
                        unstarted = Some(MandelError::WorkerSpawn {
                            worker: part,
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }

            let mut compositor = Compositor::new(self.geometry);
            let mut failure: Option<MandelError> = None;
            for (part, handle) in handles.into_iter().enumerate() {
                let outcome = match handle.join() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(MandelError::WorkerPanicked { worker: part }),
                };
                match outcome {
                    Ok(layer) => {
                        if failure.is_none() && unstarted.is_none() {
                            compositor.merge(layer);
                        }
                    }
                    Err(e) => {
                        debug!("worker {} failed: {}", part, e);
                        failure = failure.or(Some(e));
                    }
                }
            }
            match failure.or(unstarted) {
                Some(e) => Err(e),
                None => Ok(compositor.finish()),
            }
        })
        .unwrap_or(Err(MandelError::PassAborted))
    }
}

/// Render one chunk of a frame: positions `[start, end)` of the reveal
/// order, under the given view and parameters.
pub fn render_chunk(
    start: usize,
    end: usize,
    geometry: Geometry,
    view: View,
    params: &RunParameters,
    reveal: &RevealOrder,
    palette: &Arc<Palette>,
) -> Result<Canvas> {
    let mapper = PlaneMapper::new(geometry, view);
    let colors = DensityPalette::new(palette.clone(), params.color_density);
    TileRenderer::new(geometry, &mapper, &colors, reveal, params.iteration_budget).render(
        start,
        end,
        params.worker_count,
    )
}
