//! The knobs a viewer can turn without moving the view.

use crate::errors::{MandelError, Result};

/// How many reveal positions make up one unit of `chunk_pixels`.
pub const CHUNK_UNIT: usize = 1024;

/// The most threads a single render pass may use.  Every worker paints
/// onto its own full-size canvas, so this also bounds the memory a
/// pass can ask for.
pub const MAX_WORKERS: usize = 1024;

/// Reveal granularity, bailout depth, parallelism and color cycling.
/// Every field is strictly positive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunParameters {
    /// Pixels per request, in units of `CHUNK_UNIT`.
    pub chunk_pixels: usize,
    /// Maximum iterations before a point is presumed inside the set.
    pub iteration_budget: u32,
    /// Number of concurrent workers per render pass, at most
    /// `MAX_WORKERS`.
    pub worker_count: usize,
    /// Multiplier applied to escape counts before the palette lookup.
    pub color_density: u32,
}

impl Default for RunParameters {
    fn default() -> Self {
        RunParameters {
            chunk_pixels: 32,
            iteration_budget: 2000,
            worker_count: num_cpus::get().max(1).min(MAX_WORKERS),
            color_density: 8,
        }
    }
}

fn positive<T: PartialOrd + Default + ToString>(name: &str, value: T) -> Result<T> {
    if value > T::default() {
        Ok(value)
    } else {
        Err(MandelError::invalid(name, value.to_string(), "must be positive"))
    }
}

fn bounded_workers(value: usize) -> Result<usize> {
    let value = positive("m", value)?;
    if value > MAX_WORKERS {
        return Err(MandelError::invalid(
            "m",
            value.to_string(),
            format!("must be at most {}", MAX_WORKERS),
        ));
    }
    Ok(value)
}

impl RunParameters {
    /// Build a validated set of parameters.
    pub fn new(
        chunk_pixels: usize,
        iteration_budget: u32,
        worker_count: usize,
        color_density: u32,
    ) -> Result<RunParameters> {
        Ok(RunParameters {
            chunk_pixels: positive("r", chunk_pixels)?,
            iteration_budget: positive("num", iteration_budget)?,
            worker_count: bounded_workers(worker_count)?,
            color_density: positive("col", color_density)?,
        })
    }

    /// A copy with a new chunk size.
    pub fn with_chunk_pixels(self, chunk_pixels: usize) -> Result<RunParameters> {
        Ok(RunParameters {
            chunk_pixels: positive("r", chunk_pixels)?,
            ..self
        })
    }

    /// A copy with a new iteration budget.
    pub fn with_iteration_budget(self, iteration_budget: u32) -> Result<RunParameters> {
        Ok(RunParameters {
            iteration_budget: positive("num", iteration_budget)?,
            ..self
        })
    }

    /// A copy with a new worker count.
    pub fn with_worker_count(self, worker_count: usize) -> Result<RunParameters> {
        Ok(RunParameters {
            worker_count: bounded_workers(worker_count)?,
            ..self
        })
    }

    /// A copy with a new color density.
    pub fn with_color_density(self, color_density: u32) -> Result<RunParameters> {
        Ok(RunParameters {
            color_density: positive("col", color_density)?,
            ..self
        })
    }

    /// Number of reveal positions a single request advances by.
    pub fn chunk_len(&self) -> usize {
        self.chunk_pixels.saturating_mul(CHUNK_UNIT)
    }
}
