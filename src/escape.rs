//! The classic escape-time iteration.
//!
//! Starting from zero, a point `c` is repeatedly squared and
//! translated by itself.  Points in the Mandelbrot set stay within a
//! radius of two forever; everything else eventually leaves, and how
//! quickly it leaves is the number we paint with.

use num::Complex;

/// The count returned for a point that never escaped within the
/// budget.  Painted black.
pub const TOOK_TOO_LONG: u32 = 0;

/// Iterate `v <- v*v + c` from `v = 0` for at most `max_iterations`
/// rounds.  Returns the 1-based round at which `|v|` first exceeded
/// two, or `TOOK_TOO_LONG` if it never did.
pub fn escape_count(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut v: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    for n in 1..=max_iterations {
        v = v * v + c;
        if v.norm() > 2.0 {
            return n;
        }
    }
    TOOK_TOO_LONG
}
