#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progressive Mandelbrot renderer
//!
//! The Mandelbrot set is drawn by taking each point on the complex
//! plane, repeatedly squaring it and adding it back to itself, and
//! counting how many rounds it takes to fly off past a radius of two.
//! That count, run through a color wheel, is the pixel's color.
//!
//! Rather than computing a whole frame and then showing it, this crate
//! reveals a frame a chunk at a time.  The pixels are visited in a
//! random order fixed at the start of each frame, so every chunk is
//! scattered evenly over the screen and the image condenses out of
//! noise instead of scrolling in from the top.  Each chunk is painted
//! by several threads at once, each onto its own transparent canvas,
//! and the canvases are stacked into a single partial image.
//!
//! A `Session` holds the view, the run parameters and the cursor into
//! the current frame; each call to `Session::next` yields either the
//! next partial image or, once the frame is complete, a banner
//! describing what was drawn.

pub mod encode;
pub mod errors;
pub mod escape;
pub mod palette;
pub mod params;
pub mod planes;
pub mod render;
pub mod request;
pub mod reveal;
pub mod session;

pub use errors::{MandelError, Result};
pub use params::RunParameters;
pub use planes::{Geometry, Pixel, PlaneMapper, PointMapper, View};
pub use render::Canvas;
pub use request::{Command, Request};
pub use session::{FrameState, Navigation, Response, Session};
