// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One viewer's session: the view, the run parameters, and how far
//! through the current frame we are.
//!
//! A frame is revealed one chunk per request.  The cursor counts reveal
//! positions already sent; each request renders the next
//! `chunk_pixels * 1024` positions (fewer at the end).  Once the cursor
//! reaches the end of the frame, the following request gets the banner
//! instead of an image and the cursor goes back to zero.
//!
//! Navigation only takes effect between frames.  A frame that has
//! started is finished under the view it started with; otherwise
//! chunks rendered under different centers would be stacked on top of
//! each other.

use itertools::Itertools;
use log::{info, warn};
use std::sync::Arc;

use crate::errors::{MandelError, Result};
use crate::palette::Palette;
use crate::params::RunParameters;
use crate::planes::{Geometry, PlaneMapper, PointMapper, View};
use crate::render::{render_chunk, Canvas};
use crate::request::{Command, Request};
use crate::reveal::RevealOrder;

/// Where the session is within a frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameState {
    /// Nothing sent yet.  Navigation is accepted.
    Fresh,
    /// Some, but not all, of the frame has been sent.
    InProgress,
    /// Every pixel has been sent; the banner is due.
    Complete,
}

/// What a render request hands back to the transport.
#[derive(Clone, Debug)]
pub enum Response {
    /// The next partial image, to be layered over the previous ones.
    Image(Canvas),
    /// The frame is done.  Carries the view and parameters it was
    /// rendered with.
    Banner(String),
}

/// Outcome of applying a parsed request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Navigation {
    /// Commands that changed the view or parameters.
    pub applied: usize,
    /// Commands dropped because a frame was in progress.
    pub ignored: usize,
    /// Commands, or raw values, that were refused.
    pub rejected: Vec<MandelError>,
}

/// State for one logical viewing session.
#[derive(Debug)]
pub struct Session {
    geometry: Geometry,
    view: View,
    params: RunParameters,
    palette: Arc<Palette>,
    reveal: Option<RevealOrder>,
    position: usize,
}

impl Session {
    /// A fresh session.  The palette is built here, once.
    pub fn new(geometry: Geometry, view: View, params: RunParameters) -> Session {
        Session {
            geometry,
            view,
            params,
            palette: Arc::new(Palette::build()),
            reveal: None,
            position: 0,
        }
    }

    /// The fixed canvas size.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The current view.
    pub fn view(&self) -> View {
        self.view
    }

    /// The current run parameters.
    pub fn params(&self) -> RunParameters {
        self.params
    }

    /// Reveal positions sent so far in this frame.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Pixels in a frame.
    pub fn total(&self) -> usize {
        self.geometry.len()
    }

    /// Where the cursor stands.
    pub fn state(&self) -> FrameState {
        if self.position == 0 {
            FrameState::Fresh
        } else if self.position >= self.total() {
            FrameState::Complete
        } else {
            FrameState::InProgress
        }
    }

    /// `_x_y_w_iterations_chunk_workers_density`.  The leading
    /// underscore tells the client the frame is finished.
    pub fn banner(&self) -> String {
        let fields = [
            self.view.center_x.to_string(),
            self.view.center_y.to_string(),
            self.view.half_width.to_string(),
            self.params.iteration_budget.to_string(),
            self.params.chunk_pixels.to_string(),
            self.params.worker_count.to_string(),
            self.params.color_density.to_string(),
        ];
        format!("_{}", fields.iter().join("_"))
    }

    /// Serve one render request: the next chunk of the frame, or the
    /// banner if the frame is complete.  A failed pass leaves the
    /// cursor untouched so the same chunk can be asked for again.
    pub fn next(&mut self) -> Result<Response> {
        let total = self.total();
        if self.position >= total {
            let banner = self.banner();
            info!("frame complete {}", banner);
            self.position = 0;
            self.reveal = None;
            return Ok(Response::Banner(banner));
        }

        if self.position == 0 {
            info!(
                "starting frame at ({}, {}) half-width {}",
                self.view.center_x, self.view.center_y, self.view.half_width
            );
            self.reveal = Some(RevealOrder::build(total));
        }
        let reveal = self
            .reveal
            .get_or_insert_with(|| RevealOrder::build(total));

        let start = self.position;
        let end = start + self.params.chunk_len().min(total - start);
        let canvas = render_chunk(
            start,
            end,
            self.geometry,
            self.view,
            &self.params,
            reveal,
            &self.palette,
        )?;
        self.position = end;
        Ok(Response::Image(canvas))
    }

    /// Drive requests until the banner, handing each partial image to
    /// `sink` along with the cursor position after it.
    pub fn run_frame<F>(&mut self, mut sink: F) -> Result<String>
    where
        F: FnMut(usize, &Canvas) -> Result<()>,
    {
        loop {
            match self.next()? {
                Response::Image(canvas) => sink(self.position, &canvas)?,
                Response::Banner(banner) => return Ok(banner),
            }
        }
    }

    /// Abandon whatever frame is in flight.  The next request starts a
    /// new frame with a new reveal order.
    pub fn restart(&mut self) {
        if self.position != 0 {
            info!("abandoning frame at {}/{}", self.position, self.total());
        }
        self.position = 0;
        self.reveal = None;
    }

    /// Apply a single command.  Returns `Ok(false)` without touching
    /// anything when a frame is in progress, and an error (keeping the
    /// old value) when the new value is unusable.
    pub fn apply(&mut self, command: Command) -> Result<bool> {
        if self.state() != FrameState::Fresh {
            warn!(
                "ignoring {:?}: frame in progress at {}/{}",
                command,
                self.position,
                self.total()
            );
            return Ok(false);
        }

        let view = self.view;
        match command {
            Command::Recenter(pixel) => {
                let center = PlaneMapper::new(self.geometry, view)
                    .pixel_to_point(pixel)
                    .map_err(|e| {
                        let raw = format!("{}|{}", pixel.right, pixel.down);
                        MandelError::invalid("newpt", raw, e.to_string())
                    })?;
                self.view = view.recentered(center);
            }
            Command::ZoomIn => self.view = checked(view.zoomed_in())?,
            Command::ZoomOut => self.view = checked(view.zoomed_out())?,
            Command::CenterX(x) => self.view = View::new(x, view.center_y, view.half_width)?,
            Command::CenterY(y) => self.view = View::new(view.center_x, y, view.half_width)?,
            Command::HalfWidth(w) => self.view = View::new(view.center_x, view.center_y, w)?,
            Command::Iterations(n) => self.params = self.params.with_iteration_budget(n)?,
            Command::Chunk(n) => self.params = self.params.with_chunk_pixels(n)?,
            Command::Workers(n) => self.params = self.params.with_worker_count(n)?,
            Command::Density(n) => self.params = self.params.with_color_density(n)?,
        }
        info!("applied {:?}", command);
        Ok(true)
    }

    /// Apply every command of a parsed request, in order.  Refused
    /// values are logged and skipped; the rest still apply.
    pub fn navigate(&mut self, request: &Request) -> Navigation {
        let mut outcome = Navigation::default();
        for e in request.errors.iter() {
            warn!("{}", e);
            outcome.rejected.push(e.clone());
        }
        for command in request.commands.iter() {
            match self.apply(*command) {
                Ok(true) => outcome.applied += 1,
                Ok(false) => outcome.ignored += 1,
                Err(e) => {
                    warn!("{}", e);
                    outcome.rejected.push(e);
                }
            }
        }
        outcome
    }
}

// Zooming far enough in or out eventually leaves the range of f64.
fn checked(view: View) -> Result<View> {
    View::new(view.center_x, view.center_y, view.half_width)
}
