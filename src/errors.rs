// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type shared by every part of the renderer.
//!
//! There are really only two families here.  Bad user input
//! (`InvalidParameter`) is reported and then forgotten; the session
//! keeps whatever value it had before.  Everything else means a
//! render pass went wrong, and the pass is thrown away whole.

use failure::Fail;

/// Everything that can go wrong between a request arriving and a
/// canvas (or banner) going back out.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum MandelError {
    /// A navigation value or override could not be parsed, or parsed
    /// to something the renderer cannot use.
    #[fail(display = "invalid value {:?} for {}: {}", value, name, reason)]
    InvalidParameter {
        /// The name of the parameter, as the caller spelled it.
        name: String,
        /// The offending raw value.
        value: String,
        /// Why it was refused.
        reason: String,
    },

    /// A pixel fell outside the integral plane.  This always means the
    /// reveal order and the plane mapper disagree about the geometry.
    #[fail(
        display = "pixel ({}, {}) lies outside the {}x{} plane",
        right, down, width, height
    )]
    OutOfBounds {
        /// Distance from the left edge.
        right: usize,
        /// Distance from the top edge.
        down: usize,
        /// Width of the plane.
        width: usize,
        /// Height of the plane.
        height: usize,
    },

    /// A chunk asked for a position the reveal order does not have.
    #[fail(display = "reveal position {} is beyond the {} pixels of the frame", index, len)]
    RevealIndex {
        /// The position requested.
        index: usize,
        /// The length of the reveal order.
        len: usize,
    },

    /// A worker thread died before handing back its canvas.
    #[fail(display = "render worker {} panicked", worker)]
    WorkerPanicked {
        /// The residue class the worker was painting.
        worker: usize,
    },

    /// The operating system would not start a worker thread.
    #[fail(display = "could not start render worker {}: {}", worker, reason)]
    WorkerSpawn {
        /// The residue class the worker would have painted.
        worker: usize,
        /// What the operating system said.
        reason: String,
    },

    /// The pass ended without every worker reporting back.
    #[fail(display = "render pass aborted before all workers reported")]
    PassAborted,

    /// The canvas has no pixels, or too many to address.
    #[fail(display = "cannot render onto a {}x{} canvas", width, height)]
    BadGeometry {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The image codec refused the canvas.
    #[fail(display = "could not encode canvas: {}", _0)]
    Encoding(String),

    /// A finished canvas could not be handed on.
    #[fail(display = "could not write canvas: {}", _0)]
    Output(String),
}

impl MandelError {
    /// Shorthand for building an `InvalidParameter`.
    pub fn invalid<N, V, R>(name: N, value: V, reason: R) -> Self
    where
        N: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        MandelError::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MandelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = MandelError::invalid("num", "abc", "not a whole number");
        assert_eq!(format!("{}", e), "invalid value \"abc\" for num: not a whole number");

        let e = MandelError::OutOfBounds {
            right: 9,
            down: 1,
            width: 4,
            height: 2,
        };
        assert_eq!(format!("{}", e), "pixel (9, 1) lies outside the 4x2 plane");

        let e = MandelError::WorkerSpawn {
            worker: 3,
            reason: "Resource temporarily unavailable".to_string(),
        };
        assert_eq!(
            format!("{}", e),
            "could not start render worker 3: Resource temporarily unavailable"
        );
    }
}
