//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at the
//! top-left corner, and a rectangle on the complex plane described by
//! its center and its horizontal half-width.
//!
//! The vertical extent of the complex rectangle is never given
//! directly; it falls out of the aspect ratio of the integral plane,
//! so pixels are always square.
use num::Complex;

use crate::errors::{MandelError, Result};

/// Describes the width and height of the integral plane.  The
/// top-left corner is assumed to be at 0,0, `right` grows to the
/// right and `down` grows toward the bottom of the screen.  Only
/// `Geometry::new` builds one, so both sides are always non-zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    width: usize,
    height: usize,
}

/// A position on the screen, counted from the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel {
    /// Pixels to the right of the left edge.
    pub right: usize,
    /// Pixels below the top edge.
    pub down: usize,
}

impl Pixel {
    /// Constructor.
    pub fn new(right: usize, down: usize) -> Self {
        Pixel { right, down }
    }
}

impl Geometry {
    /// A geometry must have at least one pixel, its sides must fit the
    /// canvas' 32-bit dimensions, and its RGBA buffer must be
    /// addressable.
    pub fn new(width: usize, height: usize) -> Result<Geometry> {
        let too_big = width > u32::max_value() as usize
            || height > u32::max_value() as usize
            || width
                .checked_mul(height)
                .and_then(|n| n.checked_mul(4))
                .is_none();
        if width == 0 || height == 0 || too_big {
            return Err(MandelError::BadGeometry { width, height });
        }
        Ok(Geometry { width, height })
    }

    /// Number of pixels across.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of pixels down.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of pixels in the plane, N.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row-major decoding of a pixel index: `right` varies fastest.
    pub fn pixel_at(&self, index: usize) -> Pixel {
        Pixel {
            right: index % self.width,
            down: index / self.width,
        }
    }

    /// The inverse of `pixel_at`.
    pub fn index_of(&self, pixel: Pixel) -> usize {
        pixel.down * self.width + pixel.right
    }

    /// True when the pixel is inside the closed rectangle
    /// `[0, width] x [0, height]`.  The far edges are legal positions
    /// for the mapper even though they are not paintable.
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.right <= self.width && pixel.down <= self.height
    }
}

/// The visible rectangle of the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct View {
    /// Real part of the center.
    pub center_x: f64,
    /// Imaginary part of the center.
    pub center_y: f64,
    /// Horizontal half-extent.
    pub half_width: f64,
}

impl Default for View {
    fn default() -> Self {
        View {
            center_x: -0.717,
            center_y: 0.23,
            half_width: 0.02,
        }
    }
}

impl View {
    /// A view needs a finite center and a finite, positive half-width.
    pub fn new(center_x: f64, center_y: f64, half_width: f64) -> Result<View> {
        if !center_x.is_finite() {
            return Err(MandelError::invalid("x", center_x.to_string(), "must be finite"));
        }
        if !center_y.is_finite() {
            return Err(MandelError::invalid("y", center_y.to_string(), "must be finite"));
        }
        if !(half_width.is_finite() && half_width > 0.0) {
            return Err(MandelError::invalid(
                "w",
                half_width.to_string(),
                "must be finite and positive",
            ));
        }
        Ok(View {
            center_x,
            center_y,
            half_width,
        })
    }

    /// The same center, three quarters of the width.
    pub fn zoomed_in(&self) -> View {
        View {
            half_width: self.half_width * 3.0 / 4.0,
            ..*self
        }
    }

    /// The same center, twice the width.
    pub fn zoomed_out(&self) -> View {
        View {
            half_width: self.half_width * 2.0,
            ..*self
        }
    }

    /// The same width around a new center.
    pub fn recentered(&self, center: Complex<f64>) -> View {
        View {
            center_x: center.re,
            center_y: center.im,
            half_width: self.half_width,
        }
    }
}

/// Anything that can turn a screen position into a point on the
/// complex plane.
pub trait PointMapper: Sync {
    /// Map a pixel to its complex coordinate.  Pixels off the plane
    /// are a programming error and come back as `OutOfBounds`.
    fn pixel_to_point(&self, pixel: Pixel) -> Result<Complex<f64>>;
}

/// Contains the definitions of two planes: an integral cartesian
/// plane, and a complex, real cartesian plane.  Maps points from one
/// to the other.  Rebuilt, never edited, whenever the view changes.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The integral cartesian plane.
    pub geometry: Geometry,
    /// The rectangle of the complex plane it covers.
    pub view: View,
    // Vertical half-extent, derived from the aspect ratio.
    vertical_half: f64,
}

impl PlaneMapper {
    /// Constructor.  Takes the integral plane and the view onto the
    /// complex plane.
    pub fn new(geometry: Geometry, view: View) -> PlaneMapper {
        let vertical_half =
            view.half_width * (geometry.height() as f64) / (geometry.width() as f64);
        PlaneMapper {
            geometry,
            view,
            vertical_half,
        }
    }

    /// The vertical half-extent of the view.
    pub fn vertical_half(&self) -> f64 {
        self.vertical_half
    }
}

impl PointMapper for PlaneMapper {
    fn pixel_to_point(&self, pixel: Pixel) -> Result<Complex<f64>> {
        if !self.geometry.contains(pixel) {
            return Err(MandelError::OutOfBounds {
                right: pixel.right,
                down: pixel.down,
                width: self.geometry.width(),
                height: self.geometry.height(),
            });
        }
        let width = self.geometry.width() as f64;
        let height = self.geometry.height() as f64;
        // The imaginary axis points up, the screen's down axis points
        // down, hence the flipped subtraction.
        let re = self.view.center_x
            + (2.0 * pixel.right as f64 - width) / (2.0 * width) * self.view.half_width;
        let im = self.view.center_y
            + (height - 2.0 * pixel.down as f64) / (2.0 * height) * self.vertical_half;
        Ok(Complex::new(re, im))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(width: usize, height: usize, view: View) -> PlaneMapper {
        PlaneMapper::new(Geometry::new(width, height).unwrap(), view)
    }

    #[test]
    fn geometry_fails_on_empty_shape() {
        assert!(Geometry::new(0, 4).is_err());
        assert!(Geometry::new(4, 0).is_err());
        assert!(Geometry::new(4, 4).is_ok());
    }

    #[test]
    fn geometry_fails_when_the_canvas_is_unaddressable() {
        let side = u32::max_value() as usize;
        // Fits as a pixel count, but not once every pixel takes four bytes.
        let pixels = usize::max_value() / 4 + 1;
        if pixels <= side {
            assert!(Geometry::new(pixels, 1).is_err());
        } else {
            assert!(Geometry::new(side, pixels / side + 1).is_err());
        }
        let g = Geometry::new(1024, 512).unwrap();
        assert_eq!((g.width(), g.height()), (1024, 512));
        assert!(!g.is_empty());
    }

    #[test]
    fn pixel_indices_are_row_major() {
        let g = Geometry::new(4, 2).unwrap();
        assert_eq!(g.len(), 8);
        assert_eq!(g.pixel_at(0), Pixel::new(0, 0));
        assert_eq!(g.pixel_at(3), Pixel::new(3, 0));
        assert_eq!(g.pixel_at(5), Pixel::new(1, 1));
        for k in 0..g.len() {
            assert_eq!(g.index_of(g.pixel_at(k)), k);
        }
    }

    #[test]
    fn center_pixel_maps_to_view_center() {
        let views = [
            View::default(),
            View::new(0.0, 0.0, 2.0).unwrap(),
            View::new(-1.25, 0.5, 1e-9).unwrap(),
        ];
        for view in views.iter() {
            let pm = mapper(1024, 512, *view);
            let c = pm.pixel_to_point(Pixel::new(512, 256)).unwrap();
            assert_eq!(c, Complex::new(view.center_x, view.center_y));
        }
    }

    #[test]
    fn corners_span_the_view() {
        let pm = mapper(20, 10, View::new(1.0, 3.0, 0.2).unwrap());
        assert!((pm.vertical_half() - 0.1).abs() < 1e-15);
        let top_left = pm.pixel_to_point(Pixel::new(0, 0)).unwrap();
        assert!((top_left.re - 0.9).abs() < 1e-12);
        assert!((top_left.im - 3.05).abs() < 1e-12);
        let bottom_right = pm.pixel_to_point(Pixel::new(20, 10)).unwrap();
        assert!((bottom_right.re - 1.1).abs() < 1e-12);
        assert!((bottom_right.im - 2.95).abs() < 1e-12);
    }

    #[test]
    fn screen_down_is_imaginary_down() {
        let pm = mapper(4, 4, View::new(0.0, 0.0, 1.0).unwrap());
        let upper = pm.pixel_to_point(Pixel::new(2, 1)).unwrap();
        let lower = pm.pixel_to_point(Pixel::new(2, 3)).unwrap();
        assert!(upper.im > lower.im);
    }

    #[test]
    fn pixels_off_the_plane_are_refused() {
        let pm = mapper(4, 2, View::default());
        assert!(pm.pixel_to_point(Pixel::new(4, 2)).is_ok());
        assert_eq!(
            pm.pixel_to_point(Pixel::new(5, 0)),
            Err(MandelError::OutOfBounds {
                right: 5,
                down: 0,
                width: 4,
                height: 2
            })
        );
        assert!(pm.pixel_to_point(Pixel::new(0, 3)).is_err());
    }

    #[test]
    fn zooms_keep_the_center() {
        let v = View::new(0.5, -0.5, 0.4).unwrap();
        assert_eq!(v.zoomed_in(), View::new(0.5, -0.5, 0.4 * 3.0 / 4.0).unwrap());
        assert_eq!(v.zoomed_out().half_width, 0.8);
        assert_eq!(v.zoomed_out().center_x, 0.5);
    }

    #[test]
    fn views_refuse_degenerate_widths() {
        assert!(View::new(0.0, 0.0, 0.0).is_err());
        assert!(View::new(0.0, 0.0, -1.0).is_err());
        assert!(View::new(std::f64::NAN, 0.0, 1.0).is_err());
        assert!(View::new(0.0, 0.0, std::f64::INFINITY).is_err());
    }
}
