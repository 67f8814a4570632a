//! The color wheel.
//!
//! The palette walks the six edges of the RGB cube that join the
//! primary and secondary colors: red, yellow, green, cyan, blue,
//! magenta and back to red.  Each edge is 255 single steps on one
//! channel, so the wheel has 6 * 255 = 1530 distinct colors and
//! closes on itself.

use image::Rgba;
use std::sync::Arc;

use crate::escape::TOOK_TOO_LONG;

/// Number of colors on the wheel.
pub const PALETTE_LEN: usize = 6 * 255;

/// Fully opaque black, for points that never escaped.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

// The channel that moves along each edge of the cube, and which way.
const EDGES: [(usize, i16); 6] = [(1, 1), (0, -1), (2, 1), (1, -1), (0, 1), (2, -1)];

/// An immutable, cyclic sequence of opaque colors.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Build the 1530-entry wheel, starting at pure red.
    pub fn build() -> Palette {
        let mut rgb: [i16; 3] = [255, 0, 0];
        let mut colors = Vec::with_capacity(PALETTE_LEN);
        for &(channel, step) in EDGES.iter() {
            for _ in 0..255 {
                colors.push(Rgba([rgb[0] as u8, rgb[1] as u8, rgb[2] as u8, 255]));
                rgb[channel] += step;
            }
        }
        Palette { colors }
    }

    /// Number of entries; always `PALETTE_LEN`.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Never true for a built palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color at `index`, wrapping around the wheel.
    pub fn at(&self, index: usize) -> Rgba<u8> {
        self.colors[index % self.colors.len()]
    }

    /// Black for the sentinel count, otherwise the wheel entry at
    /// `density * count`.
    pub fn color_for(&self, count: u32, density: u32) -> Rgba<u8> {
        if count == TOOK_TOO_LONG {
            return BLACK;
        }
        let scaled = (u64::from(density) * u64::from(count)) % (self.colors.len() as u64);
        self.colors[scaled as usize]
    }
}

/// Anything that can paint an escape count.
pub trait ColorMapper: Sync {
    /// The color for a given escape count.
    fn color(&self, count: u32) -> Rgba<u8>;
}

/// A shared palette fixed to one color density.  Rebuilt whenever the
/// density changes; the palette itself is never rebuilt.
#[derive(Clone, Debug)]
pub struct DensityPalette {
    palette: Arc<Palette>,
    density: u32,
}

impl DensityPalette {
    /// Constructor.
    pub fn new(palette: Arc<Palette>, density: u32) -> Self {
        DensityPalette { palette, density }
    }

    /// The color density this mapper scales counts by.
    pub fn density(&self) -> u32 {
        self.density
    }
}

impl ColorMapper for DensityPalette {
    fn color(&self, count: u32) -> Rgba<u8> {
        self.palette.color_for(count, self.density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn wheel_has_1530_distinct_opaque_colors() {
        let p = Palette::build();
        assert_eq!(p.len(), PALETTE_LEN);
        let distinct: HashSet<[u8; 4]> = (0..p.len()).map(|i| p.at(i).0).collect();
        assert_eq!(distinct.len(), 1530);
        assert!((0..p.len()).all(|i| p.at(i).0[3] == 255));
    }

    #[test]
    fn wheel_visits_the_primaries_in_order() {
        let p = Palette::build();
        assert_eq!(p.at(0), Rgba([255, 0, 0, 255]));
        assert_eq!(p.at(255), Rgba([255, 255, 0, 255]));
        assert_eq!(p.at(510), Rgba([0, 255, 0, 255]));
        assert_eq!(p.at(765), Rgba([0, 255, 255, 255]));
        assert_eq!(p.at(1020), Rgba([0, 0, 255, 255]));
        assert_eq!(p.at(1275), Rgba([255, 0, 255, 255]));
        assert_eq!(p.at(1529), Rgba([255, 0, 1, 255]));
        assert_eq!(p.at(1530), p.at(0));
    }

    #[test]
    fn neighbours_differ_by_one_step_on_one_channel() {
        let p = Palette::build();
        for i in 0..p.len() {
            let a = p.at(i).0;
            let b = p.at(i + 1).0;
            let moved: i32 = (0..3).map(|c| (i32::from(a[c]) - i32::from(b[c])).abs()).sum();
            assert_eq!(moved, 1, "entries {} and {}", i, i + 1);
        }
    }

    #[test]
    fn sentinel_is_black_at_any_density() {
        let p = Palette::build();
        for density in &[0, 1, 8, 1531, u32::max_value()] {
            assert_eq!(p.color_for(TOOK_TOO_LONG, *density), BLACK);
        }
    }

    #[test]
    fn counts_are_scaled_by_density() {
        let p = Palette::build();
        assert_eq!(p.color_for(1, 1), p.at(1));
        assert_eq!(p.color_for(3, 8), p.at(24));
        assert_eq!(p.color_for(200, 8), p.at(1600 % 1530));
        assert_eq!(
            p.color_for(u32::max_value(), u32::max_value()),
            p.at(((u64::from(u32::max_value()) * u64::from(u32::max_value())) % 1530) as usize)
        );
    }

    #[test]
    fn density_palette_delegates() {
        let shared = Arc::new(Palette::build());
        let mapper = DensityPalette::new(shared.clone(), 8);
        assert_eq!(mapper.density(), 8);
        assert_eq!(mapper.color(0), BLACK);
        assert_eq!(mapper.color(5), shared.at(40));
    }
}
