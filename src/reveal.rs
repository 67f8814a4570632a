//! The order in which a frame's pixels are revealed.
//!
//! Painting in raster order fills the screen top to bottom.  Painting
//! in a random order instead means every chunk lands roughly evenly
//! over the whole frame, and the image seems to condense out of
//! noise.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::{MandelError, Result};

/// A permutation of the pixel indices `[0, n)`.  Built once at the
/// start of a frame and only read after that.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealOrder {
    sigma: Vec<usize>,
}

impl RevealOrder {
    /// A fresh, entropy-seeded permutation of `[0, n)`.
    pub fn build(n: usize) -> RevealOrder {
        RevealOrder::build_with(n, &mut StdRng::from_entropy())
    }

    /// Knuth's shuffle, driven by the supplied generator.  Start from
    /// the identity and, for each position, swap in an element chosen
    /// uniformly from the ones not yet placed.
    pub fn build_with<R: Rng>(n: usize, rng: &mut R) -> RevealOrder {
        let mut sigma: Vec<usize> = (0..n).collect();
        for i in 0..n.saturating_sub(1) {
            let j = rng.gen_range(i, n);
            sigma.swap(i, j);
        }
        RevealOrder { sigma }
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.sigma.len()
    }

    /// True for the permutation of nothing.
    pub fn is_empty(&self) -> bool {
        self.sigma.is_empty()
    }

    /// The pixel index revealed at `position`, or `RevealIndex` when
    /// the position is past the end of the frame.
    pub fn get(&self, position: usize) -> Result<usize> {
        self.sigma
            .get(position)
            .cloned()
            .ok_or(MandelError::RevealIndex {
                index: position,
                len: self.sigma.len(),
            })
    }

    /// The permutation as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_bijection(order: &RevealOrder) -> bool {
        let mut seen = vec![false; order.len()];
        for &k in order.as_slice() {
            if k >= seen.len() || seen[k] {
                return false;
            }
            seen[k] = true;
        }
        seen.into_iter().all(|s| s)
    }

    #[test]
    fn every_pixel_appears_exactly_once() {
        for n in &[0, 1, 2, 3, 25, 1000, 4096] {
            let order = RevealOrder::build(*n);
            assert_eq!(order.len(), *n);
            assert!(is_bijection(&order), "n = {}", n);
        }
    }

    #[test]
    fn seeded_builds_are_repeatable() {
        let a = RevealOrder::build_with(500, &mut StdRng::seed_from_u64(7));
        let b = RevealOrder::build_with(500, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(is_bijection(&a));
    }

    #[test]
    fn fresh_builds_differ() {
        // Two entropy-seeded shuffles of 1000 elements agreeing is
        // vanishingly unlikely.
        assert_ne!(RevealOrder::build(1000), RevealOrder::build(1000));
    }

    #[test]
    fn shuffle_discards_raster_order() {
        let order = RevealOrder::build_with(1000, &mut StdRng::seed_from_u64(42));
        let identity: Vec<usize> = (0..1000).collect();
        assert_ne!(order.as_slice(), &identity[..]);
    }

    #[test]
    fn positions_past_the_end_are_errors() {
        let order = RevealOrder::build(8);
        assert!(order.get(7).is_ok());
        assert_eq!(
            order.get(8),
            Err(MandelError::RevealIndex { index: 8, len: 8 })
        );
        assert_eq!(order.get(3).unwrap(), order.as_slice()[3]);
    }
}
