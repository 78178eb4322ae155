//! Deterministic marker colors for spiders.
//!
//! Each spider gets a pair of colors from its 1-based position in the registry: one for
//! individual points and a lighter one for clusters. The derivation has no uniqueness
//! guarantee. Colors repeat with a period of 240 once `255 - 17i` goes negative, so e.g.
//! indices 15 and 255 share a color.

use std::fmt;

/// Alpha used for individual point markers.
pub const POINT_ALPHA: f32 = 0.9;
/// Alpha used for cluster markers.
pub const CLUSTER_ALPHA: f32 = 0.5;

const POINT_MODULUS: i64 = 240;
const CLUSTER_SHIFT: u16 = 15;
const CLUSTER_MODULUS: u16 = 255;

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a new color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array in `[r, g, b]` order.
    pub const fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// CSS `rgba()` notation with the given alpha.
    pub fn to_rgba(&self, alpha: f32) -> String {
        format!("rgba({},{},{},{alpha})", self.r, self.g, self.b)
    }

    fn map_channels(self, f: impl Fn(u8) -> u8) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Colors of one spider's markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPair {
    /// Color of individual points. Channels are in `0..240`.
    pub point: Rgb,
    /// Color of clusters. Channels are in `0..255`.
    pub cluster: Rgb,
}

impl ColorPair {
    /// Derives the colors for the spider at the given 1-based registry position.
    pub fn for_index(index: usize) -> Self {
        let i = index as i64;
        let base = [128 + 12 * i, 255 - 17 * i, 31 * i];

        // Channels are reordered by a key that rotates with the index, highest key first.
        let mut order = [0usize, 1, 2];
        order.sort_by_key(|&position| std::cmp::Reverse((position as i64 + i) % 3));

        let [r, g, b] = order.map(|position| ((base[position].abs() + 1) % POINT_MODULUS) as u8);
        let point = Rgb::new(r, g, b);
        let cluster = point
            .map_channels(|c| ((u16::from(c) + CLUSTER_SHIFT) % CLUSTER_MODULUS) as u8);

        Self { point, cluster }
    }

    /// CSS color of point markers.
    pub fn point_css(&self) -> String {
        self.point.to_rgba(POINT_ALPHA)
    }

    /// CSS color of cluster markers.
    pub fn cluster_css(&self) -> String {
        self.cluster.to_rgba(CLUSTER_ALPHA)
    }
}
