//! Hex coordinate system for battle maps (axial coordinates)
//!
//! Uses axial coordinates (q, r) for grid algorithms and logical (x, y)
//! coordinates for map authoring and UI. The two are linked by an "odd-r"
//! offset: row parity shifts column alignment.

use serde::{Deserialize, Serialize};

use crate::constants::SQRT_3;

/// Logical (column, row) position used by map definitions and the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct LogicalPos {
    pub x: i32,
    pub y: i32,
}

impl LogicalPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Convert a logical (x, y) position using the odd-r offset
    ///
    /// `div_euclid` floors for negative rows, keeping the mapping a bijection
    /// over all integers.
    pub fn from_logical(pos: LogicalPos) -> Self {
        Self {
            q: pos.x - pos.y.div_euclid(2),
            r: pos.y,
        }
    }

    /// Convert to the logical (x, y) position under the odd-r offset
    pub fn to_logical(&self) -> LogicalPos {
        LogicalPos {
            x: self.q + self.r.div_euclid(2),
            y: self.r,
        }
    }

    /// Manhattan distance in hex space
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    /// Hex coordinates crossed by the straight line from self to other
    ///
    /// Inclusive of both endpoints. Returns an empty vec when the endpoints
    /// are equal.
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other) as i32;
        if n == 0 {
            return Vec::new();
        }

        let mut results = Vec::with_capacity((n + 1) as usize);
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let q = self.q as f32 + (other.q - self.q) as f32 * t;
            let r = self.r as f32 + (other.r - self.r) as f32 * t;
            results.push(Self::round(q, r));
        }
        results
    }

    /// Round floating point hex to nearest integer hex
    ///
    /// The axis with the largest rounding error is recomputed from the other
    /// two so that q + r + s stays zero.
    fn round(q: f32, r: f32) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }

    /// Get all hexes within range (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Bearing in degrees [0, 360) toward another hex, measured in logical
    /// space (the same frame combat uses for armor arcs)
    pub fn bearing_to(&self, other: &HexCoord) -> f32 {
        let from = self.to_logical();
        let to = other.to_logical();
        let dy = (to.y - from.y) as f32;
        let dx = (to.x - from.x) as f32;
        dy.atan2(dx).to_degrees().rem_euclid(360.0)
    }

    /// Pixel position of the hex center for pointy-top hexes
    pub fn to_pixel(&self, size: f32) -> (f32, f32) {
        let x = size * SQRT_3 * (self.q as f32 + self.r as f32 / 2.0);
        let y = size * 1.5 * self.r as f32;
        (x, y)
    }
}

/// The six corners of a pointy-top hex centered at `center`
///
/// Corners sit at angles 60°·i + 30°, so the first corner points
/// east-north-east and the hex stands on a vertex.
pub fn hex_corners(center: (f32, f32), size: f32) -> [(f32, f32); 6] {
    let mut corners = [(0.0, 0.0); 6];
    for (i, corner) in corners.iter_mut().enumerate() {
        let angle = (60.0 * i as f32 + 30.0).to_radians();
        *corner = (center.0 + size * angle.cos(), center.1 + size * angle.sin());
    }
    corners
}
