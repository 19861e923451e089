use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Swap planar axes. Vertical layouts reason in a swapped frame so the
    /// routing code never case-splits on direction.
    pub fn swapped(self) -> Self {
        Self::new(self.y, self.x)
    }
}

/// A rectangle defined by min and max corners
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: Vec2::new(pos.x + size.x, pos.y + size.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.min.x + self.width() * 0.5,
            self.min.y + self.height() * 0.5,
        )
    }

    /// Strict interior containment. Points on the boundary do not count.
    pub fn contains_interior(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Overlap with a positive-area intersection; touching edges don't count.
    pub fn overlaps_interior(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn expand(&self, amount: f32) -> Rect {
        Rect {
            min: Vec2::new(self.min.x - amount, self.min.y - amount),
            max: Vec2::new(self.max.x + amount, self.max.y + amount),
        }
    }

    pub fn swapped(&self) -> Rect {
        Rect {
            min: self.min.swapped(),
            max: self.max.swapped(),
        }
    }
}

/// Quantize a coordinate to the raster grid.
pub fn snap(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

pub fn snap_point(point: Vec2, step: f32) -> Vec2 {
    Vec2::new(snap(point.x, step), snap(point.y, step))
}

/// Whether the segment `a..b` crosses the interior of `rect`.
///
/// For axis-aligned segments, grazing the rectangle border is not a crossing;
/// routes are allowed to run along obstacle edges. Diagonal segments (never
/// produced by the router, but legal in seed input) fall back to a bounding
/// box overlap plus a midpoint containment test.
pub fn segment_intersects_rect(a: Vec2, b: Vec2, rect: &Rect) -> bool {
    if a.x == b.x {
        // Vertical segment
        if a.x <= rect.min.x || a.x >= rect.max.x {
            return false;
        }
        let lo = a.y.min(b.y);
        let hi = a.y.max(b.y);
        return lo < rect.max.y && hi > rect.min.y && span_crosses(lo, hi, rect.min.y, rect.max.y);
    }
    if a.y == b.y {
        // Horizontal segment
        if a.y <= rect.min.y || a.y >= rect.max.y {
            return false;
        }
        let lo = a.x.min(b.x);
        let hi = a.x.max(b.x);
        return lo < rect.max.x && hi > rect.min.x && span_crosses(lo, hi, rect.min.x, rect.max.x);
    }

    // Diagonal fallback
    let seg_bounds = Rect::from_min_max(
        Vec2::new(a.x.min(b.x), a.y.min(b.y)),
        Vec2::new(a.x.max(b.x), a.y.max(b.y)),
    );
    if !seg_bounds.overlaps_interior(rect) {
        return false;
    }
    let mid = Vec2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
    rect.contains_interior(mid)
}

// The overlap of [lo, hi] with [min, max] must have positive length.
fn span_crosses(lo: f32, hi: f32, min: f32, max: f32) -> bool {
    lo.max(min) < hi.min(max)
}

/// Drop consecutive duplicate points, then collapse collinear triples.
/// Inputs of at most one point come back unchanged.
pub fn simplify(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() <= 1 {
        return points.to_vec();
    }

    let mut deduped: Vec<Vec2> = Vec::with_capacity(points.len());
    for &point in points {
        if deduped.last() != Some(&point) {
            deduped.push(point);
        }
    }
    if deduped.len() <= 2 {
        return deduped;
    }

    let mut result = vec![deduped[0]];
    for i in 1..deduped.len() - 1 {
        let prev = *result.last().expect("result is seeded");
        let curr = deduped[i];
        let next = deduped[i + 1];
        if !collinear(prev, curr, next) {
            result.push(curr);
        }
    }
    result.push(deduped[deduped.len() - 1]);
    result
}

fn collinear(a: Vec2, b: Vec2, c: Vec2) -> bool {
    (b.x - a.x) * (c.y - a.y) == (b.y - a.y) * (c.x - a.x)
}

/// Manhattan length of a polyline.
pub fn route_length(points: &[Vec2]) -> f32 {
    points
        .windows(2)
        .map(|pair| (pair[1].x - pair[0].x).abs() + (pair[1].y - pair[0].y).abs())
        .sum()
}
