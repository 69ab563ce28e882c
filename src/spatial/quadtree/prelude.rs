extern crate nalgebra as na;

/// Quadtrees exist in 2-dimensional space
pub type Vec2 = na::Vector2<f64>;

/// Returns the quadrant that (x, y) falls in relative to the midpoint (xm, ym).
///
/// ```text
/// |2|3|
/// |0|1|
/// ```
///
/// A coordinate equal to the midpoint falls on the higher side of that axis.
pub fn quadrant(x: f64, y: f64, xm: f64, ym: f64) -> usize {
    (((y >= ym) as usize) << 1) | ((x >= xm) as usize)
}

/// This is a 2D axis-aligned bounding square, closed at `min` and open at `max`.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox2D {
    pub min: Vec2,
    pub max: Vec2
}

impl BBox2D {
    /// Returns the unit square whose lower corner is 'p' rounded down.
    pub fn unit_at(p: &Vec2) -> Self {
        let min = Vec2::new(p.x.floor(), p.y.floor());
        Self {
            min,
            max: min + Vec2::new(1.0, 1.0)
        }
    }

    /// Returns true if the BBox contains the given point.
    pub fn contains(&self, p: &Vec2) -> bool {
        self.min.x <= p.x && p.x < self.max.x &&
        self.min.y <= p.y && p.y < self.max.y
    }

    /// Returns the length of a side.
    pub fn side(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the midpoint of the BBox
    pub fn mid(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Returns the quadrant of this BBox that 'p' falls in.
    pub fn quadrant_of(&self, p: &Vec2) -> usize {
        let mid = self.mid();
        quadrant(p.x, p.y, mid.x, mid.y)
    }

    /// Returns the square covering quadrant 'i' of this BBox.
    pub fn child(&self, i: usize) -> Self {
        let mid = self.mid();
        let (x0, x1) = if i & 1 == 0 { (self.min.x, mid.x) } else { (mid.x, self.max.x) };
        let (y0, y1) = if i & 2 == 0 { (self.min.y, mid.y) } else { (mid.y, self.max.y) };

        Self {
            min: Vec2::new(x0, y0),
            max: Vec2::new(x1, y1)
        }
    }

    /// Subdivides the BBox into its 4 quadrants, in quadrant order.
    pub fn subdivide(&self) -> [BBox2D; 4] {
        [self.child(0), self.child(1), self.child(2), self.child(3)]
    }

    /// Doubles the BBox once in the direction of 'p'.
    ///
    /// Returns the grown BBox along with the quadrant of it that this BBox now
    /// occupies. The BBox grows left if 'p' is left of it (right otherwise) and
    /// down if 'p' is below it (up otherwise).
    pub fn grow_towards(&self, p: &Vec2) -> (usize, BBox2D) {
        let side = self.side() * 2.0;
        let left = p.x < self.min.x;
        let below = p.y < self.min.y;

        let (x0, x1) = if left { (self.max.x - side, self.max.x) } else { (self.min.x, self.min.x + side) };
        let (y0, y1) = if below { (self.max.y - side, self.max.y) } else { (self.min.y, self.min.y + side) };

        let grown = Self {
            min: Vec2::new(x0, y0),
            max: Vec2::new(x1, y1)
        };

        (((below as usize) << 1) | (left as usize), grown)
    }

    /// Returns true if every bound is a finite number.
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
    }

    /// Returns the BBox as `[[x0, y0], [x1, y1]]`.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min.x, self.min.y], [self.max.x, self.max.y]]
    }
}
