//! Geometry primitives: Point, Size, Rect.
//!
//! Event coordinates are `f64` ([`Point`]); allocations and clips are integer
//! rectangles ([`Rect`]) in the parent's coordinate frame.

/// A point in surface or widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An integer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An integer rectangle in parent-relative coordinates.
///
/// Used for widget allocations and clips. A rect with zero (or negative)
/// width or height is considered empty; empty rects act as the identity for
/// [`Rect::union`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rect.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The zero rect at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether this rect has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Horizontal center.
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// Vertical center.
    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    /// Whether the point lies inside this rect.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as f64
            && p.y >= self.y as f64
            && p.x < self.right() as f64
            && p.y < self.bottom() as f64
    }

    /// Whether `other` lies entirely inside this rect.
    ///
    /// Empty rects are contained anywhere.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// The smallest rect covering both `self` and `other`.
    ///
    /// Empty rects are the union identity.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// The overlap of `self` and `other`, or `None` if they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Whether `self` and `other` overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Offset by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}
