//! Size negotiation primitives.

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn opposite(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// How a widget prefers to be measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeRequestMode {
    /// Measure width first, then height for that width.
    HeightForWidth,
    /// Measure height first, then width for that height.
    WidthForHeight,
    /// Natural size along both axes, no cross-axis dependency.
    #[default]
    ConstantSize,
}

/// The result of measuring one axis: minimum and natural size, plus
/// baselines for horizontally-measured text. A baseline of `-1` means
/// "not aligned".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub minimum: i32,
    pub natural: i32,
    pub min_baseline: i32,
    pub natural_baseline: i32,
}

impl Measurement {
    /// A measurement without baseline alignment. Natural is clamped up to
    /// minimum.
    pub fn new(minimum: i32, natural: i32) -> Self {
        Self {
            minimum,
            natural: natural.max(minimum),
            min_baseline: -1,
            natural_baseline: -1,
        }
    }

    pub const ZERO: Measurement = Measurement {
        minimum: 0,
        natural: 0,
        min_baseline: -1,
        natural_baseline: -1,
    };

    pub fn with_baselines(mut self, min_baseline: i32, natural_baseline: i32) -> Self {
        self.min_baseline = min_baseline;
        self.natural_baseline = natural_baseline;
        self
    }

    pub fn has_baseline(&self) -> bool {
        self.min_baseline >= 0
    }

    /// Grow both minimum and natural by `extra` (margins, padding).
    pub fn expand(mut self, extra: i32) -> Self {
        self.minimum += extra;
        self.natural += extra;
        self
    }

    /// Clamp minimum (and natural) up to a CSS min-size floor.
    pub fn clamp_min(mut self, floor: i32) -> Self {
        self.minimum = self.minimum.max(floor);
        self.natural = self.natural.max(self.minimum);
        self
    }

    /// Per-axis max, used by homogeneous containers.
    pub fn max(self, other: Measurement) -> Self {
        Measurement {
            minimum: self.minimum.max(other.minimum),
            natural: self.natural.max(other.natural),
            min_baseline: self.min_baseline.max(other.min_baseline),
            natural_baseline: self.natural_baseline.max(other.natural_baseline),
        }
    }

    /// Per-axis sum, used by box layout along its main axis.
    pub fn add(self, other: Measurement) -> Self {
        Measurement {
            minimum: self.minimum + other.minimum,
            natural: self.natural + other.natural,
            min_baseline: -1,
            natural_baseline: -1,
        }
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self::ZERO
    }
}
