use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a document segment: 0 is the title, `i > 0` is paragraph `i - 1`.
pub type SegmentIndex = usize;

/// A point in the document independent of how it is rendered. Offsets count chars.
///
/// The derived ordering is lexicographic over `(segment, offset)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalPosition {
    pub segment: SegmentIndex,
    pub offset: usize,
}

impl LogicalPosition {
    pub const fn new(segment: SegmentIndex, offset: usize) -> Self {
        Self { segment, offset }
    }
}

impl fmt::Display for LogicalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.offset)
    }
}

/// An ordered pair of positions, `lo <= hi`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LogicalRange {
    lo: LogicalPosition,
    hi: LogicalPosition,
}

impl LogicalRange {
    /// Builds a range from two endpoints given in either order.
    pub fn new(a: LogicalPosition, b: LogicalPosition) -> Self {
        if a > b {
            Self { lo: b, hi: a }
        } else {
            Self { lo: a, hi: b }
        }
    }

    pub fn within_segment(segment: SegmentIndex, start: usize, end: usize) -> Self {
        Self::new(
            LogicalPosition::new(segment, start),
            LogicalPosition::new(segment, end),
        )
    }

    pub fn lo(&self) -> LogicalPosition {
        self.lo
    }

    pub fn hi(&self) -> LogicalPosition {
        self.hi
    }

    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    pub fn is_single_segment(&self) -> bool {
        self.lo.segment == self.hi.segment
    }

    pub fn contains(&self, position: LogicalPosition) -> bool {
        self.lo <= position && position < self.hi
    }
}

impl fmt::Display for LogicalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

/// Half open interval `[start, end)` of char offsets within one segment.
///
/// Serialized as a two element array so stored selection sets stay compact.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// True when neither interval lies strictly before the other. Touching counts.
    pub fn meets(&self, other: &Interval) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<(usize, usize)> for Interval {
    fn from((start, end): (usize, usize)) -> Interval {
        Interval { start, end }
    }
}

impl From<Interval> for (usize, usize) {
    fn from(interval: Interval) -> (usize, usize) {
        (interval.start, interval.end)
    }
}
