use thiserror::Error;

use super::{Interval, SegmentIndex};

/// Everything that can go wrong while applying a gesture. A failed operation never
/// changes the selection set it was given.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("malformed position: {0}")]
    MalformedPosition(#[from] PositionFault),

    #[error("no highlight in segment {segment} spans exactly {interval}")]
    InvalidRemoval {
        segment: SegmentIndex,
        interval: Interval,
    },

    #[error("cannot remove a highlight that spans segments {from} to {to}")]
    CrossSegmentRemoval {
        from: SegmentIndex,
        to: SegmentIndex,
    },

    #[error("selection set does not fit the document: {0}")]
    InvalidSelectionSet(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PositionFault {
    #[error("locator does not point into the document")]
    Unresolved,

    #[error("segment {segment} does not exist (document has {segment_count} segments)")]
    UnknownSegment {
        segment: SegmentIndex,
        segment_count: usize,
    },

    #[error("offset {offset} exceeds length {len} of segment {segment}")]
    OffsetOutOfRange {
        segment: SegmentIndex,
        offset: usize,
        len: usize,
    },
}
