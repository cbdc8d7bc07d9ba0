use serde::{Deserialize, Serialize};

use super::{HighlightDocument, HighlightError, Interval, SegmentIndex};

/// Highlighted intervals of one segment, kept maximally merged: sorted, and no two
/// neighbours overlap or touch (`end_k < start_{k+1}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentIntervals(Vec<Interval>);

impl SegmentIntervals {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Accepts a caller supplied list after checking it against the segment length and
    /// the merge invariant.
    pub fn from_intervals(
        intervals: Vec<Interval>,
        segment_len: usize,
    ) -> Result<Self, HighlightError> {
        let list = Self(intervals);
        list.check(segment_len)
            .map_err(HighlightError::InvalidSelectionSet)?;
        Ok(list)
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges `range` in with one left-to-right pass. Every stored interval that
    /// overlaps or touches the range is absorbed into it; the widened range lands in
    /// front of the first interval that is still strictly after it.
    pub fn with_inserted(&self, range: Interval) -> Self {
        if range.is_empty() {
            return self.clone();
        }

        let mut merged = range;
        let mut placed = false;
        let mut out = Vec::with_capacity(self.0.len() + 1);
        for existing in &self.0 {
            if placed || existing.end < merged.start {
                out.push(*existing);
            } else if merged.end < existing.start {
                out.push(merged);
                out.push(*existing);
                placed = true;
            } else {
                merged = merged.hull(existing);
            }
        }
        if !placed {
            out.push(merged);
        }
        Self(out)
    }

    /// Drops the interval equal to `target`. `None` when no stored interval matches
    /// exactly, partial overlaps included.
    pub fn without(&self, target: Interval) -> Option<Self> {
        let index = self.0.binary_search(&target).ok()?;
        let mut out = self.0.clone();
        out.remove(index);
        Some(Self(out))
    }

    pub(crate) fn check(&self, segment_len: usize) -> Result<(), String> {
        for interval in &self.0 {
            if interval.is_empty() {
                return Err(format!("empty interval {interval}"));
            }
            if interval.end > segment_len {
                return Err(format!(
                    "interval {interval} exceeds segment length {segment_len}"
                ));
            }
        }
        for pair in self.0.windows(2) {
            if pair[0].end >= pair[1].start {
                return Err(format!(
                    "intervals {} and {} overlap, touch or are out of order",
                    pair[0], pair[1]
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SegmentIntervals {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One interval list per document segment, index aligned with the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(Vec<SegmentIntervals>);

impl SelectionSet {
    pub fn empty(document: &HighlightDocument) -> Self {
        Self(vec![SegmentIntervals::new(); document.segment_count()])
    }

    /// Validates a pre-seeded set: one list per segment, every list well formed.
    pub fn from_segments(
        document: &HighlightDocument,
        segments: Vec<SegmentIntervals>,
    ) -> Result<Self, HighlightError> {
        let set = Self(segments);
        set.validate(document)?;
        Ok(set)
    }

    pub(crate) fn from_checked(segments: Vec<SegmentIntervals>) -> Self {
        Self(segments)
    }

    pub fn validate(&self, document: &HighlightDocument) -> Result<(), HighlightError> {
        if self.0.len() != document.segment_count() {
            return Err(HighlightError::InvalidSelectionSet(format!(
                "{} interval lists for {} segments",
                self.0.len(),
                document.segment_count()
            )));
        }
        for (segment, (intervals, len)) in self
            .0
            .iter()
            .zip(document.segment_lengths())
            .enumerate()
        {
            intervals.check(*len).map_err(|reason| {
                HighlightError::InvalidSelectionSet(format!("segment {segment}: {reason}"))
            })?;
        }
        Ok(())
    }

    pub fn segment(&self, segment: SegmentIndex) -> Option<&SegmentIntervals> {
        self.0.get(segment)
    }

    pub fn segments(&self) -> &[SegmentIntervals] {
        &self.0
    }

    pub fn segment_count(&self) -> usize {
        self.0.len()
    }

    pub fn interval_count(&self) -> usize {
        self.0.iter().map(SegmentIntervals::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(SegmentIntervals::is_empty)
    }

    /// Every stored interval with its segment, in document order.
    pub fn intervals(&self) -> impl Iterator<Item = (SegmentIndex, Interval)> + '_ {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(segment, list)| list.iter().map(move |interval| (segment, *interval)))
    }
}
