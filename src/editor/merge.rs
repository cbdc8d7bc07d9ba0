use super::{
    HighlightDocument, HighlightError, Interval, LogicalRange, SegmentIntervals, SelectionSet,
};

/// Highlights `range`, which may span several segments. Each touched segment gets the
/// part of the range that falls inside it merged into its list; all other segments are
/// carried over unchanged.
pub fn insert(
    document: &HighlightDocument,
    selections: &SelectionSet,
    range: LogicalRange,
) -> Result<SelectionSet, HighlightError> {
    let (lo, hi) = (range.lo(), range.hi());
    document.check_position(lo)?;
    document.check_position(hi)?;
    ensure_aligned(document, selections)?;

    let segments: Vec<SegmentIntervals> = selections
        .segments()
        .iter()
        .zip(document.segment_lengths())
        .enumerate()
        .map(|(index, (intervals, len))| {
            if index < lo.segment || index > hi.segment {
                return intervals.clone();
            }
            let start = if index == lo.segment { lo.offset } else { 0 };
            let end = if index == hi.segment { hi.offset } else { *len };
            intervals.with_inserted(Interval::new(start, end))
        })
        .collect();

    Ok(SelectionSet::from_checked(segments))
}

/// Removes the stored interval whose bounds equal `range` exactly.
pub fn remove(
    document: &HighlightDocument,
    selections: &SelectionSet,
    range: LogicalRange,
) -> Result<SelectionSet, HighlightError> {
    let (lo, hi) = (range.lo(), range.hi());
    if !range.is_single_segment() {
        return Err(HighlightError::CrossSegmentRemoval {
            from: lo.segment,
            to: hi.segment,
        });
    }
    document.check_position(lo)?;
    document.check_position(hi)?;
    ensure_aligned(document, selections)?;

    let target = Interval::new(lo.offset, hi.offset);
    let updated = selections
        .segment(lo.segment)
        .and_then(|intervals| intervals.without(target))
        .ok_or(HighlightError::InvalidRemoval {
            segment: lo.segment,
            interval: target,
        })?;

    let mut segments = selections.segments().to_vec();
    segments[lo.segment] = updated;
    Ok(SelectionSet::from_checked(segments))
}

fn ensure_aligned(
    document: &HighlightDocument,
    selections: &SelectionSet,
) -> Result<(), HighlightError> {
    if selections.segment_count() == document.segment_count() {
        Ok(())
    } else {
        Err(HighlightError::InvalidSelectionSet(format!(
            "{} interval lists for {} segments",
            selections.segment_count(),
            document.segment_count()
        )))
    }
}
