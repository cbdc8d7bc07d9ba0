use super::{HighlightDocument, HighlightError, LogicalPosition, LogicalRange, PositionFault};

/// The presentation layer's locator service: turns a view level locator into the
/// logical position it stands for.
pub trait PositionResolver {
    type Locator;

    fn resolve_position(&self, locator: &Self::Locator) -> Option<LogicalPosition>;
}

/// A completed user gesture, as reported by the view once the user lets go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionGesture<L> {
    /// Drag selection between two locators; requests an insertion.
    Drag { anchor: L, focus: L },
    /// Click on an already highlighted run; requests its removal. `locator` points at
    /// the first char of the run.
    ActivateRun { locator: L, run_length: usize },
}

/// Resolves both endpoints of a drag and puts them in document order.
pub fn map_range<R: PositionResolver>(
    document: &HighlightDocument,
    resolver: &R,
    anchor: &R::Locator,
    focus: &R::Locator,
) -> Result<LogicalRange, HighlightError> {
    let anchor = resolve_checked(document, resolver, anchor)?;
    let focus = resolve_checked(document, resolver, focus)?;
    Ok(LogicalRange::new(anchor, focus))
}

/// Resolves the start of an activated run and extends it by `run_length` chars within
/// the same segment.
pub fn map_activated_run<R: PositionResolver>(
    document: &HighlightDocument,
    resolver: &R,
    locator: &R::Locator,
    run_length: usize,
) -> Result<LogicalRange, HighlightError> {
    let lo = resolve_checked(document, resolver, locator)?;
    let hi = LogicalPosition::new(lo.segment, lo.offset.saturating_add(run_length));
    document.check_position(hi)?;
    Ok(LogicalRange::new(lo, hi))
}

fn resolve_checked<R: PositionResolver>(
    document: &HighlightDocument,
    resolver: &R,
    locator: &R::Locator,
) -> Result<LogicalPosition, HighlightError> {
    let position = resolver
        .resolve_position(locator)
        .ok_or(PositionFault::Unresolved)?;
    document.check_position(position)?;
    Ok(position)
}
