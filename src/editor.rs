use std::fmt;

use tracing::{debug, warn};

mod document;
mod error;
mod intervals;
mod mapper;
mod merge;
mod position;
mod project;

pub use document::HighlightDocument;
pub use error::{HighlightError, PositionFault};
pub use intervals::{SegmentIntervals, SelectionSet};
pub use mapper::{PositionResolver, SelectionGesture, map_activated_run, map_range};
pub use merge::{insert, remove};
pub use position::{Interval, LogicalPosition, LogicalRange, SegmentIndex};
pub use project::{Run, project};

type ChangeObserver = Box<dyn FnMut(&SelectionSet)>;

/// Owns a document and its current selection set and applies one gesture at a time.
///
/// Every successful insert or remove replaces the selection set and hands the new one
/// to the registered observer. A failed operation leaves everything as it was.
pub struct HighlightEditor {
    document: HighlightDocument,
    selections: SelectionSet,
    observer: Option<ChangeObserver>,
}

impl HighlightEditor {
    pub fn new(document: HighlightDocument) -> Self {
        let selections = SelectionSet::empty(&document);
        Self {
            document,
            selections,
            observer: None,
        }
    }

    /// Starts from a pre-seeded selection set, e.g. one restored from disk.
    pub fn with_selections(
        document: HighlightDocument,
        selections: SelectionSet,
    ) -> Result<Self, HighlightError> {
        selections.validate(&document)?;
        Ok(Self {
            document,
            selections,
            observer: None,
        })
    }

    /// Registers the `on_selection_set_changed` callback, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl FnMut(&SelectionSet) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn document(&self) -> &HighlightDocument {
        &self.document
    }

    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    /// Projects one segment into runs for rendering.
    pub fn runs(&self, segment: SegmentIndex) -> Option<Vec<Run<'_>>> {
        let text = self.document.segment_text(segment)?;
        let intervals = self.selections.segment(segment)?;
        Some(project(text, intervals))
    }

    /// Text of the first stored highlight overlapping `range`.
    pub fn highlighted_text_in(&self, range: LogicalRange) -> Option<String> {
        let (segment, interval) = self.selections.intervals().find(|&(segment, interval)| {
            LogicalPosition::new(segment, interval.start) < range.hi()
                && range.lo() < LogicalPosition::new(segment, interval.end)
        })?;
        let text = self.document.segment_text(segment)?;
        Some(
            text.chars()
                .skip(interval.start)
                .take(interval.len())
                .collect(),
        )
    }

    /// Returns whether the selection set changed.
    pub fn insert_range(&mut self, range: LogicalRange) -> Result<bool, HighlightError> {
        let next = insert(&self.document, &self.selections, range).inspect_err(|err| {
            warn!(%range, error = %err, "rejected highlight insertion");
        })?;
        debug!(%range, "inserted highlight");
        Ok(self.commit(next))
    }

    /// Returns whether the selection set changed, which is always the case on success.
    pub fn remove_range(&mut self, range: LogicalRange) -> Result<bool, HighlightError> {
        let next = remove(&self.document, &self.selections, range).inspect_err(|err| {
            warn!(%range, error = %err, "rejected highlight removal");
        })?;
        debug!(%range, "removed highlight");
        Ok(self.commit(next))
    }

    /// Maps a committed gesture through `resolver` and applies it. A drag that
    /// collapses to a single point is ignored.
    pub fn apply_gesture<R: PositionResolver>(
        &mut self,
        resolver: &R,
        gesture: &SelectionGesture<R::Locator>,
    ) -> Result<bool, HighlightError> {
        match gesture {
            SelectionGesture::Drag { anchor, focus } => {
                let range = map_range(&self.document, resolver, anchor, focus)
                    .inspect_err(|err| warn!(error = %err, "could not map drag selection"))?;
                if range.is_empty() {
                    return Ok(false);
                }
                self.insert_range(range)
            }
            SelectionGesture::ActivateRun {
                locator,
                run_length,
            } => {
                let range = map_activated_run(&self.document, resolver, locator, *run_length)
                    .inspect_err(|err| warn!(error = %err, "could not map activated run"))?;
                self.remove_range(range)
            }
        }
    }

    fn commit(&mut self, next: SelectionSet) -> bool {
        let changed = next != self.selections;
        self.selections = next;
        debug!(
            intervals = self.selections.interval_count(),
            changed, "selection set replaced"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.selections);
        }
        changed
    }
}

impl fmt::Debug for HighlightEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightEditor")
            .field("document", &self.document)
            .field("selections", &self.selections)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;

#[cfg(test)]
#[path = "editor/intervals_tests.rs"]
mod intervals_tests;



#[cfg(test)]
#[path = "editor/document_tests.rs"]
mod document_tests;
