use std::ops::Deref;

use ratatui::layout::Rect;

use crate::editor::{
    HighlightEditor, HighlightError, LogicalRange, SelectionGesture, map_range,
};
use crate::render::{LayoutPoint, RenderResult, RunExtent, ScreenLayout, render_document};
use crate::theme::Theme;

/// HighlightDisplay wraps a HighlightEditor together with the layout of the last
/// render, and turns screen coordinates into gestures for the editor.
#[derive(Debug)]
pub struct HighlightDisplay {
    editor: HighlightEditor,
    layout: ScreenLayout,
    last_view_height: usize,
    last_total_lines: usize,
    last_text_area: Rect,
}

impl HighlightDisplay {
    pub fn new(editor: HighlightEditor) -> Self {
        Self {
            editor,
            layout: ScreenLayout::default(),
            last_view_height: 1,
            last_total_lines: 0,
            last_text_area: Rect::default(),
        }
    }

    pub fn editor_mut(&mut self) -> &mut HighlightEditor {
        &mut self.editor
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    /// Render the document at the given width and keep the resulting layout for
    /// mouse lookups. `drag` is the uncommitted selection, if any.
    pub fn render_document(
        &mut self,
        wrap_width: usize,
        left_padding: usize,
        theme: &Theme,
        drag: Option<(LayoutPoint, LayoutPoint)>,
    ) -> RenderResult {
        let pending = drag.and_then(|(anchor, focus)| self.drag_range(anchor, focus));
        let (result, layout) = render_document(
            self.editor.document(),
            self.editor.selections(),
            wrap_width,
            left_padding,
            theme,
            pending,
        );
        self.layout = layout;
        result
    }

    /// Update tracking state after rendering (called from draw)
    pub fn update_after_render(&mut self, text_area: Rect, total_lines: usize) {
        self.last_text_area = text_area;
        self.last_total_lines = total_lines;
        self.last_view_height = (text_area.height as usize).max(1);
    }

    pub fn page_jump_distance(&self) -> usize {
        self.last_view_height.saturating_sub(1).max(1)
    }

    pub fn max_scroll(&self) -> usize {
        self.last_total_lines.saturating_sub(self.last_view_height)
    }

    /// Convert mouse coordinates to a layout point. Rows below the last rendered line
    /// map onto that line.
    pub fn point_from_mouse(&self, column: u16, row: u16, scroll_top: usize) -> Option<LayoutPoint> {
        let line_count = self.layout.lines().len();
        if line_count == 0 {
            return None;
        }
        let area = self.last_text_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let max_x = area.x.saturating_add(area.width);
        let max_y = area.y.saturating_add(area.height);
        if column < area.x || column >= max_x || row < area.y || row >= max_y {
            return None;
        }
        let line = scroll_top
            .saturating_add((row - area.y) as usize)
            .min(line_count - 1);
        Some(LayoutPoint::new(line, column - area.x))
    }

    /// Screen endpoints of a drag, widened so the char under the later endpoint is
    /// part of the selection.
    pub fn drag_locators(
        &self,
        anchor: LayoutPoint,
        focus: LayoutPoint,
    ) -> (LayoutPoint, LayoutPoint) {
        if anchor <= focus {
            (anchor, self.layout.point_after(focus))
        } else {
            (self.layout.point_after(anchor), focus)
        }
    }

    /// The logical range a drag would insert, or `None` when an endpoint does not
    /// resolve.
    pub fn drag_range(&self, anchor: LayoutPoint, focus: LayoutPoint) -> Option<LogicalRange> {
        let (anchor, focus) = self.drag_locators(anchor, focus);
        map_range(self.editor.document(), &self.layout, &anchor, &focus).ok()
    }

    pub fn run_at(&self, point: LayoutPoint) -> Option<RunExtent> {
        self.layout.run_at(point)
    }

    /// Commits a drag as an insertion gesture.
    pub fn commit_drag(
        &mut self,
        anchor: LayoutPoint,
        focus: LayoutPoint,
    ) -> Result<bool, HighlightError> {
        let (anchor, focus) = self.drag_locators(anchor, focus);
        self.editor
            .apply_gesture(&self.layout, &SelectionGesture::Drag { anchor, focus })
    }

    /// Removes the highlighted run under `point`. Returns `Ok(false)` when the point is
    /// not on a highlight.
    pub fn activate_run(&mut self, point: LayoutPoint) -> Result<bool, HighlightError> {
        let Some(run) = self.layout.run_at(point) else {
            return Ok(false);
        };
        self.editor.apply_gesture(
            &self.layout,
            &SelectionGesture::ActivateRun {
                locator: run.start,
                run_length: run.len,
            },
        )
    }
}

impl Deref for HighlightDisplay {
    type Target = HighlightEditor;

    fn deref(&self) -> &Self::Target {
        &self.editor
    }
}
