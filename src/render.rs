use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::editor::{
    HighlightDocument, LogicalPosition, LogicalRange, PositionResolver, SegmentIndex,
    SegmentIntervals, SelectionSet, project,
};
use crate::theme::Theme;

const TAB_WIDTH: usize = 4;

/// A spot in the rendered document: line from the top of the document and display
/// column within that line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutPoint {
    pub line: usize,
    pub column: u16,
}

impl LayoutPoint {
    pub const fn new(line: usize, column: u16) -> Self {
        Self { line, column }
    }
}

/// Where a highlighted run starts on screen and how many chars it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunExtent {
    pub start: LayoutPoint,
    pub len: usize,
}

/// One rendered char: the columns it covers and the position just before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellTarget {
    pub column: u16,
    pub width: u16,
    pub position: LogicalPosition,
    pub run: Option<RunExtent>,
}

impl CellTarget {
    fn covers(&self, column: u16) -> bool {
        column >= self.column && column < self.column.saturating_add(self.width.max(1))
    }

    pub fn end_column(&self) -> u16 {
        self.column.saturating_add(self.width)
    }
}

/// Cells of one rendered line. `end` is the position right after the last char on the
/// line; decorative lines (blank separators, underlines) have none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineLayout {
    pub cells: Vec<CellTarget>,
    pub end: Option<LogicalPosition>,
}

impl LineLayout {
    /// The cell drawn at `column`. A zero-width glyph (combining mark, `\r`, line break)
    /// shares its column with the next visible char and only wins when nothing visible
    /// is there.
    pub fn cell_at(&self, column: u16) -> Option<&CellTarget> {
        let mut covering = self.cells.iter().filter(|cell| cell.covers(column));
        let first = covering.next()?;
        if first.width > 0 {
            return Some(first);
        }
        covering.find(|cell| cell.width > 0).or(Some(first))
    }

    fn position_at(&self, column: u16) -> Option<LogicalPosition> {
        self.cell_at(column)
            .or_else(|| self.cells.iter().find(|cell| column < cell.column))
            .map(|cell| cell.position)
            .or(self.end)
    }

    fn first_position(&self) -> Option<LogicalPosition> {
        self.cells.first().map(|cell| cell.position).or(self.end)
    }
}

/// Maps layout points back to document positions. This is the locator service the
/// selection mapper consumes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenLayout {
    lines: Vec<LineLayout>,
}

impl ScreenLayout {
    pub fn lines(&self) -> &[LineLayout] {
        &self.lines
    }

    pub fn line(&self, line: usize) -> Option<&LineLayout> {
        self.lines.get(line)
    }

    pub fn cell_at(&self, point: LayoutPoint) -> Option<&CellTarget> {
        self.lines.get(point.line)?.cell_at(point.column)
    }

    /// The highlighted run under `point`, if the point is on one.
    pub fn run_at(&self, point: LayoutPoint) -> Option<RunExtent> {
        self.cell_at(point)?.run
    }

    /// The layout point right after the char under `point`, so that a drag ending on a
    /// char includes it.
    pub fn point_after(&self, point: LayoutPoint) -> LayoutPoint {
        match self.cell_at(point) {
            Some(cell) => LayoutPoint::new(point.line, cell.end_column()),
            None => point,
        }
    }
}

impl PositionResolver for ScreenLayout {
    type Locator = LayoutPoint;

    /// Points on blank lines snap to the end of the closest text line above, or to the
    /// start of the first text line below when nothing is above.
    fn resolve_position(&self, point: &LayoutPoint) -> Option<LogicalPosition> {
        let line = self.lines.get(point.line)?;
        if let Some(position) = line.position_at(point.column) {
            return Some(position);
        }
        self.lines[..point.line]
            .iter()
            .rev()
            .find_map(|line| line.end)
            .or_else(|| {
                self.lines[point.line + 1..]
                    .iter()
                    .find_map(LineLayout::first_position)
            })
    }
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub total_lines: usize,
}

/// Lays out the title and paragraphs word-wrapped to `wrap_width`, highlighted runs in
/// the theme's highlight style and the in-progress drag (`pending`) in its selection
/// style. The returned layout maps every rendered line back to the document.
pub fn render_document(
    document: &HighlightDocument,
    selections: &SelectionSet,
    wrap_width: usize,
    left_padding: usize,
    theme: &Theme,
    pending: Option<LogicalRange>,
) -> (RenderResult, ScreenLayout) {
    let mut renderer = Renderer::new(wrap_width.max(1), left_padding, theme, pending);
    renderer.render_document(document, selections);
    renderer.finish()
}

struct RunInfo {
    len: usize,
    start: Option<LayoutPoint>,
}

struct Renderer<'a> {
    wrap_width: usize,
    prefix: String,
    theme: &'a Theme,
    pending: Option<LogicalRange>,
    lines: Vec<Line<'static>>,
    layout: Vec<LineLayout>,
    runs: Vec<RunInfo>,
}

impl<'a> Renderer<'a> {
    fn new(
        wrap_width: usize,
        left_padding: usize,
        theme: &'a Theme,
        pending: Option<LogicalRange>,
    ) -> Self {
        Self {
            wrap_width,
            prefix: " ".repeat(left_padding),
            theme,
            pending,
            lines: Vec::new(),
            layout: Vec::new(),
            runs: Vec::new(),
        }
    }

    fn render_document(&mut self, document: &HighlightDocument, selections: &SelectionSet) {
        for (segment, text) in document.segments() {
            if segment == 0 {
                self.render_title(text, selections);
            } else {
                self.push_decorative_line("");
                self.render_segment(segment, text, selections, Style::default());
            }
        }
    }

    fn render_title(&mut self, text: &str, selections: &SelectionSet) {
        let first_line = self.lines.len();
        self.render_segment(0, text, selections, Style::default().add_modifier(Modifier::BOLD));
        if text.trim().is_empty() {
            return;
        }

        let prefix_width = visible_width(&self.prefix);
        let width = self.lines[first_line..]
            .iter()
            .map(|line| line_width(line).saturating_sub(prefix_width))
            .max()
            .unwrap_or(0);
        let underline = format!("{}{}", self.prefix, underline_string(width, '='));
        self.push_decorative_line(&underline);
    }

    fn render_segment(
        &mut self,
        segment: SegmentIndex,
        text: &str,
        selections: &SelectionSet,
        base_style: Style,
    ) {
        let empty = SegmentIntervals::new();
        let intervals = selections.segment(segment).unwrap_or(&empty);

        let mut fragments = Vec::new();
        let mut offset = 0;
        for run in project(text, intervals) {
            let (style, run_id) = if run.highlighted {
                self.runs.push(RunInfo {
                    len: run.char_len(),
                    start: None,
                });
                (
                    base_style.patch(self.theme.highlight_style()),
                    Some(self.runs.len() - 1),
                )
            } else {
                (base_style, None)
            };
            let context = RunContext {
                segment,
                style,
                selected_style: style.patch(self.theme.selection_style()),
                run: run_id,
                pending: self.pending,
            };
            offset = tokenize_run(run.text, offset, &context, &mut fragments);
        }

        let lines = wrap_fragments(
            &fragments,
            &self.prefix,
            &self.prefix,
            self.wrap_width,
            LogicalPosition::new(segment, offset),
        );
        self.consume_lines(lines);
    }

    fn push_decorative_line(&mut self, content: &str) {
        let span = Span::raw(content.to_string());
        self.lines.push(Line::from(vec![span]));
        self.layout.push(LineLayout::default());
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            let line_index = self.lines.len();
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();

            let mut cells = Vec::with_capacity(output.glyphs.len());
            for glyph in output.glyphs {
                let run = glyph.run.and_then(|id| {
                    let info = self.runs.get_mut(id)?;
                    let start =
                        *info
                            .start
                            .get_or_insert(LayoutPoint::new(line_index, glyph.column));
                    Some(RunExtent {
                        start,
                        len: info.len,
                    })
                });
                cells.push(CellTarget {
                    column: glyph.column,
                    width: glyph.width,
                    position: glyph.position,
                    run,
                });
            }

            self.lines.push(Line::from(spans));
            self.layout.push(LineLayout {
                cells,
                end: output.end,
            });
        }
    }

    fn finish(mut self) -> (RenderResult, ScreenLayout) {
        if self.lines.is_empty() {
            self.push_decorative_line("");
        }
        let result = RenderResult {
            total_lines: self.lines.len(),
            lines: self.lines,
        };
        (result, ScreenLayout { lines: self.layout })
    }
}

struct RunContext {
    segment: SegmentIndex,
    style: Style,
    selected_style: Style,
    run: Option<usize>,
    pending: Option<LogicalRange>,
}

impl RunContext {
    fn style_at(&self, position: LogicalPosition) -> Style {
        if self
            .pending
            .is_some_and(|range| range.contains(position))
        {
            self.selected_style
        } else {
            self.style
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

struct LineOutput {
    spans: Vec<LineSegment>,
    glyphs: Vec<LocatedGlyph>,
    end: Option<LogicalPosition>,
}

#[derive(Clone, Copy)]
struct LocatedGlyph {
    column: u16,
    width: u16,
    position: LogicalPosition,
    run: Option<usize>,
}

#[derive(Clone, Copy)]
struct Glyph {
    offset: usize,
    width: usize,
    position: LogicalPosition,
    run: Option<usize>,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    glyphs: Vec<Glyph>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak {
        position: LogicalPosition,
        run: Option<usize>,
    },
}

/// Splits one run into word and whitespace tokens, tagging every char with its logical
/// position. Returns the offset following the run.
fn tokenize_run(
    text: &str,
    mut offset: usize,
    context: &RunContext,
    fragments: &mut Vec<FragmentItem>,
) -> usize {
    let mut builder: Option<TokenBuilder> = None;
    for ch in text.chars() {
        let position = LogicalPosition::new(context.segment, offset);
        offset += 1;

        if ch == '\n' {
            if let Some(token) = builder.take() {
                fragments.push(FragmentItem::Token(token.finish()));
            }
            fragments.push(FragmentItem::LineBreak {
                position,
                run: context.run,
            });
            continue;
        }

        let style = context.style_at(position);
        let is_whitespace = ch.is_whitespace();
        let continues = builder
            .as_ref()
            .is_some_and(|existing| existing.accepts(is_whitespace, style));
        if !continues {
            if let Some(existing) = builder.take() {
                fragments.push(FragmentItem::Token(existing.finish()));
            }
            builder = Some(TokenBuilder::new(style, is_whitespace));
        }
        if let Some(current) = builder.as_mut() {
            current.push_char(ch, position, context.run);
        }
    }

    if let Some(token) = builder {
        fragments.push(FragmentItem::Token(token.finish()));
    }
    offset
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    glyphs: Vec<Glyph>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            glyphs: Vec::new(),
        }
    }

    fn accepts(&self, is_whitespace: bool, style: Style) -> bool {
        self.style == style
            && matches!(
                (self.kind, is_whitespace),
                (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
            )
    }

    fn push_char(&mut self, ch: char, position: LogicalPosition, run: Option<usize>) {
        let width = if ch == '\t' {
            self.text.push_str(&" ".repeat(TAB_WIDTH));
            TAB_WIDTH
        } else if ch == '\r' {
            0
        } else {
            self.text.push(ch);
            UnicodeWidthChar::width(ch).unwrap_or(0)
        };
        self.glyphs.push(Glyph {
            offset: self.width,
            width,
            position,
            run,
        });
        self.width += width;
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            glyphs: self.glyphs,
        }
    }
}

/// Width of the word starting at `fragments[0]`, counting every directly adjacent word
/// token so a word that changes style midway still wraps as one.
fn joined_word_width(fragments: &[FragmentItem]) -> usize {
    fragments
        .iter()
        .map_while(|item| match item {
            FragmentItem::Token(token) if token.kind == FragmentKind::Word => Some(token.width),
            _ => None,
        })
        .sum()
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &str,
    continuation_prefix: &str,
    width: usize,
    segment_end: LogicalPosition,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();
    let mut inside_word = false;

    for (index, fragment) in fragments.iter().enumerate() {
        match fragment {
            FragmentItem::LineBreak { position, run } => {
                builder.consume_pending(&mut pending_whitespace);
                builder.push_break(*position, *run);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix);
                inside_word = false;
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                    inside_word = false;
                }
                FragmentKind::Word => {
                    if !inside_word {
                        let word_width = joined_word_width(&fragments[index..]);
                        let whitespace_width: usize =
                            pending_whitespace.iter().map(|item| item.width).sum();
                        if builder.width > builder.prefix_width
                            && builder.width + whitespace_width + word_width > width
                        {
                            builder.consume_pending(&mut pending_whitespace);
                            outputs.push(builder.build_line());
                            builder = LineBuilder::new(continuation_prefix);
                        }
                    }
                    builder.append_with_pending(token.clone(), &mut pending_whitespace);
                    inside_word = true;
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    builder.end = Some(segment_end);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    glyphs: Vec<LocatedGlyph>,
    width: usize,
    prefix_width: usize,
    end: Option<LogicalPosition>,
}

impl LineBuilder {
    fn new(prefix: &str) -> Self {
        let prefix_width = visible_width(prefix);
        let mut segments = Vec::new();
        if !prefix.is_empty() {
            segments.push(LineSegment {
                text: prefix.to_string(),
                style: Style::default(),
            });
        }
        Self {
            segments,
            glyphs: Vec::new(),
            width: prefix_width,
            prefix_width,
            end: None,
        }
    }

    fn append_with_pending(&mut self, token: Fragment, pending_whitespace: &mut Vec<Fragment>) {
        self.consume_pending(pending_whitespace);
        self.append_token(token);
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        let start_column = self.width;
        if !fragment.text.is_empty() {
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
            self.width += fragment.width;
        }

        for glyph in fragment.glyphs {
            self.glyphs.push(LocatedGlyph {
                column: to_column(start_column + glyph.offset),
                width: to_column(glyph.width),
                position: glyph.position,
                run: glyph.run,
            });
            self.end = Some(LogicalPosition::new(
                glyph.position.segment,
                glyph.position.offset + 1,
            ));
        }
    }

    /// A hard line break has no visible glyph but still owns the cell after the line.
    fn push_break(&mut self, position: LogicalPosition, run: Option<usize>) {
        self.glyphs.push(LocatedGlyph {
            column: to_column(self.width),
            width: 0,
            position,
            run,
        });
        self.end = Some(position);
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        LineOutput {
            spans: self.segments,
            glyphs: self.glyphs,
            end: self.end,
        }
    }
}

fn to_column(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| visible_width(span.content.as_ref()))
        .sum()
}

fn underline_string(width: usize, ch: char) -> String {
    std::iter::repeat_n(ch, width.max(1)).collect()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
