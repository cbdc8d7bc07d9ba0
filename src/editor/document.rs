use tdoc::{ChecklistItem, Document, Paragraph, ParagraphType, Span};

use super::{HighlightError, LogicalPosition, PositionFault, SegmentIndex};

/// The text being annotated: a title followed by paragraphs. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightDocument {
    segments: Vec<String>,
    lengths: Vec<usize>,
}

impl HighlightDocument {
    pub fn new(title: impl Into<String>, paragraphs: Vec<String>) -> Self {
        let mut segments = Vec::with_capacity(paragraphs.len() + 1);
        segments.push(title.into());
        segments.extend(paragraphs);
        let lengths = segments.iter().map(|text| text.chars().count()).collect();
        Self { segments, lengths }
    }

    pub fn title(&self) -> &str {
        &self.segments[0]
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.segments[1..]
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment_text(&self, segment: SegmentIndex) -> Option<&str> {
        self.segments.get(segment).map(String::as_str)
    }

    pub fn segment_len(&self, segment: SegmentIndex) -> Option<usize> {
        self.lengths.get(segment).copied()
    }

    pub fn segment_lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentIndex, &str)> {
        self.segments.iter().map(String::as_str).enumerate()
    }

    /// Position just past the last char of a segment.
    pub fn segment_end(&self, segment: SegmentIndex) -> Option<LogicalPosition> {
        self.segment_len(segment)
            .map(|len| LogicalPosition::new(segment, len))
    }

    pub fn check_position(&self, position: LogicalPosition) -> Result<(), HighlightError> {
        let Some(len) = self.segment_len(position.segment) else {
            return Err(PositionFault::UnknownSegment {
                segment: position.segment,
                segment_count: self.segment_count(),
            }
            .into());
        };
        if position.offset > len {
            return Err(PositionFault::OffsetOutOfRange {
                segment: position.segment,
                offset: position.offset,
                len,
            }
            .into());
        }
        Ok(())
    }

    /// Flattens a structured document. A leading heading becomes the title; every other
    /// paragraph with text becomes one segment, nested lists and quotes included.
    pub fn from_tdoc(document: &Document) -> Self {
        let mut body = document.paragraphs.as_slice();
        let mut title = String::new();
        if let Some((first, rest)) = body.split_first()
            && is_heading(first.paragraph_type())
        {
            title = spans_text(first.content());
            body = rest;
        }

        let mut paragraphs = Vec::new();
        for paragraph in body {
            collect_paragraph_text(paragraph, &mut paragraphs);
        }

        Self::new(title, paragraphs)
    }

    /// First non-blank line is the title; blank lines separate paragraphs and the lines
    /// of one paragraph are joined with single spaces.
    pub fn from_plain_text(text: &str) -> Self {
        let mut lines = text.lines().skip_while(|line| line.trim().is_empty());
        let title = lines.next().map(|line| line.trim().to_string()).unwrap_or_default();

        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(trimmed);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        Self::new(title, paragraphs)
    }
}

fn is_heading(paragraph_type: ParagraphType) -> bool {
    matches!(
        paragraph_type,
        ParagraphType::Header1 | ParagraphType::Header2 | ParagraphType::Header3
    )
}

fn collect_paragraph_text(paragraph: &Paragraph, out: &mut Vec<String>) {
    push_non_empty(spans_text(paragraph.content()), out);
    for child in paragraph.children() {
        collect_paragraph_text(child, out);
    }
    for entry in paragraph.entries() {
        for nested in entry {
            collect_paragraph_text(nested, out);
        }
    }
    for item in paragraph.checklist_items() {
        collect_checklist_item_text(item, out);
    }
}

fn collect_checklist_item_text(item: &ChecklistItem, out: &mut Vec<String>) {
    push_non_empty(spans_text(&item.content), out);
    for nested in &item.children {
        collect_checklist_item_text(nested, out);
    }
}

fn push_non_empty(text: String, out: &mut Vec<String>) {
    if !text.trim().is_empty() {
        out.push(text);
    }
}

fn spans_text(spans: &[Span]) -> String {
    let mut text = String::new();
    for span in spans {
        append_span_text(span, &mut text);
    }
    text
}

fn append_span_text(span: &Span, out: &mut String) {
    out.push_str(&span.text);
    for child in &span.children {
        append_span_text(child, out);
    }
}
