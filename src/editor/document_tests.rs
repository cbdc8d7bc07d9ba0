use tdoc::{ChecklistItem, Document, InlineStyle, Paragraph, ParagraphType, Span};

use super::*;

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new_text().with_content(vec![Span::new_text(text)])
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new(ParagraphType::Header1).with_content(vec![Span::new_text(text)])
}

#[test]
fn segments_are_title_then_paragraphs() {
    let document = HighlightDocument::new(
        "Title",
        vec!["First".to_string(), "Second one".to_string()],
    );
    assert_eq!(document.segment_count(), 3);
    assert_eq!(document.title(), "Title");
    assert_eq!(document.paragraphs().len(), 2);
    assert_eq!(document.segment_text(2), Some("Second one"));
    assert_eq!(document.segment_len(2), Some(10));
    assert_eq!(document.segment_len(3), None);
    assert_eq!(document.segment_end(1), Some(LogicalPosition::new(1, 5)));
}

#[test]
fn segment_lengths_count_chars() {
    let document = HighlightDocument::new("Über", vec!["日本語".to_string()]);
    assert_eq!(document.segment_lengths(), &[4, 3]);
    assert!(document.check_position(LogicalPosition::new(1, 3)).is_ok());
    assert!(document.check_position(LogicalPosition::new(1, 4)).is_err());
}

#[test]
fn from_tdoc_uses_leading_heading_as_title() {
    let mut bold = Span::new_styled(InlineStyle::Bold).with_text("bold");
    bold.children = vec![Span::new_text(" words")];
    let paragraph = Paragraph::new_text().with_content(vec![Span::new_text("Some "), bold]);

    let document = Document::new().with_paragraphs(vec![heading("Headline"), paragraph]);
    let converted = HighlightDocument::from_tdoc(&document);

    assert_eq!(converted.title(), "Headline");
    assert_eq!(converted.paragraphs(), &["Some bold words".to_string()]);
}

#[test]
fn from_tdoc_without_heading_has_empty_title() {
    let document = Document::new().with_paragraphs(vec![
        text_paragraph("one"),
        text_paragraph("   "),
        text_paragraph("two"),
    ]);
    let converted = HighlightDocument::from_tdoc(&document);

    assert_eq!(converted.title(), "");
    assert_eq!(converted.paragraphs(), &["one".to_string(), "two".to_string()]);
    assert_eq!(converted.segment_count(), 3);
}

#[test]
fn from_tdoc_flattens_lists_and_checklists() {
    let list = Paragraph::new_unordered_list().with_entries(vec![
        vec![text_paragraph("alpha")],
        vec![text_paragraph("beta")],
    ]);
    let checklist = Paragraph::new_checklist().with_checklist_items(vec![
        ChecklistItem::new(false).with_content(vec![Span::new_text("todo")]),
    ]);
    let document =
        Document::new().with_paragraphs(vec![heading("List"), list, checklist]);
    let converted = HighlightDocument::from_tdoc(&document);

    assert_eq!(
        converted.paragraphs(),
        &[
            "alpha".to_string(),
            "beta".to_string(),
            "todo".to_string()
        ]
    );
}

#[test]
fn from_plain_text_splits_on_blank_lines() {
    let text = "\n  A Title  \n\nfirst line\nsecond line\n\n\nanother paragraph\n";
    let document = HighlightDocument::from_plain_text(text);

    assert_eq!(document.title(), "A Title");
    assert_eq!(
        document.paragraphs(),
        &[
            "first line second line".to_string(),
            "another paragraph".to_string()
        ]
    );
}

#[test]
fn from_plain_text_of_empty_input() {
    let document = HighlightDocument::from_plain_text("");
    assert_eq!(document.segment_count(), 1);
    assert_eq!(document.segment_len(0), Some(0));
}
