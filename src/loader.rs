use std::{fs, io::Cursor, path::Path};

use anyhow::{Context, Result, anyhow};
use tdoc::markdown;
use tracing::debug;

use crate::editor::HighlightDocument;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Ftml,
    Markdown,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("ftml") => DocumentFormat::Ftml,
            Some("md") | Some("markdown") | Some("mkd") | Some("mdown") | Some("mdtxt") => {
                DocumentFormat::Markdown
            }
            _ => DocumentFormat::PlainText,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Ftml => "FTML",
            DocumentFormat::Markdown => "Markdown",
            DocumentFormat::PlainText => "Text",
        }
    }
}

pub fn load_document(path: &Path) -> Result<(HighlightDocument, DocumentFormat)> {
    let format = DocumentFormat::from_path(path);
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document = parse_document(&content, format)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(
        path = %path.display(),
        format = format.label(),
        segments = document.segment_count(),
        "loaded document"
    );
    Ok((document, format))
}

pub fn parse_document(content: &str, format: DocumentFormat) -> Result<HighlightDocument> {
    match format {
        DocumentFormat::Ftml => {
            let parsed = tdoc::parse(Cursor::new(content)).map_err(|err| anyhow!("{err}"))?;
            Ok(HighlightDocument::from_tdoc(&parsed))
        }
        DocumentFormat::Markdown => {
            let parsed = markdown::parse(Cursor::new(content)).map_err(|err| anyhow!("{err}"))?;
            Ok(HighlightDocument::from_tdoc(&parsed))
        }
        DocumentFormat::PlainText => Ok(HighlightDocument::from_plain_text(content)),
    }
}
