//! TOML sidecar that stores a document's selection set between sessions.

use std::{
    cell::{Cell, RefCell},
    ffi::OsString,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::editor::{HighlightDocument, SelectionSet};

const FORMAT_VERSION: u32 = 2;
const SIDECAR_SUFFIX: &str = ".highlights.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightsFile {
    pub version: u32,
    /// `segment_fingerprint` of every segment of the document the highlights were
    /// made on.
    pub fingerprints: Vec<u32>,
    /// One list of `[start, end]` pairs per segment.
    pub segments: SelectionSet,
}

impl HighlightsFile {
    pub fn new(document: &HighlightDocument, selections: &SelectionSet) -> Self {
        Self {
            version: FORMAT_VERSION,
            fingerprints: fingerprints(document),
            segments: selections.clone(),
        }
    }

    /// Reads the sidecar at `path`. A missing file yields `None`; a file that does not
    /// fit `document` is an error.
    pub fn load(path: &Path, document: &HighlightDocument) -> Result<Option<SelectionSet>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read highlights {}", path.display()));
            }
        };
        let file = Self::parse(&contents, document)
            .with_context(|| format!("Failed to load highlights {}", path.display()))?;
        debug!(
            path = %path.display(),
            intervals = file.segments.interval_count(),
            "loaded highlights"
        );
        Ok(Some(file.segments))
    }

    pub fn parse(contents: &str, document: &HighlightDocument) -> Result<Self> {
        let file: Self = toml::from_str(contents)?;
        if file.version != FORMAT_VERSION {
            bail!("unsupported highlights version {}", file.version);
        }
        let expected = fingerprints(document);
        if file.fingerprints.len() != expected.len() {
            bail!(
                "highlights were made for {} segments, document has {}",
                file.fingerprints.len(),
                expected.len()
            );
        }
        if let Some(segment) = file
            .fingerprints
            .iter()
            .zip(&expected)
            .position(|(stored, actual)| stored != actual)
        {
            bail!("segment {segment} changed since the highlights were saved");
        }
        file.segments.validate(document)?;
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let encoded = toml::to_string(self).context("Failed to encode highlights")?;
        fs::write(path, encoded)
            .with_context(|| format!("Failed to write highlights {}", path.display()))?;
        debug!(path = %path.display(), "saved highlights");
        Ok(())
    }
}

/// First four bytes of the SHA-256 of `text`, little endian.
pub fn segment_fingerprint(text: &str) -> u32 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&digest[..4]);
    u32::from_le_bytes(bytes)
}

fn fingerprints(document: &HighlightDocument) -> Vec<u32> {
    document
        .segments()
        .map(|(_, text)| segment_fingerprint(text))
        .collect()
}

/// Remembers the selection set as last loaded or saved. The editor observer compares
/// every new set against it, so an operation that leaves the set as saved keeps the
/// document clean.
#[derive(Clone, Debug)]
pub struct SaveTracker {
    saved: Rc<RefCell<SelectionSet>>,
    dirty: Rc<Cell<bool>>,
}

impl SaveTracker {
    pub fn new(saved: &SelectionSet) -> Self {
        Self {
            saved: Rc::new(RefCell::new(saved.clone())),
            dirty: Rc::new(Cell::new(false)),
        }
    }

    /// Observer to hand to `HighlightEditor::set_observer`.
    pub fn observer(&self) -> impl FnMut(&SelectionSet) + 'static {
        let tracker = self.clone();
        move |current| tracker.observe(current)
    }

    pub fn observe(&self, current: &SelectionSet) {
        self.dirty.set(*self.saved.borrow() != *current);
    }

    pub fn mark_saved(&self, current: &SelectionSet) {
        *self.saved.borrow_mut() = current.clone();
        self.dirty.set(false);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }
}

/// `notes.md` keeps its highlights in `notes.md.highlights.toml`.
pub fn sidecar_path(document_path: &Path) -> PathBuf {
    let mut name = OsString::from(document_path.as_os_str());
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}
