pub mod classify;
pub mod definitions;
pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scraper::Html;
use tracing::warn;

use crate::db::IndexEntry;

/// One queued index page, read once.
pub struct DocumentationPage {
    pub path: PathBuf,
    pub markup: String,
}

impl DocumentationPage {
    /// Old Javadoc output is often Latin-1, so bytes are decoded lossily.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(DocumentationPage {
            path: path.to_path_buf(),
            markup: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

pub struct Extraction {
    pub entries: Vec<IndexEntry>,
    pub unclassified: usize,
}

/// Anchors → definition sites → classified entries with root-relative paths.
pub fn extract_entries(page: &DocumentationPage, documents_root: &Path) -> Extraction {
    let html = Html::parse_document(&page.markup);
    let mut entries = Vec::new();
    let mut unclassified = 0;

    for site in definitions::definition_sites(&html) {
        let Some(href) = site.href() else {
            continue;
        };
        let name = site.name();
        let text = site.term_text();
        let class = site.term_class();

        let Some(kind) = classify::classify(&text, class) else {
            warn!(
                symbol = %name,
                text = %text.trim(),
                class = %class,
                "Could not determine type, entry skipped"
            );
            unclassified += 1;
            continue;
        };

        let path = paths::resolve_href(&page.path, href, documents_root);
        entries.push(IndexEntry::new(&name, kind, path));
    }

    Extraction {
        entries,
        unclassified,
    }
}

// ── Tests ──
