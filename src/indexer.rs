use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::db::{EntryKind, IndexEntry, IndexStore};
use crate::parser::{self, DocumentationPage};

/// (name, kind, path without fragment)
type DedupKey = (String, EntryKind, String);

/// State carried across every document of one run.
pub struct RunContext {
    documents_root: PathBuf,
    current: Option<PathBuf>,
    seen: HashSet<DedupKey>,
}

impl RunContext {
    pub fn new(documents_root: &Path) -> Self {
        RunContext {
            documents_root: documents_root.to_path_buf(),
            current: None,
            seen: HashSet::new(),
        }
    }

    /// True the first time an entry's key is seen in this run.
    pub fn admit(&mut self, entry: &IndexEntry) -> bool {
        self.seen.insert((
            entry.name.clone(),
            entry.kind,
            entry.path_without_fragment().to_string(),
        ))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub entries: usize,
    pub duplicates: usize,
    pub unclassified: usize,
}

pub struct Indexer {
    store: IndexStore,
    ctx: RunContext,
    stats: IndexStats,
    progress: bool,
}

impl Indexer {
    pub fn new(store: IndexStore, documents_root: &Path) -> Self {
        Indexer {
            store,
            ctx: RunContext::new(documents_root),
            stats: IndexStats::default(),
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Process the queue front to back, then finalize the store. The first
    /// unreadable document aborts the run.
    pub fn run(mut self, mut queue: VecDeque<PathBuf>) -> Result<IndexStats> {
        let pb = if self.progress {
            let pb = ProgressBar::new(queue.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
                    .progress_chars("=> "),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        while let Some(path) = queue.pop_front() {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(file_name.clone());
            info!("Indexing {}...", file_name);
            self.index_document(&path)?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        self.ctx.current = None;
        let rows = self.store.count()?;
        self.stats.duplicates += self.store.duplicates();
        debug!(rows, "Finalizing index");
        self.store.finalize()?;
        Ok(self.stats)
    }

    fn index_document(&mut self, path: &Path) -> Result<()> {
        self.ctx.current = Some(path.to_path_buf());
        let page = DocumentationPage::read(path)?;
        let extraction = parser::extract_entries(&page, &self.ctx.documents_root);

        let mut added = 0;
        for entry in extraction.entries {
            if !self.ctx.admit(&entry) {
                self.stats.duplicates += 1;
                continue;
            }
            self.store.insert(entry)?;
            added += 1;
        }

        debug!(
            document = ?self.ctx.current,
            added,
            unclassified = extraction.unclassified,
            "Document indexed"
        );
        self.stats.documents += 1;
        self.stats.entries += added;
        self.stats.unclassified += extraction.unclassified;
        Ok(())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::fs;

    use rusqlite::Connection;

    use super::*;

    struct Run {
        _dir: tempfile::TempDir,
        docs: PathBuf,
        index: PathBuf,
    }

    fn setup(pages: &[(&str, &str)]) -> Run {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("Documents");
        for (rel, markup) in pages {
            let p = docs.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, markup).unwrap();
        }
        let index = dir.path().join("docSet.dsidx");
        Run {
            _dir: dir,
            docs,
            index,
        }
    }

    fn run(r: &Run, queue: &[&str]) -> Result<IndexStats> {
        let store = IndexStore::create(&r.index, 2).unwrap();
        let queue = queue.iter().map(|q| r.docs.join(q)).collect();
        Indexer::new(store, &r.docs).run(queue)
    }

    fn rows(r: &Run) -> Vec<(String, String, String)> {
        let conn = Connection::open(&r.index).unwrap();
        let mut stmt = conn
            .prepare("SELECT name, type, path FROM searchIndex ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        rows
    }

    fn row(name: &str, kind: &str, path: &str) -> (String, String, String) {
        (name.to_string(), kind.to_string(), path.to_string())
    }

    #[test]
    fn fragment_variants_are_duplicates() {
        let r = setup(&[(
            "index-all.html",
            r#"<dl>
            <dt><a href="Foo.html#bar">bar</a> - Method in Foo</dt>
            <dt><a href="Foo.html#baz">bar</a> - Method in Foo</dt>
            </dl>"#,
        )]);
        let stats = run(&r, &["index-all.html"]).unwrap();
        assert_eq!(rows(&r), vec![row("bar", "Method", "Foo.html#bar")]);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn dedup_spans_documents() {
        let page = r#"<dl><dt><a href="../Foo.html">Foo</a> - Class in pkg</dt></dl>"#;
        let r = setup(&[
            ("index-files/index-1.html", page),
            ("index-files/index-2.html", page),
        ]);
        let stats = run(&r, &["index-files/index-1.html", "index-files/index-2.html"]).unwrap();
        assert_eq!(rows(&r), vec![row("Foo", "Class", "Foo.html")]);
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn same_name_different_kind_kept() {
        let r = setup(&[(
            "index-all.html",
            r#"<dl>
            <dt><a href="Foo.html">Foo</a> - Class in pkg</dt>
            <dt><a href="Foo.html#Foo()">Foo</a> - Constructor for class pkg.Foo</dt>
            </dl>"#,
        )]);
        run(&r, &["index-all.html"]).unwrap();
        assert_eq!(
            rows(&r),
            vec![
                row("Foo", "Class", "Foo.html"),
                row("Foo", "Constructor", "Foo.html#Foo()"),
            ],
        );
    }

    #[test]
    fn queue_order_and_unclassified_counts() {
        let r = setup(&[
            (
                "index-files/index-1.html",
                r#"<dl><dt><a href="../A.html">A</a> - Interface in pkg</dt>
                <dt><a href="../A.html#x">See Also:</a></dt></dl>"#,
            ),
            (
                "index-files/index-2.html",
                r#"<dl><dt><a href="../B.html">B</a> - Enum in pkg</dt></dl>"#,
            ),
        ]);
        let stats = run(&r, &["index-files/index-2.html", "index-files/index-1.html"]).unwrap();
        assert_eq!(
            rows(&r),
            vec![row("B", "Enum", "B.html"), row("A", "Interface", "A.html")],
        );
        assert_eq!(stats.unclassified, 1);
    }

    #[test]
    fn missing_document_is_fatal() {
        let r = setup(&[]);
        assert!(run(&r, &["index-all.html"]).is_err());
    }

    #[test]
    fn admit_uses_truncated_name() {
        let mut ctx = RunContext::new(Path::new("/docs"));
        let long = "n".repeat(250);
        let a = IndexEntry::new(&long, EntryKind::Method, "A.html#1".into());
        let b = IndexEntry::new(&format!("{}zzz", long), EntryKind::Method, "A.html#2".into());
        assert!(ctx.admit(&a));
        assert!(!ctx.admit(&b));
    }
}
