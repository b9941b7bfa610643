use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::DiscoveryError;

pub const OVERVIEW_SUMMARY: &str = "overview-summary.html";
pub const INDEX_ALL: &str = "index-all.html";
pub const INDEX_FILES_DIR: &str = "index-files";

static INDEX_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^index-(\d+)\.html$").unwrap());

/// The directory treated as the Javadoc root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoot {
    pub root: PathBuf,
    /// `overview-summary.html` sits directly in the directory the user gave.
    pub overview_at_input: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexLayout {
    /// A single `index-all.html`.
    Combined,
    /// One `index-files/index-N.html` per letter.
    Partitioned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPlan {
    pub layout: IndexLayout,
    /// Index pages relative to the API root, in processing order.
    pub seeds: Vec<PathBuf>,
    /// Page the docset opens on, relative to the API root.
    pub entry_page: String,
}

/// Find the effective API root: the input itself when it holds
/// `overview-summary.html`, otherwise the first directory below it that does.
pub fn locate_api_root(input: &Path) -> Result<ApiRoot, DiscoveryError> {
    if !input.is_dir() {
        return Err(DiscoveryError::NotADirectory(input.to_path_buf()));
    }
    if input.join(OVERVIEW_SUMMARY).is_file() {
        return Ok(ApiRoot {
            root: input.to_path_buf(),
            overview_at_input: true,
        });
    }

    let nested = WalkDir::new(input)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == OVERVIEW_SUMMARY);

    match nested.and_then(|e| e.path().parent().map(Path::to_path_buf)) {
        Some(root) => {
            info!("Found {} in {:?}, using it as API root", OVERVIEW_SUMMARY, root);
            Ok(ApiRoot {
                root,
                overview_at_input: false,
            })
        }
        None => {
            warn!("No {} found under {:?}", OVERVIEW_SUMMARY, input);
            Ok(ApiRoot {
                root: input.to_path_buf(),
                overview_at_input: false,
            })
        }
    }
}

/// Choose the index pages to process and the docset's default page.
pub fn plan_indexing(api: &ApiRoot) -> Result<IndexPlan, DiscoveryError> {
    let (layout, seeds) = if api.root.join(INDEX_ALL).is_file() {
        (IndexLayout::Combined, vec![PathBuf::from(INDEX_ALL)])
    } else {
        let seeds = partitioned_seeds(&api.root);
        if seeds.is_empty() {
            return Err(DiscoveryError::NoIndexFiles(api.root.clone()));
        }
        (IndexLayout::Partitioned, seeds)
    };

    let entry_page = if api.overview_at_input {
        OVERVIEW_SUMMARY.to_string()
    } else {
        to_url_path(&seeds[0])
    };

    Ok(IndexPlan {
        layout,
        seeds,
        entry_page,
    })
}

/// `index-files/index-N.html`, ordered by N.
fn partitioned_seeds(root: &Path) -> Vec<PathBuf> {
    let dir = root.join(INDEX_FILES_DIR);
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut found: Vec<(u64, PathBuf)> = WalkDir::new(&dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let n = INDEX_PAGE_RE
                .captures(e.file_name().to_str()?)?
                .get(1)?
                .as_str()
                .parse::<u64>()
                .ok()?;
            let rel = e.path().strip_prefix(root).ok()?.to_path_buf();
            Some((n, rel))
        })
        .collect();
    found.sort_by_key(|(n, _)| *n);
    found.into_iter().map(|(_, p)| p).collect()
}

fn to_url_path(p: &Path) -> String {
    p.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
