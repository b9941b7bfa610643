use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Resolve an anchor `href` found in `document` and express it relative to
/// `root`, with `/` separators and the fragment kept.
pub fn resolve_href(document: &Path, href: &str, root: &Path) -> String {
    if SCHEME_RE.is_match(href) {
        return href.to_string();
    }
    let (file, fragment) = match href.split_once('#') {
        Some((file, frag)) => (file, Some(frag)),
        None => (href, None),
    };

    let target = if file.is_empty() {
        document.to_path_buf()
    } else {
        document.parent().unwrap_or(Path::new("")).join(file)
    };
    let mut rel = relative_to(&normalize(&target), &normalize(root));
    if let Some(frag) = fragment {
        rel.push('#');
        rel.push_str(frag);
    }
    rel
}

/// Lexically collapse `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out.iter().collect()
}

fn relative_to(path: &Path, base: &Path) -> String {
    let path: Vec<Component> = path.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(base[common..].iter().map(|_| "..".to_string()));
    parts.extend(
        path[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
