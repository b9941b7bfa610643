use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{info, warn};
use walkdir::WalkDir;

const PLIST_DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;
const DOCSET_FAMILY: &str = "java";

/// `<name>.docset/Contents/{Info.plist, Resources/{docSet.dsidx, Documents/}}`
pub struct DocsetLayout {
    root: PathBuf,
}

impl DocsetLayout {
    pub fn new(output_dir: &Path, name: &str) -> Self {
        DocsetLayout {
            root: output_dir.join(format!("{}.docset", name)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contents_dir(&self) -> PathBuf {
        self.root.join("Contents")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.contents_dir().join("Resources")
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.resources_dir().join("Documents")
    }

    pub fn index_path(&self) -> PathBuf {
        self.resources_dir().join("docSet.dsidx")
    }

    pub fn plist_path(&self) -> PathBuf {
        self.contents_dir().join("Info.plist")
    }

    /// Replace any previous bundle with an empty skeleton.
    pub fn create(&self) -> Result<()> {
        if self.root.exists() {
            info!("Removing existing {:?}", self.root);
            fs::remove_dir_all(&self.root)
                .with_context(|| format!("Failed to remove {:?}", self.root))?;
        }
        fs::create_dir_all(self.resources_dir())
            .with_context(|| format!("Failed to create {:?}", self.resources_dir()))?;
        Ok(())
    }
}

/// Counts from a tree copy. Failed files are logged and skipped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub failed: usize,
}

/// Recursively copy `src` into `dst`, which is created. Anything under `dst`
/// or `exclude` is skipped, so a bundle written inside `src` is not copied
/// into itself.
pub fn copy_tree(src: &Path, dst: &Path, exclude: &Path) -> Result<CopyStats> {
    fs::create_dir_all(dst).with_context(|| format!("Failed to create {:?}", dst))?;
    let mut stats = CopyStats::default();

    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(dst) && !e.path().starts_with(exclude));
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Could not copy {:?}: {}", e.path().unwrap_or(src), e);
                stats.failed += 1;
                continue;
            }
        };
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);
        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        match result {
            Ok(()) if !entry.file_type().is_dir() => stats.files += 1,
            Ok(()) => {}
            Err(e) => {
                warn!("Could not copy {:?}: {}", entry.path(), e);
                stats.failed += 1;
            }
        }
    }
    Ok(stats)
}

/// Values written to `Info.plist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub identifier: String,
    pub name: String,
    pub platform_family: String,
    pub index_file_path: String,
}

impl Manifest {
    pub fn new(name: &str, index_file_path: &str) -> Self {
        let platform = name
            .split_whitespace()
            .next()
            .unwrap_or(name)
            .to_lowercase();
        Manifest {
            identifier: platform.clone(),
            name: name.to_string(),
            platform_family: platform,
            index_file_path: index_file_path.to_string(),
        }
    }

    pub fn to_plist(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(PLIST_DOCTYPE)))?;
        writer.write_event(Event::Start(
            BytesStart::new("plist").with_attributes([("version", "1.0")]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("dict")))?;

        for (key, value) in [
            ("CFBundleIdentifier", self.identifier.as_str()),
            ("CFBundleName", self.name.as_str()),
            ("DocSetPlatformFamily", self.platform_family.as_str()),
            ("dashIndexFilePath", self.index_file_path.as_str()),
            ("DashDocSetFamily", DOCSET_FAMILY),
        ] {
            write_text_element(&mut writer, "key", key)?;
            write_text_element(&mut writer, "string", value)?;
        }
        write_text_element(&mut writer, "key", "isDashDocset")?;
        writer.write_event(Event::Empty(BytesStart::new("true")))?;

        writer.write_event(Event::End(BytesEnd::new("dict")))?;
        writer.write_event(Event::End(BytesEnd::new("plist")))?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_plist()?).with_context(|| format!("Failed to write {:?}", path))
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
