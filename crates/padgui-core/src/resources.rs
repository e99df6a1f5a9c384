use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Lookup of asset files by name.
///
/// A name resolves to an existing path as given, then to a path under one of
/// the roots, then to any indexed file with that file name or stem.
#[derive(Debug, Default, Clone)]
pub struct Resources {
    roots: Vec<PathBuf>,
    by_name: HashMap<String, PathBuf>,
    by_stem: HashMap<String, PathBuf>,
}

impl Resources {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut res = Resources::default();
        for root in roots {
            res.add_root(root.as_ref());
        }
        res
    }

    pub fn add_root(&mut self, root: &Path) {
        if !root.is_dir() {
            log::debug!("resource root {} is not a directory", root.display());
            return;
        }
        let mut indexed = 0usize;
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                self.by_name
                    .entry(name.to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
            if let Some(stem) = path.file_stem().and_then(|n| n.to_str()) {
                self.by_stem
                    .entry(stem.to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
            indexed += 1;
        }
        log::debug!("indexed {indexed} files under {}", root.display());
        self.roots.push(root.to_path_buf());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        let direct = Path::new(name);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }
        for root in &self.roots {
            let joined = root.join(name);
            if joined.is_file() {
                return Some(joined);
            }
        }
        self.by_name
            .get(name)
            .or_else(|| self.by_stem.get(name))
            .cloned()
    }
}
