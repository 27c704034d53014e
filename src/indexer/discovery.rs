use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filters applied while walking a source tree.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Directory names pruned from the walk.
    pub skip_dirs: Vec<String>,
    /// Globs matched against the path relative to the root.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: super::languages::default_extensions(),
            skip_dirs: super::languages::default_skip_dirs(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Recursively finds source files under `root`, sorted by path.
pub fn find_source_files<P: AsRef<Path>>(
    root: P,
    opts: &DiscoveryOptions,
) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    anyhow::ensure!(root.exists(), "root path does not exist: {}", root.display());

    let excludes = build_excludes(&opts.exclude_patterns)?;
    let skip_dirs: HashSet<String> = opts.skip_dirs.iter().cloned().collect();
    let extensions: HashSet<String> =
        opts.extensions.iter().map(|e| e.to_lowercase()).collect();

    // Only skip_dirs and exclude_patterns decide what is left out.
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy();
            !(is_dir && entry.depth() > 0 && skip_dirs.contains(&*name))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if !has_source_extension(path, &extensions) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_match(rel) {
            debug!("excluded by pattern: {}", rel.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Counts files per lowercased extension (with leading dot).
pub fn extension_stats(files: &[PathBuf]) -> BTreeMap<String, usize> {
    let mut stats = BTreeMap::new();
    for file in files {
        let ext = file
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        *stats.entry(ext).or_insert(0) += 1;
    }
    stats
}

fn has_source_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .map(|e| extensions.contains(&e.to_string_lossy().to_lowercase()))
        .unwrap_or(false)
}

fn build_excludes(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("failed to build exclude patterns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "// test").unwrap();
    }

    #[test]
    fn test_find_source_files_filters() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(root, "src/main.cpp");
        touch(root, "src/util.H");
        touch(root, "include/api.hpp");
        touch(root, "README.md");
        touch(root, "build/gen.cpp");
        touch(root, "third/CMakeFiles/probe.cc");
        touch(root, ".cache/clangd/index.h");

        let files = find_source_files(root, &DiscoveryOptions::default()).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(rel, vec!["include/api.hpp", "src/main.cpp", "src/util.H"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(root, "src/a.cpp");
        touch(root, "tests/a_test.cpp");
        touch(root, "src/moc_a.cpp");

        let opts = DiscoveryOptions {
            exclude_patterns: vec!["tests/**".to_string(), "**/moc_*".to_string()],
            ..Default::default()
        };
        let files = find_source_files(root, &opts).unwrap();
        assert_eq!(files, vec![root.join("src/a.cpp")]);
    }

    #[test]
    fn test_ignore_files_do_not_hide_sources() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        touch(root, ".git/HEAD");
        touch(root, "a.cpp");
        touch(root, "moc_a.cpp");
        touch(root, "gen/table.cc");
        fs::write(root.join(".gitignore"), "moc_*.cpp\n").unwrap();
        fs::write(root.join(".ignore"), "gen/\n").unwrap();

        let files = find_source_files(root, &DiscoveryOptions::default()).unwrap();
        assert_eq!(
            files,
            vec![root.join("a.cpp"), root.join("gen/table.cc"), root.join("moc_a.cpp")]
        );
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let temp = tempdir().unwrap();
        let opts = DiscoveryOptions {
            exclude_patterns: vec!["src/[".to_string()],
            ..Default::default()
        };
        assert!(find_source_files(temp.path(), &opts).is_err());
    }

    #[test]
    fn test_missing_root() {
        assert!(find_source_files("/nonexistent/root", &DiscoveryOptions::default()).is_err());
    }

    #[test]
    fn test_extension_stats() {
        let files = vec![
            PathBuf::from("a.cpp"),
            PathBuf::from("b.CPP"),
            PathBuf::from("c.h"),
        ];
        let stats = extension_stats(&files);
        assert_eq!(stats.get(".cpp"), Some(&2));
        assert_eq!(stats.get(".h"), Some(&1));
    }
}
