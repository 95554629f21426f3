//! Corpus discovery.
//!
//! A corpus is a directory tree whose leaf files are images and whose
//! subdirectory names encode the breed label. Discovery always returns
//! sorted paths: traversal order is filesystem-dependent, and both duplicate
//! survivorship and the split assignment must not depend on it.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for source collection behavior
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub strict_mode: bool,
}

impl SourceOptions {
    /// Strict mode fails on missing or unsupported sources; permissive mode
    /// warns and keeps going.
    pub fn from_strict_flag(strict: bool) -> Self {
        Self { strict_mode: strict }
    }
}

/// Check whether a path carries a recognized image extension.
/// Recognized (case-insensitive): jpg, jpeg, png.
pub fn is_recognized_image(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext_lower = ext.to_string_lossy().to_lowercase();
        matches!(ext_lower.as_str(), "jpg" | "jpeg" | "png")
    } else {
        false
    }
}

/// Recursively find all recognized images under a corpus root, sorted.
pub fn collect_corpus(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Source is not a directory: {}", root.display());
    }

    let mut image_files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!(
                    "{}Skipping unreadable entry under {}: {e}",
                    crate::color::symbols::warning(),
                    root.display()
                );
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && is_recognized_image(path) {
            image_files.push(path.to_path_buf());
        }
    }

    image_files.sort();
    Ok(image_files)
}

/// Collect recognized images from multiple sources: files, directories
/// (scanned recursively), or glob patterns. Results are sorted and deduped.
pub fn collect_from_sources(sources: &[String], options: &SourceOptions) -> Result<Vec<PathBuf>> {
    let mut all_image_files = Vec::new();

    for source in sources {
        let source_path = Path::new(source);

        if source_path.is_file() {
            if is_recognized_image(source_path) {
                all_image_files.push(source_path.to_path_buf());
            } else if options.strict_mode {
                anyhow::bail!(
                    "File is not a recognized image format: {}",
                    source_path.display()
                );
            }
            // Permissive mode silently skips unsupported files.
        } else if source_path.is_dir() {
            all_image_files.extend(collect_corpus(source_path)?);
        } else if !source.contains('*') && !source.contains('?') && !source.contains('[') {
            // A plain path that doesn't exist
            if options.strict_mode {
                anyhow::bail!("Source does not exist: {source}");
            }
            log::warn!(
                "{}Source does not exist: {source}",
                crate::color::symbols::warning()
            );
        } else {
            match glob::glob(source) {
                Ok(paths) => {
                    let mut found_any = false;
                    for path_result in paths {
                        match path_result {
                            Ok(path) => {
                                if path.is_file() && is_recognized_image(&path) {
                                    all_image_files.push(path);
                                    found_any = true;
                                }
                            }
                            Err(e) => {
                                log::warn!(
                                    "{}Error reading path in glob {source}: {e}",
                                    crate::color::symbols::warning()
                                );
                            }
                        }
                    }
                    if !found_any && options.strict_mode {
                        anyhow::bail!("No image files found matching pattern: {source}");
                    }
                }
                Err(_) => {
                    if options.strict_mode {
                        anyhow::bail!(
                            "Source does not exist and is not a valid glob pattern: {source}"
                        );
                    }
                    log::warn!(
                        "{}Source does not exist: {source}",
                        crate::color::symbols::warning()
                    );
                }
            }
        }
    }

    all_image_files.sort();
    all_image_files.dedup();

    if all_image_files.is_empty() && options.strict_mode {
        anyhow::bail!("No image files found in the specified sources");
    }

    Ok(all_image_files)
}
