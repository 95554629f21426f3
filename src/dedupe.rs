//! Deduplicate/validate pass.
//!
//! Walks the corpus in sorted order, deletes files that fail to decode, then
//! removes exact byte-for-byte duplicates. The first file seen with a given
//! content hash survives; because traversal is sorted, "first" means first in
//! path order regardless of how the filesystem lists entries. A failure on
//! one file never aborts the pass.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::symbols;
use crate::config::DedupeConfig;
use crate::corpus::{collect_from_sources, SourceOptions};
use crate::progress;

/// Counts reported by a dedupe pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupeOutcome {
    pub invalid_removed: usize,
    pub duplicates_removed: usize,
    pub kept: usize,
}

/// MD5 digest over a file's raw bytes, as a hex string.
pub fn content_hash(path: &Path) -> Result<String> {
    let contents = fs::read(path)?;
    Ok(format!("{:x}", md5::compute(&contents)))
}

/// Delete a file, honoring dry-run. Returns true when the file is gone (or
/// would be); a failed delete is logged and leaves the file in place so a
/// rerun can retry it.
fn remove_image(path: &Path, dry_run: bool) -> bool {
    if dry_run {
        log::info!("{}Would remove: {}", symbols::removed(), path.display());
        return true;
    }
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!(
                "{}Failed to remove {}: {e}",
                symbols::warning(),
                path.display()
            );
            false
        }
    }
}

/// Run the dedupe pass over the configured sources.
pub fn run_dedupe(config: &DedupeConfig) -> Result<DedupeOutcome> {
    let options = SourceOptions::from_strict_flag(config.strict);
    let image_files = collect_from_sources(&config.sources, &options)?;

    log::info!(
        "🔍 Checking {} image(s) for validity and duplicates",
        image_files.len()
    );

    let mut seen_hashes: HashMap<String, PathBuf> = HashMap::new();
    let mut outcome = DedupeOutcome::default();

    let pb = progress::scan_bar(image_files.len() as u64, "dedupe");
    for image_path in &image_files {
        pb.inc(1);

        // Decode check. A file that cannot be decoded never reaches the hash map.
        if let Err(e) = image::open(image_path) {
            log::info!(
                "{}Invalid image: {} ({e})",
                symbols::removed(),
                image_path.display()
            );
            if remove_image(image_path, config.dry_run) {
                outcome.invalid_removed += 1;
            }
            continue;
        }

        let file_hash = match content_hash(image_path) {
            Ok(hash) => hash,
            Err(e) => {
                log::warn!(
                    "{}Failed to hash {}: {e}",
                    symbols::warning(),
                    image_path.display()
                );
                continue;
            }
        };

        if let Some(original) = seen_hashes.get(&file_hash) {
            log::info!(
                "♻️  Duplicate: {} (same as {})",
                image_path.display(),
                original.display()
            );
            if remove_image(image_path, config.dry_run) {
                outcome.duplicates_removed += 1;
            } else {
                outcome.kept += 1;
            }
        } else {
            seen_hashes.insert(file_hash, image_path.clone());
            outcome.kept += 1;
        }
    }
    pb.finish_and_clear();

    log::info!(
        "{}Dedupe complete: {} invalid, {} duplicate(s) removed, {} kept",
        symbols::success(),
        outcome.invalid_removed,
        outcome.duplicates_removed,
        outcome.kept
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, rgb: [u8; 3]) {
        RgbImage::from_pixel(8, 8, Rgb(rgb)).save(path).unwrap();
    }

    fn dedupe_dir(dir: &Path, dry_run: bool) -> DedupeOutcome {
        let config = DedupeConfig {
            sources: vec![dir.to_string_lossy().to_string()],
            strict: true,
            dry_run,
        };
        run_dedupe(&config).unwrap()
    }

    #[test]
    fn test_content_hash_is_deterministic() {
        let temp_dir = tempdir().unwrap();
        let a = temp_dir.path().join("a.png");
        let b = temp_dir.path().join("b.png");
        write_png(&a, [10, 20, 30]);
        fs::copy(&a, &b).unwrap();

        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn test_removes_duplicates_keeps_first_in_sorted_order() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        // z.png written first, a.png is a byte-identical copy. Sorted order
        // decides the survivor, not creation order.
        write_png(&root.join("z.png"), [1, 2, 3]);
        fs::copy(root.join("z.png"), root.join("a.png")).unwrap();
        write_png(&root.join("m.png"), [9, 9, 9]);

        let outcome = dedupe_dir(root, false);
        assert_eq!(outcome.duplicates_removed, 1);
        assert_eq!(outcome.invalid_removed, 0);
        assert_eq!(outcome.kept, 2);

        assert!(root.join("a.png").exists());
        assert!(!root.join("z.png").exists());
        assert!(root.join("m.png").exists());
    }

    #[test]
    fn test_removes_undecodable_files_before_hashing() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("ok.png"), [5, 5, 5]);
        fs::write(root.join("corrupt.jpg"), b"definitely not a jpeg").unwrap();
        // A truncated copy of a real image must also fail the decode check.
        let bytes = fs::read(root.join("ok.png")).unwrap();
        fs::write(root.join("truncated.png"), &bytes[..bytes.len() / 2]).unwrap();

        let outcome = dedupe_dir(root, false);
        assert_eq!(outcome.invalid_removed, 2);
        assert_eq!(outcome.duplicates_removed, 0);
        assert_eq!(outcome.kept, 1);
        assert!(root.join("ok.png").exists());
        assert!(!root.join("corrupt.jpg").exists());
        assert!(!root.join("truncated.png").exists());
    }

    #[test]
    fn test_no_two_survivors_share_a_hash() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("a.png"), [1, 1, 1]);
        write_png(&root.join("b.png"), [2, 2, 2]);
        fs::copy(root.join("a.png"), root.join("c.png")).unwrap();
        fs::copy(root.join("b.png"), root.join("d.png")).unwrap();

        dedupe_dir(root, false);

        let survivors = crate::corpus::collect_corpus(root).unwrap();
        let mut hashes: Vec<String> = survivors
            .iter()
            .map(|p| content_hash(p).unwrap())
            .collect();
        let before = hashes.len();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), before);
    }

    #[test]
    fn test_idempotent_second_run_removes_nothing() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("a.png"), [7, 7, 7]);
        fs::copy(root.join("a.png"), root.join("b.png")).unwrap();
        fs::write(root.join("bad.jpeg"), b"junk").unwrap();

        let first = dedupe_dir(root, false);
        assert_eq!(first.invalid_removed + first.duplicates_removed, 2);

        let second = dedupe_dir(root, false);
        assert_eq!(second.invalid_removed, 0);
        assert_eq!(second.duplicates_removed, 0);
        assert_eq!(second.kept, first.kept);
    }

    #[test]
    fn test_dry_run_deletes_nothing_but_counts() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("a.png"), [3, 3, 3]);
        fs::copy(root.join("a.png"), root.join("b.png")).unwrap();
        fs::write(root.join("bad.jpg"), b"junk").unwrap();

        let outcome = dedupe_dir(root, true);
        assert_eq!(outcome.invalid_removed, 1);
        assert_eq!(outcome.duplicates_removed, 1);

        assert!(root.join("a.png").exists());
        assert!(root.join("b.png").exists());
        assert!(root.join("bad.jpg").exists());
    }
}
