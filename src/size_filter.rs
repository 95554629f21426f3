//! Minimum-size filter pass.
//!
//! Removes images whose pixel dimensions fall strictly below the configured
//! minimum, along with files whose dimensions cannot be read at all. Only
//! image headers are decoded, so the pass is cheap even on large corpora.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::color::symbols;
use crate::config::FilterConfig;
use crate::corpus::{collect_from_sources, SourceOptions};
use crate::progress;

/// Counts reported by a size-filter pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub unreadable_removed: usize,
    pub undersized_removed: usize,
    pub kept: usize,
}

impl FilterOutcome {
    pub fn total_removed(&self) -> usize {
        self.unreadable_removed + self.undersized_removed
    }
}

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

/// Run the size filter over the configured sources.
pub fn run_size_filter(config: &FilterConfig) -> Result<FilterOutcome> {
    let options = SourceOptions::from_strict_flag(config.strict);
    let image_files = collect_from_sources(&config.sources, &options)?;

    log::info!(
        "📏 Filtering {} image(s) below {}x{}",
        image_files.len(),
        config.min_size.width,
        config.min_size.height
    );

    let mut outcome = FilterOutcome::default();

    let pb = progress::scan_bar(image_files.len() as u64, "filter");
    for image_path in &image_files {
        pb.inc(1);

        match image::image_dimensions(image_path) {
            Ok((width, height)) => {
                if width < config.min_size.width || height < config.min_size.height {
                    log::info!(
                        "{}Undersized image: {} ({width}x{height})",
                        symbols::removed(),
                        image_path.display()
                    );
                    if remove_image(image_path, config.dry_run) {
                        outcome.undersized_removed += 1;
                    } else {
                        outcome.kept += 1;
                    }
                } else {
                    outcome.kept += 1;
                }
            }
            Err(e) => {
                log::info!(
                    "{}Unreadable image: {} ({e})",
                    symbols::removed(),
                    image_path.display()
                );
                if remove_image(image_path, config.dry_run) {
                    outcome.unreadable_removed += 1;
                } else {
                    outcome.kept += 1;
                }
            }
        }
    }
    pb.finish_and_clear();

    log::info!(
        "{}Filter complete: {} removed ({} unreadable, {} undersized), {} kept",
        symbols::success(),
        outcome.total_removed(),
        outcome.unreadable_removed,
        outcome.undersized_removed,
        outcome.kept
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MinSize;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([40, 30, 20]))
            .save(path)
            .unwrap();
    }

    fn filter_dir(dir: &Path, min_size: MinSize, dry_run: bool) -> FilterOutcome {
        let config = FilterConfig {
            sources: vec![dir.to_string_lossy().to_string()],
            min_size,
            strict: true,
            dry_run,
        };
        run_size_filter(&config).unwrap()
    }

    #[test]
    fn test_removes_undersized_and_unreadable() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("big.png"), 64, 64);
        write_png(&root.join("narrow.png"), 16, 64);
        write_png(&root.join("short.png"), 64, 16);
        fs::write(root.join("junk.jpg"), b"not an image").unwrap();

        let min = MinSize {
            width: 32,
            height: 32,
        };
        let outcome = filter_dir(root, min, false);
        assert_eq!(outcome.undersized_removed, 2);
        assert_eq!(outcome.unreadable_removed, 1);
        assert_eq!(outcome.kept, 1);

        // Every survivor satisfies both minimums.
        for path in crate::corpus::collect_corpus(root).unwrap() {
            let (w, h) = image::image_dimensions(&path).unwrap();
            assert!(w >= min.width && h >= min.height);
        }
    }

    #[test]
    fn test_exact_minimum_survives() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        write_png(&root.join("edge.png"), 32, 32);

        let outcome = filter_dir(
            root,
            MinSize {
                width: 32,
                height: 32,
            },
            false,
        );
        assert_eq!(outcome.total_removed(), 0);
        assert!(root.join("edge.png").exists());
    }

    #[test]
    fn test_idempotent_second_run_removes_nothing() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("big.png"), 64, 64);
        write_png(&root.join("small.png"), 8, 8);

        let min = MinSize {
            width: 32,
            height: 32,
        };
        let first = filter_dir(root, min, false);
        assert_eq!(first.total_removed(), 1);

        let second = filter_dir(root, min, false);
        assert_eq!(second.total_removed(), 0);
        assert_eq!(second.kept, 1);
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        write_png(&root.join("small.png"), 4, 4);

        let outcome = filter_dir(
            root,
            MinSize {
                width: 32,
                height: 32,
            },
            true,
        );
        assert_eq!(outcome.undersized_removed, 1);
        assert!(root.join("small.png").exists());
    }
}
