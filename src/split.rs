//! Train/val/test split pass.
//!
//! Partitions a corpus into three disjoint groups and materializes them by
//! copying files into `<output>/{train,val,test}/`, preserving each file's
//! path relative to the source root so breed labels survive. The assignment
//! depends only on the sorted file list plus the configured ratios and seed,
//! so reruns with the same inputs reproduce it exactly.

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::symbols;
use crate::config::{SplitConfig, SplitRatios};
use crate::corpus::collect_corpus;
use crate::progress;

/// Damps binary-float noise in the ratio arithmetic so exact fractions give
/// exact counts (1 - 0.7 is slightly above 0.3 in f64).
const SIZE_EPSILON: f64 = 1e-9;

pub const SPLIT_NAMES: [&str; 3] = ["train", "val", "test"];

/// Counts reported by a split pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitOutcome {
    pub train: usize,
    pub val: usize,
    pub test: usize,
    pub failed_copies: usize,
    pub total_discovered: usize,
}

/// Subset sizes for a corpus of `n` files: the held-out count is
/// ceil(n * (1 - train)), then test takes ceil(held * test / (val + test))
/// of it. The three sizes always sum to `n`.
pub fn partition_sizes(n: usize, ratios: &SplitRatios) -> (usize, usize, usize) {
    let held = ((n as f64) * (1.0 - ratios.train) - SIZE_EPSILON).ceil().max(0.0) as usize;
    let held = held.min(n);
    let train = n - held;

    let holdout_sum = ratios.val + ratios.test;
    let test = if held == 0 || holdout_sum <= 0.0 {
        0
    } else {
        let test_fraction = ratios.test / holdout_sum;
        let test = ((held as f64) * test_fraction - SIZE_EPSILON).ceil().max(0.0) as usize;
        test.min(held)
    };
    let val = held - test;

    (train, val, test)
}

/// Deterministically assign sorted files to (train, val, test) groups.
pub fn assign_splits(
    mut files: Vec<PathBuf>,
    ratios: &SplitRatios,
    seed: u64,
) -> (Vec<PathBuf>, Vec<PathBuf>, Vec<PathBuf>) {
    let (train_n, val_n, _test_n) = partition_sizes(files.len(), ratios);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    files.shuffle(&mut rng);

    let mut held = files.split_off(train_n);
    let test = held.split_off(val_n);

    (files, held, test)
}

/// Run the split pass: validate, discover, partition, copy.
pub fn run_split(config: &SplitConfig) -> Result<SplitOutcome> {
    // Configuration errors must surface before any filesystem mutation.
    let ratios = SplitRatios::new(config.ratios.train, config.ratios.val, config.ratios.test)
        .map_err(|e| anyhow::anyhow!(e))?;

    let files = collect_corpus(&config.source)?;
    let total_discovered = files.len();
    log::info!(
        "📂 Found {} image(s) under {}",
        total_discovered,
        config.source.display()
    );

    let (train, val, test) = assign_splits(files, &ratios, config.seed);

    let mut outcome = SplitOutcome {
        total_discovered,
        ..Default::default()
    };

    let pb = progress::scan_bar(total_discovered as u64, "split");
    for (split_name, group) in SPLIT_NAMES.iter().zip([&train, &val, &test]) {
        let split_dir = config.output.join(split_name);
        fs::create_dir_all(&split_dir)?;

        let mut placed = 0;
        for file_path in group {
            pb.inc(1);
            match copy_into_split(file_path, &config.source, &split_dir) {
                Ok(()) => placed += 1,
                Err(e) => {
                    log::warn!(
                        "{}Failed to copy {}: {e}",
                        symbols::warning(),
                        file_path.display()
                    );
                    outcome.failed_copies += 1;
                }
            }
        }

        match *split_name {
            "train" => outcome.train = placed,
            "val" => outcome.val = placed,
            _ => outcome.test = placed,
        }
        log::info!("   {split_name}: {placed} file(s)");
    }
    pb.finish_and_clear();

    if outcome.failed_copies > 0 {
        log::warn!(
            "{}{} of {} file(s) failed to copy",
            symbols::warning(),
            outcome.failed_copies,
            total_discovered
        );
    }
    log::info!(
        "{}Split complete: {} file(s) processed (seed {})",
        symbols::success(),
        total_discovered,
        config.seed
    );

    Ok(outcome)
}

/// Copy one file under the split directory, preserving its path relative to
/// the source root (and with it the breed-label subdirectory).
fn copy_into_split(file_path: &Path, source_root: &Path, split_dir: &Path) -> Result<()> {
    let relative = file_path.strip_prefix(source_root)?;
    let dest_path = split_dir.join(relative);
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(file_path, &dest_path)?;
    Ok(())
}
