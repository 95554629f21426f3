//! Configuration layer separating CLI arguments from internal pass configurations.
//!
//! This module defines:
//! - `GlobalArgs`: options shared by every byre command
//! - Per-command CLI structs (`DedupeCommand`, `FilterCommand`, `SplitCommand`)
//! - Internal configurations the passes consume, built via `from_args`
//! - The optional TOML config file carrying dataset defaults
//!
//! CLI concerns (parsing, help text, value validation) stay here so the pass
//! implementations only ever see validated values.

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TRAIN_RATIO: f64 = 0.7;
pub const DEFAULT_VAL_RATIO: f64 = 0.15;
pub const DEFAULT_TEST_RATIO: f64 = 0.15;
pub const DEFAULT_SEED: u64 = 42;

/// Allowed slack when checking that the three split ratios sum to 1.0.
pub const RATIO_TOLERANCE: f64 = 1e-6;

/// Minimum pixel dimensions an image must meet to survive the size filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinSize {
    pub width: u32,
    pub height: u32,
}

impl Default for MinSize {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
        }
    }
}

impl From<[u32; 2]> for MinSize {
    fn from(pair: [u32; 2]) -> Self {
        Self {
            width: pair[0],
            height: pair[1],
        }
    }
}

/// Parse a minimum size from "W,H" or "WxH" (e.g. "32,32" or "64x64")
pub fn parse_min_size(s: &str) -> Result<MinSize, String> {
    let parts: Vec<&str> = if s.contains(',') {
        s.split(',').collect()
    } else {
        s.split(['x', 'X']).collect()
    };
    if parts.len() != 2 {
        return Err("Minimum size must be 'WIDTH,HEIGHT' or 'WIDTHxHEIGHT'".to_string());
    }

    let width = parts[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("Invalid width: '{}'", parts[0]))?;
    let height = parts[1]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("Invalid height: '{}'", parts[1]))?;

    Ok(MinSize { width, height })
}

/// Parse a split ratio (must be between 0.0 and 1.0)
pub fn parse_ratio(s: &str) -> Result<f64, String> {
    let val = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if !(0.0..=1.0).contains(&val) {
        return Err(format!("Must be between 0.0 and 1.0, got {val}"));
    }
    Ok(val)
}

/// The train/val/test fractions of a split. Constructed only through
/// `new`, which enforces the sum-to-1.0 invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self, String> {
        for (name, value) in [("train", train), ("val", val), ("test", test)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!(
                    "{name} ratio must be between 0.0 and 1.0, got {value}"
                ));
            }
        }
        let sum = train + val + test;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(format!("Split ratios must sum to 1.0, got {sum:.6}"));
        }
        Ok(Self { train, val, test })
    }
}

/// Global CLI arguments that apply to all byre commands
#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbosity level (-q/--quiet, -v/-vv/-vvv for info/debug/trace)
    #[command(flatten)]
    pub verbosity: Verbosity<ErrorLevel>,

    /// Warn instead of erroring on missing or unsupported sources
    #[arg(long, global = true)]
    pub permissive: bool,

    /// Disable colored output (also respects NO_COLOR and BYRE_NO_COLOR env vars)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Write a TOML summary of the run to this path
    #[arg(long, global = true, value_name = "FILE")]
    pub summary: Option<PathBuf>,
}

/// CLI command for the deduplicate/validate pass
#[derive(Parser, Debug, Clone)]
pub struct DedupeCommand {
    /// Path(s) to images or directories. Supports glob patterns like *.jpg
    #[arg(value_name = "IMAGES_OR_DIRS", required = true)]
    pub sources: Vec<String>,

    /// Report files that would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// CLI command for the minimum-size filter pass
#[derive(Parser, Debug, Clone)]
pub struct FilterCommand {
    /// Path(s) to images or directories. Supports glob patterns like *.jpg
    #[arg(value_name = "IMAGES_OR_DIRS", required = true)]
    pub sources: Vec<String>,

    /// Minimum dimensions as "WIDTH,HEIGHT" or "WIDTHxHEIGHT" (default 32,32)
    #[arg(long, value_name = "WxH", value_parser = parse_min_size)]
    pub min_size: Option<MinSize>,

    /// TOML config file supplying min_image_size
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report files that would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// CLI command for the train/val/test split pass
#[derive(Parser, Debug, Clone)]
pub struct SplitCommand {
    /// Source corpus directory
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Output root for the train/val/test trees
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Fraction of files assigned to train
    #[arg(long, value_parser = parse_ratio)]
    pub train_ratio: Option<f64>,

    /// Fraction of files assigned to val
    #[arg(long, value_parser = parse_ratio)]
    pub val_ratio: Option<f64>,

    /// Fraction of files assigned to test
    #[arg(long, value_parser = parse_ratio)]
    pub test_ratio: Option<f64>,

    /// Seed for the reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML config file supplying defaults for any of the options above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Dataset defaults read from a TOML config file.
///
/// ```toml
/// [data]
/// source_dir = "data/raw"
/// output_dir = "data/processed"
/// train_ratio = 0.7
/// val_ratio = 0.15
/// test_ratio = 0.15
/// min_image_size = [32, 32]
/// seed = 42
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub train_ratio: Option<f64>,
    pub val_ratio: Option<f64>,
    pub test_ratio: Option<f64>,
    pub min_image_size: Option<[u32; 2]>,
    pub seed: Option<u64>,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Internal configuration for the dedupe pass
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    pub sources: Vec<String>,
    /// Fail on missing or unsupported sources. Opposite of `--permissive`.
    pub strict: bool,
    pub dry_run: bool,
}

impl DedupeConfig {
    pub fn from_args(global: &GlobalArgs, cmd: DedupeCommand) -> Self {
        Self {
            sources: cmd.sources,
            strict: !global.permissive,
            dry_run: cmd.dry_run,
        }
    }
}

/// Internal configuration for the size filter pass
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub sources: Vec<String>,
    pub min_size: MinSize,
    pub strict: bool,
    pub dry_run: bool,
}

impl FilterConfig {
    /// Resolve the minimum size with CLI taking precedence over the config file.
    pub fn from_args(global: &GlobalArgs, cmd: FilterCommand) -> Result<Self> {
        let file = match &cmd.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };

        let min_size = cmd
            .min_size
            .or(file.data.min_image_size.map(MinSize::from))
            .unwrap_or_default();

        Ok(Self {
            sources: cmd.sources,
            min_size,
            strict: !global.permissive,
            dry_run: cmd.dry_run,
        })
    }
}

/// Internal configuration for the split pass
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    pub ratios: SplitRatios,
    pub seed: u64,
}

impl SplitConfig {
    /// Resolve CLI arguments over config-file values over built-in defaults,
    /// validating the ratio invariant before anything touches the filesystem.
    pub fn from_args(cmd: SplitCommand) -> Result<Self> {
        let file = match &cmd.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };

        let source = cmd
            .source
            .or(file.data.source_dir)
            .context("No source directory given (use --source or a config file)")?;
        let output = cmd
            .output
            .or(file.data.output_dir)
            .context("No output directory given (use --output or a config file)")?;

        let train = cmd
            .train_ratio
            .or(file.data.train_ratio)
            .unwrap_or(DEFAULT_TRAIN_RATIO);
        let val = cmd
            .val_ratio
            .or(file.data.val_ratio)
            .unwrap_or(DEFAULT_VAL_RATIO);
        let test = cmd
            .test_ratio
            .or(file.data.test_ratio)
            .unwrap_or(DEFAULT_TEST_RATIO);

        let ratios = SplitRatios::new(train, val, test).map_err(|e| anyhow::anyhow!(e))?;
        let seed = cmd.seed.or(file.data.seed).unwrap_or(DEFAULT_SEED);

        Ok(Self {
            source,
            output,
            ratios,
            seed,
        })
    }
}
