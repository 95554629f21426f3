use clap::Parser;
use colored::Colorize;
use env_logger::{Builder, Env};
use log::{error, info, Level};
use std::io::Write;

use byre::color;
use byre::config::{
    DedupeCommand, DedupeConfig, FilterCommand, FilterConfig, GlobalArgs, SplitCommand, SplitConfig,
};
use byre::dedupe::run_dedupe;
use byre::report::{self, RunSummary};
use byre::size_filter::run_size_filter;
use byre::split::run_split;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Remove undecodable images and exact duplicates
    Dedupe(DedupeCommand),

    /// Remove images below a minimum pixel size
    Filter(FilterCommand),

    /// Partition a corpus into train/val/test trees
    Split(SplitCommand),

    /// Show version information
    Version,
}

#[derive(Parser)]
#[command(name = "byre")]
#[command(about = "Cattle breed dataset curation toolkit")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn get_log_level_from_verbosity(
    verbosity: &clap_verbosity_flag::Verbosity<clap_verbosity_flag::ErrorLevel>,
) -> log::LevelFilter {
    if verbosity.is_silent() {
        return log::LevelFilter::Error; // -q -> ERROR
    }
    match verbosity.log_level_filter() {
        log::LevelFilter::Off => log::LevelFilter::Off,
        log::LevelFilter::Error => log::LevelFilter::Info, // default -> INFO (pass reports)
        log::LevelFilter::Warn => log::LevelFilter::Debug, // -v -> DEBUG
        log::LevelFilter::Info => log::LevelFilter::Trace, // -vv -> TRACE
        log::LevelFilter::Debug => log::LevelFilter::Trace,
        log::LevelFilter::Trace => log::LevelFilter::Trace,
    }
}

fn describe_sources(sources: &[String]) -> String {
    if sources.len() == 1 {
        sources[0].clone()
    } else {
        format!("{} inputs", sources.len())
    }
}

/// Write the run summary if the user asked for one.
fn finish(global: &GlobalArgs, mut summary: RunSummary) {
    if let Some(path) = &global.summary {
        summary.execution = Some(report::execution_context());
        if let Err(e) = report::save_summary(&summary, path) {
            error!("❌ Failed to write summary: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    color::init_color_config(cli.global.no_color);

    // If the user didn't pass -v/-q and RUST_LOG is set, honor the env var.
    let use_env = !cli.global.verbosity.is_present() && std::env::var_os("RUST_LOG").is_some();
    let mut logger = if use_env {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(get_log_level_from_verbosity(&cli.global.verbosity));
        b
    };
    logger
        .format(|buf, record| {
            let level_str = match record.level() {
                Level::Error => "ERROR".red().bold().to_string(),
                Level::Warn => "WARN".yellow().to_string(),
                Level::Info => "INFO".green().to_string(),
                Level::Debug => "DEBUG".blue().to_string(),
                Level::Trace => "TRACE".magenta().to_string(),
            };
            writeln!(buf, "[{}] {}", level_str, record.args())
        })
        .init();

    match cli.command {
        Some(Commands::Dedupe(cmd)) => {
            info!(
                "🧹 Dedupe: {}{}",
                describe_sources(&cmd.sources),
                if cmd.dry_run { " (dry run)" } else { "" }
            );
            let config = DedupeConfig::from_args(&cli.global, cmd);
            match run_dedupe(&config) {
                Ok(outcome) => finish(
                    &cli.global,
                    RunSummary {
                        dedupe: Some(outcome),
                        ..Default::default()
                    },
                ),
                Err(e) => {
                    error!("❌ Dedupe failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Filter(cmd)) => {
            info!(
                "📐 Size filter: {}{}",
                describe_sources(&cmd.sources),
                if cmd.dry_run { " (dry run)" } else { "" }
            );
            let config = match FilterConfig::from_args(&cli.global, cmd) {
                Ok(config) => config,
                Err(e) => {
                    error!("❌ Invalid filter configuration: {e}");
                    std::process::exit(1);
                }
            };
            match run_size_filter(&config) {
                Ok(outcome) => finish(
                    &cli.global,
                    RunSummary {
                        filter: Some(outcome),
                        ..Default::default()
                    },
                ),
                Err(e) => {
                    error!("❌ Size filter failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Split(cmd)) => {
            let config = match SplitConfig::from_args(cmd) {
                Ok(config) => config,
                Err(e) => {
                    error!("❌ Invalid split configuration: {e}");
                    std::process::exit(1);
                }
            };
            info!(
                "✂️  Split: {} -> {} | ratios: {}/{}/{} | seed: {}",
                config.source.display(),
                config.output.display(),
                config.ratios.train,
                config.ratios.val,
                config.ratios.test,
                config.seed
            );
            match run_split(&config) {
                Ok(outcome) => finish(
                    &cli.global,
                    RunSummary {
                        split: Some(outcome),
                        ..Default::default()
                    },
                ),
                Err(e) => {
                    error!("❌ Split failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Version) => {
            println!("byre v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let _ = cmd.print_help();
        }
    }
}
