//! Color and symbol utilities with support for NO_COLOR and TERM environment variables.
//!
//! Colored output is gated on:
//! - the `--no-color` CLI flag
//! - the `NO_COLOR` environment variable (https://no-color.org/)
//! - the `BYRE_NO_COLOR` environment variable
//! - `TERM=dumb`
//! - stderr not being a TTY (log messages go to stderr)

use colored::ColoredString;
use std::io::{stderr, IsTerminal};
use std::sync::OnceLock;

static COLOR_CONFIG: OnceLock<ColorConfig> = OnceLock::new();

fn should_disable_colors_from_env() -> bool {
    !std::env::var("NO_COLOR").unwrap_or_default().is_empty()
        || !std::env::var("BYRE_NO_COLOR").unwrap_or_default().is_empty()
        || std::env::var("TERM").unwrap_or_default() == "dumb"
        || !stderr().is_terminal()
}

#[derive(Debug, Clone)]
struct ColorConfig {
    colors_enabled: bool,
}

/// Initialize the color configuration with the CLI flag state.
/// Called once at startup after parsing CLI arguments.
pub fn init_color_config(no_color_flag: bool) {
    let colors_enabled = !no_color_flag && !should_disable_colors_from_env();
    if !colors_enabled {
        // Also strips color codes applied directly via `colored` in the log formatter.
        colored::control::set_override(false);
    }
    COLOR_CONFIG
        .set(ColorConfig { colors_enabled })
        .unwrap_or_else(|_| {
            eprintln!("Warning: Color configuration already initialized");
        });
}

fn colors_enabled() -> bool {
    COLOR_CONFIG
        .get()
        .map(|config| config.colors_enabled)
        .unwrap_or_else(|| !should_disable_colors_from_env())
}

/// Apply color to a string only if colors are enabled for stderr output
pub fn maybe_color_stderr<F>(text: &str, color_fn: F) -> String
where
    F: FnOnce(&str) -> ColoredString,
{
    if colors_enabled() {
        color_fn(text).to_string()
    } else {
        text.to_string()
    }
}

/// Semantic symbols for log messages. Fall back to plain padding when colors
/// (and therefore emoji-capable terminals) are disabled.
pub mod symbols {
    use super::colors_enabled;

    pub fn warning() -> &'static str {
        if colors_enabled() {
            "⚠️  "
        } else {
            ""
        }
    }

    pub fn removed() -> &'static str {
        if colors_enabled() {
            "🗑️  "
        } else {
            ""
        }
    }

    pub fn success() -> &'static str {
        if colors_enabled() {
            "✅ "
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;

    #[test]
    fn test_maybe_color_passthrough_text() {
        // Whatever the environment, the underlying text must survive.
        let out = maybe_color_stderr("herd", |s| s.green());
        assert!(out.contains("herd"));
    }
}
