//! CLI definitions for logstitch
//!
//! This module contains the clap CLI structure definitions, separated from main.rs
//! so they can be accessed by xtask for documentation generation (man pages, markdown).

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;
use std::path::PathBuf;

/// Build clap styles for consistent CLI appearance.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders (renders as light gray on dark terminals)
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Version string shown by `--version`. Dev builds carry the git commit.
pub fn version_string() -> &'static str {
    #[cfg(not(feature = "release"))]
    {
        concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")")
    }
    #[cfg(feature = "release")]
    {
        env!("CARGO_PKG_VERSION")
    }
}

#[derive(Parser)]
#[command(name = "logstitch")]
#[command(about = "[ logstitch ] - stitch multiline editor logs back into messages")]
#[command(
    long_about = "logstitch - reconstruct logical messages from editor and extension-host logs.

Log lines that start with a timestamp open a new message; every following
line without one (stack traces, wrapped output) is stitched onto it. Time-only
timestamps are completed with the date encoded in the log folder name.

QUICK START:
    logstitch ingest                      Ingest %APPDATA%/Code/logs
    logstitch ingest --root ./logs        Ingest a copied log tree
    logstitch ingest --profile jupyter    Jupyter extension output only
    logstitch scan --root ./logs          Survey multiline output channels"
)]
#[command(version = version_string())]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Profiles selectable for `ingest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// Editor logs, excluding extension output folders
    Logs,
    /// Jupyter extension output channels
    Jupyter,
    /// Both of the above
    All,
}

impl ProfileArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileArg::Logs => "logs",
            ProfileArg::Jupyter => "jupyter",
            ProfileArg::All => "all",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconstruct messages and write reports
    #[command(long_about = "Reconstruct logical messages from every log file under a root.

Writes, into the output directory:
    ingest_messages_<profile>.csv                  All reconstructed messages
    ingest_errors_<profile>_<root>.log             Orphan lines and read failures
    ingest_error_paths_<profile>_<root>.log        Files with orphans or failures
    ingest_file_summary_<profile>.log              Per-file message counts

A root named 'Roaming' is expanded to the Code, Cursor and Windsurf log
folders beneath it.

EXAMPLES:
    logstitch ingest --root ~/logs --output-dir out
    logstitch ingest --profile all --jobs 4
    logstitch ingest --profile jupyter --joiner ' | '
    logstitch ingest --json")]
    Ingest(IngestArgs),

    /// Survey extension output channels for multiline messages
    #[command(long_about = "Count multiline messages in every extension-host output channel.

Scans */exthost/output_logging_*/*.log and reports, per file, lines read,
continuation lines and multiline messages.

EXAMPLES:
    logstitch scan --root ~/logs
    logstitch scan --root ~/logs --csv survey.csv")]
    Scan {
        /// Log root (defaults to %APPDATA%/Code/logs)
        #[arg(long, help = "Log root directory to scan")]
        root: Option<PathBuf>,
        /// Write the survey here instead of the output directory
        #[arg(long, help = "Path of the survey CSV")]
        csv: Option<PathBuf>,
        /// Files scanned concurrently
        #[arg(long, short, help = "Number of files to scan in parallel")]
        jobs: Option<usize>,
    },

    /// Configuration management
    #[command(
        subcommand,
        long_about = "View the logstitch configuration.

Configuration is stored in ~/.config/logstitch/config.toml. Missing
fields take their defaults; a missing file means all defaults.

EXAMPLES:
    logstitch config show     Print the effective configuration
    logstitch config path     Print the config file location"
    )]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(long_about = "Generate a shell completion script on stdout.

EXAMPLES:
    logstitch completions bash > ~/.local/share/bash-completion/completions/logstitch
    logstitch completions zsh > ~/.zfunc/_logstitch")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct IngestArgs {
    /// Which log sources to ingest
    #[arg(long, value_enum, default_value = "logs")]
    pub profile: ProfileArg,

    /// Log root (defaults to config, then %APPDATA%/Code/logs)
    #[arg(long, help = "Log root directory to scan")]
    pub root: Option<PathBuf>,

    /// Directory for reports (defaults to config, then the current directory)
    #[arg(long, help = "Directory to write reports into")]
    pub output_dir: Option<PathBuf>,

    /// Name for orphan/failure reports, written into the output directory.
    /// With several profiles or roots the profile and root label are
    /// appended to the stem.
    #[arg(
        long,
        help = "File name for orphan/failure reports (placed in the output directory)"
    )]
    pub error_log: Option<PathBuf>,

    /// Separator between a message's lines
    #[arg(long, help = "Joiner for continuation lines (overrides profile)")]
    pub joiner: Option<String>,

    /// Files scanned concurrently
    #[arg(long, short, help = "Number of files to scan in parallel")]
    pub jobs: Option<usize>,

    /// Treat invalid UTF-8 as a read failure
    #[arg(long, help = "Fail files containing invalid UTF-8")]
    pub strict_utf8: bool,

    /// Print statistics as JSON instead of text
    #[arg(long, help = "Print statistics as JSON")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    #[command(long_about = "Display the effective configuration in TOML format.")]
    Show,
    /// Show config file path
    #[command(long_about = "Print the path of the configuration file.")]
    Path,
}
