//! logstitch - CLI entry point

mod commands;

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logstitch::cli::{build_cli_styles, Cli, Commands, ConfigCommands};

/// Initialise tracing on stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "logstitch=warn",
        1 => "logstitch=debug",
        _ => "logstitch=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Flag set on Ctrl+C. Batches stop starting new files once it is set.
fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })
    .ok(); // Ignore if handler already set
    flag
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    use clap::{CommandFactory, FromArgMatches};

    let matches = Cli::command().styles(build_cli_styles()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    init_logging(cli.verbose);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::handle(&args, interrupt_flag()),
        Commands::Scan { root, csv, jobs } => {
            commands::scan::handle(root, csv, jobs, interrupt_flag())
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Path => commands::config::handle_path(),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell),
    }
}
