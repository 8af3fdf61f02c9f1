//! xtask - Build tasks for logstitch
//!
//! Run with: cargo xtask <command>
//!
//! Commands:
//! - gen-docs: Generate documentation (man pages, COMMANDS.md)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, Command, CommandFactory, Parser, Subcommand};

use logstitch::cli::Cli;

const BIN: &str = "logstitch";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build tasks for logstitch")]
struct Xtask {
    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    /// Generate documentation from CLI definitions
    #[command(name = "gen-docs")]
    GenDocs {
        /// Output directory (default: docs/)
        #[arg(long, short, default_value = "docs")]
        output: PathBuf,

        /// Generate man pages
        #[arg(long)]
        man: bool,

        /// Generate COMMANDS.md
        #[arg(long)]
        markdown: bool,
    },
}

fn main() -> Result<()> {
    let args = Xtask::parse();

    match args.command {
        XtaskCommand::GenDocs {
            output,
            man,
            markdown,
        } => {
            // If no specific format is specified, generate all
            let gen_all = !man && !markdown;

            if gen_all || man {
                generate_man_pages(&output)?;
            }
            if gen_all || markdown {
                generate_markdown(&output)?;
            }
        }
    }

    Ok(())
}

fn render_man(cmd: &Command, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated: {}", path.display());
    Ok(())
}

/// Generate man pages using clap_mangen
fn generate_man_pages(output: &Path) -> Result<()> {
    let man_dir = output.join("man");
    fs::create_dir_all(&man_dir).context("Failed to create man directory")?;

    let cmd = Cli::command();
    render_man(&cmd, &man_dir.join(format!("{}.1", BIN)))?;

    for subcommand in cmd.get_subcommands().filter(|c| !c.is_hide_set()) {
        let name = subcommand.get_name();
        render_man(subcommand, &man_dir.join(format!("{}-{}.1", BIN, name)))?;

        for nested in subcommand.get_subcommands().filter(|c| !c.is_hide_set()) {
            let file = format!("{}-{}-{}.1", BIN, name, nested.get_name());
            render_man(nested, &man_dir.join(file))?;
        }
    }

    println!("Man pages generated in {}", man_dir.display());
    Ok(())
}

fn is_builtin(arg: &Arg) -> bool {
    let id = arg.get_id().as_str();
    id == "help" || id == "version"
}

/// `-j, --jobs` style label, or `None` for positionals.
fn flag_label(arg: &Arg) -> Option<String> {
    let long = arg.get_long().map(|l| format!("--{}", l));
    let short = arg.get_short().map(|s| format!("-{}", s));
    match (long, short) {
        (Some(l), Some(s)) => Some(format!("{}, {}", s, l)),
        (Some(l), None) => Some(l),
        (None, Some(s)) => Some(s),
        _ => None,
    }
}

/// Bullet list of a command's positionals and options.
fn push_arguments(markdown: &mut String, cmd: &Command) {
    let args: Vec<&Arg> = cmd.get_arguments().filter(|a| !is_builtin(a)).collect();
    let help = |arg: &Arg| arg.get_help().map(|h| h.to_string()).unwrap_or_default();

    let positional: Vec<&&Arg> = args.iter().filter(|a| a.is_positional()).collect();
    if !positional.is_empty() {
        markdown.push_str("### Arguments\n\n");
        for arg in positional {
            let name = arg.get_id().as_str().to_uppercase();
            markdown.push_str(&format!("- `<{}>`: {}\n", name, help(arg)));
        }
        markdown.push('\n');
    }

    let options: Vec<(String, String)> = args
        .iter()
        .filter(|a| !a.is_positional())
        .filter_map(|a| flag_label(a).map(|label| (label, help(a))))
        .collect();
    if !options.is_empty() {
        markdown.push_str("### Options\n\n");
        for (label, text) in options {
            markdown.push_str(&format!("- `{}`: {}\n", label, text));
        }
        markdown.push('\n');
    }
}

fn push_long_about(markdown: &mut String, cmd: &Command) {
    if let Some(long_about) = cmd.get_long_about() {
        markdown.push_str("```\n");
        markdown.push_str(&format!("{}\n", long_about));
        markdown.push_str("```\n\n");
    }
}

/// Generate COMMANDS.md markdown documentation
fn generate_markdown(output: &Path) -> Result<()> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let cmd = Cli::command();
    let visible: Vec<&Command> = cmd.get_subcommands().filter(|c| !c.is_hide_set()).collect();
    let mut markdown = String::new();

    markdown.push_str("# logstitch Command Reference\n\n");
    markdown.push_str("This document is auto-generated from the CLI definitions.\n\n");
    markdown.push_str("## Table of Contents\n\n");
    for subcommand in &visible {
        let name = subcommand.get_name();
        markdown.push_str(&format!("- [{}](#{}-{})\n", name, BIN, name));
    }
    markdown.push_str("\n---\n\n");

    markdown.push_str(&format!("## {}\n\n", BIN));
    if let Some(about) = cmd.get_about() {
        markdown.push_str(&format!("{}\n\n", about));
    }
    push_long_about(&mut markdown, &cmd);

    for subcommand in visible {
        let name = subcommand.get_name();
        markdown.push_str(&format!("## {} {}\n\n", BIN, name));
        if let Some(about) = subcommand.get_about() {
            markdown.push_str(&format!("{}\n\n", about));
        }
        push_arguments(&mut markdown, subcommand);

        if subcommand.get_long_about().is_some() {
            markdown.push_str("### Description\n\n");
            push_long_about(&mut markdown, subcommand);
        }

        for nested in subcommand.get_subcommands().filter(|c| !c.is_hide_set()) {
            markdown.push_str(&format!("#### {} {} {}\n\n", BIN, name, nested.get_name()));
            if let Some(about) = nested.get_about() {
                markdown.push_str(&format!("{}\n\n", about));
            }
            push_arguments(&mut markdown, nested);
            push_long_about(&mut markdown, nested);
        }

        markdown.push_str("---\n\n");
    }

    markdown.push_str("\n*Generated by `cargo xtask gen-docs`*\n");

    let output_path = output.join("COMMANDS.md");
    fs::write(&output_path, markdown)?;
    println!("Generated: {}", output_path.display());

    Ok(())
}
