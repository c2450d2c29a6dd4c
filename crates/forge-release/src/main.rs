//! forge-release - Release branching and tagging across the SDK repositories

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use forge_core::args::{resolve, resolve_from_flags, ArgsError, Flags};
use forge_core::interact::{CliclackPrompter, TerminalGate};
use forge_core::release;
use forge_core::runner::{ExecutionContext, RunOutcome, Runner, SystemShell};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "forge-release")]
#[command(about = "Release automation for the force SDK repositories")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Branch, stamp, and tag every repository in a release manifest
    Run(RunArgs),
    /// Package a local templates directory into zips (for development use)
    Pack(PackArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to the release manifest (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Release version (semver)
    #[arg(long)]
    version: Option<String>,

    /// Release branch name (defaults to release/<version>)
    #[arg(long)]
    branch: Option<String>,

    /// Directory repositories are cloned into (defaults to the current directory)
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Push branches and tags to origin
    #[arg(long)]
    push: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    yes: bool,
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Local directory containing templates
    #[arg(long = "template-dir")]
    template_dir: Option<PathBuf>,
}

fn run_release(opts: RunArgs) -> Result<()> {
    let manifest = release::load_manifest(&opts.config)?;

    let mut flags = Flags::new();
    if let Some(version) = &opts.version {
        flags.insert("version".to_string(), version.clone());
    }
    match (&opts.branch, &opts.version) {
        (Some(branch), _) => {
            flags.insert("branch".to_string(), branch.clone());
        }
        (None, Some(version)) => {
            flags.insert("branch".to_string(), format!("release/{version}"));
        }
        (None, None) => {}
    }

    let specs = release::release_arg_specs();
    let resolved = if opts.yes {
        resolve_from_flags(&specs, &flags)?
    } else {
        match resolve(&specs, &flags, &mut CliclackPrompter) {
            Ok(resolved) => resolved,
            Err(ArgsError::Cancelled) => anyhow::bail!("Release cancelled."),
            Err(e) => return Err(e.into()),
        }
    };

    let version = resolved.get_or_empty("version").to_string();
    let branch = resolved.get_or_empty("branch").to_string();
    let push = opts.push || manifest.push;

    let workdir = opts
        .workdir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&workdir)?;

    let tree = release::release_tree(&manifest, &version, &branch, push);
    let mut shell = SystemShell;
    let mut gate = TerminalGate;
    let ctx = ExecutionContext::new(&workdir).auto_confirm(opts.yes);

    match Runner::new(&mut shell, &mut gate).run(&ctx, &tree)? {
        RunOutcome::Completed => {
            println!();
            println!("{}", "Release run complete.".green().bold());
            if !push {
                println!("Branches and tags were not pushed; re-run with --push to publish.");
            }
            Ok(())
        }
        RunOutcome::Declined => {
            println!("Release cancelled.");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    match args.command {
        Command::Run(run_args) => run_release(run_args),
        Command::Pack(pack_args) => forge_core::templates::build_zips(&pack_args.template_dir),
    }
}
