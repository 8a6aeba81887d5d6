use std::env;
use std::process::ExitCode;

use anstream::eprintln;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;

use pex_cli::{Cli, Commands};
use pex_collisions::CollisionPolicy;
use pex_static::EnvVars;

use crate::commands::ExitStatus;
use crate::printer::Printer;

mod commands;
mod logging;
mod printer;

fn run() -> Result<ExitStatus> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    let globals = &cli.global_args;

    // Configure the `Printer`, which controls user-facing output in the CLI.
    let printer = if globals.quiet {
        Printer::Quiet
    } else if globals.verbose > 0 {
        Printer::Verbose
    } else {
        Printer::Default
    };

    // Configure the `warn_user!` macro, which controls user-facing warnings in the CLI.
    if !globals.quiet {
        pex_warnings::enable();
    }

    if globals.no_color {
        anstream::ColorChoice::write_global(anstream::ColorChoice::Never);
    } else {
        anstream::ColorChoice::write_global(globals.color.into());
    }

    // Configure the `tracing` crate, which controls internal logging.
    logging::setup_logging(logging::Level::from(globals.verbose))?;

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .break_words(false)
                .word_separator(textwrap::WordSeparator::AsciiSpace)
                .word_splitter(textwrap::WordSplitter::NoHyphenation)
                .wrap_lines(env::var(EnvVars::PEX_NO_WRAP).map(|_| false).unwrap_or(true))
                .build(),
        )
    }))?;

    match cli.command {
        Commands::Venv(args) => commands::venv(
            &args.pex,
            &args.venv,
            args.python.as_deref(),
            args.pip,
            args.force,
            CollisionPolicy::from(args.collisions_ok),
            printer,
        ),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code.into(),
        Err(err) => {
            let mut causes = err.chain();
            if let Some(err) = causes.next() {
                eprintln!("{}: {}", "error".red().bold(), err);
            }
            for err in causes {
                eprintln!("  {}: {}", "Caused by".red().bold(), err);
            }
            ExitStatus::Error.into()
        }
    }
}
