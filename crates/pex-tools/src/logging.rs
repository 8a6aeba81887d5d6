//! Internal logging for developers, enabled by `-v` and tuned with `RUST_LOG`.
//!
//! User-facing output goes through the [`crate::printer::Printer`] and `warn_user!` instead.

use std::fmt;

use anstream::ColorChoice;
use anyhow::Context;
use jiff::Timestamp;
use owo_colors::{OwoColorize, Style};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_tree::time::Uptime;
use tracing_tree::HierarchicalLayer;

/// How much internal logging to show, from the number of `--verbose` flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    /// Nothing, unless `RUST_LOG` says otherwise.
    #[default]
    Default,
    /// Debug messages of the `pex-*` crates, with timestamps.
    Verbose,
    /// As [`Level::Verbose`], as an indented span tree with uptimes and targets.
    ExtraVerbose,
}

impl From<u8> for Level {
    fn from(verbose: u8) -> Self {
        match verbose {
            0 => Self::Default,
            1 => Self::Verbose,
            _ => Self::ExtraVerbose,
        }
    }
}

impl Level {
    /// The filter used when `RUST_LOG` isn't set.
    fn default_directive(self) -> anyhow::Result<Directive> {
        match self {
            Self::Default => Ok(LevelFilter::OFF.into()),
            // Targets match by prefix, so this covers every `pex_*` crate.
            Self::Verbose | Self::ExtraVerbose => "pex=debug"
                .parse()
                .context("Invalid default logging directive"),
        }
    }
}

/// Formats an event as `[<timestamp>] <LEVEL> <message>`.
struct PexFormat {
    timestamps: bool,
}

impl<S, N> FormatEvent<S, N> for PexFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();
        let level = *event.metadata().level();

        if self.timestamps {
            let now = Timestamp::now();
            if ansi {
                write!(writer, "{} ", now.dimmed())?;
            } else {
                write!(writer, "{now} ")?;
            }
        }

        if ansi {
            write!(writer, "{} ", level.style(level_style(level)))?;
        } else {
            write!(writer, "{level} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The colors `tracing-subscriber` uses for each level.
fn level_style(level: tracing::Level) -> Style {
    match level {
        tracing::Level::TRACE => Style::new().purple(),
        tracing::Level::DEBUG => Style::new().blue(),
        tracing::Level::INFO => Style::new().green(),
        tracing::Level::WARN => Style::new().yellow(),
        tracing::Level::ERROR => Style::new().red(),
    }
}

/// Whether stderr gets ANSI escapes, following the global `--color` choice.
fn stderr_ansi() -> bool {
    !matches!(
        anstream::Stderr::choice(&std::io::stderr()),
        ColorChoice::Never
    )
}

/// Install the global `tracing` subscriber for the given [`Level`]. `RUST_LOG` replaces the
/// level's default filter.
pub(crate) fn setup_logging(level: Level) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.default_directive()?)
        .from_env()
        .context("Invalid RUST_LOG directives")?;

    let registry = tracing_subscriber::registry();
    if level == Level::ExtraVerbose {
        registry
            .with(
                HierarchicalLayer::default()
                    .with_targets(true)
                    .with_timer(Uptime::default())
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init()?;
    } else {
        let format = PexFormat {
            timestamps: level == Level::Verbose,
        };
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(format)
                    .with_writer(std::io::stderr)
                    .with_ansi(stderr_ansi())
                    .with_filter(filter),
            )
            .try_init()?;
    }

    Ok(())
}
