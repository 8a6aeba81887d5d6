use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Style};
use clap::builder::Styles;
use clap::{Args, Parser, Subcommand};

use pex_static::EnvVars;

// Configures Clap v3-style help menu colors
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default())
    .invalid(Style::new().effects(Effects::BOLD))
    .error(AnsiColor::Red.on_default().effects(Effects::BOLD));

#[derive(Parser)]
#[command(name = "pex-tools", author, version)]
#[command(about = "Tools for working with PEX files.")]
#[command(propagate_version = true)]
#[command(styles = STYLES)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use verbose output.
    ///
    /// You can configure fine-grained logging using the `RUST_LOG` environment variable.
    /// (<https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives>)
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Disable colors.
    #[arg(global = true, long, hide = true, conflicts_with = "color")]
    pub no_color: bool,

    /// Control colors in output.
    #[arg(
        global = true,
        long,
        value_enum,
        default_value = "auto",
        conflicts_with = "no_color",
        value_name = "COLOR_CHOICE"
    )]
    pub color: ColorChoice,
}

#[derive(Debug, Copy, Clone, clap::ValueEnum)]
pub enum ColorChoice {
    /// Enables colored output only when the output is going to a terminal or TTY with support.
    Auto,

    /// Enables colored output regardless of the detected environment.
    Always,

    /// Disables colored output.
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a virtual environment from a PEX.
    ///
    /// Every distribution the PEX bundles is installed into the virtual environment. With
    /// `--pip`, pip and setuptools are installed too; if the PEX bundles different versions of
    /// them than the virtual environment already holds, the command fails unless
    /// `--collisions-ok` is given.
    Venv(VenvArgs),
}

#[derive(Args)]
pub struct VenvArgs {
    /// The PEX to create the virtual environment from.
    ///
    /// Either a zipapp PEX file or a PEX directory.
    #[arg(long, env = EnvVars::PEX_TOOLS_PEX, value_name = "PEX")]
    pub pex: PathBuf,

    /// The Python interpreter to create the virtual environment with.
    ///
    /// Either a path or the name of an executable on `PATH`, like `python3.12`. Defaults to the
    /// first of `python3` and `python` on `PATH`.
    #[arg(long, short, env = EnvVars::PEX_PYTHON)]
    pub python: Option<String>,

    /// Install pip and setuptools into the virtual environment.
    #[arg(
        long,
        env = EnvVars::PEX_TOOLS_PIP,
        value_parser = clap::builder::BoolishValueParser::new(),
    )]
    pub pip: bool,

    /// Remove the target directory, if it exists, before creating the virtual environment.
    #[arg(
        long,
        short,
        env = EnvVars::PEX_TOOLS_FORCE,
        value_parser = clap::builder::BoolishValueParser::new(),
    )]
    pub force: bool,

    /// Replace packages in the virtual environment that collide with the PEX's versions.
    ///
    /// Without this flag, a collision between a package installed by `--pip` and a different
    /// version bundled in the PEX aborts the command without changing the virtual environment.
    #[arg(
        long,
        env = EnvVars::PEX_COLLISIONS_OK,
        value_parser = clap::builder::BoolishValueParser::new(),
    )]
    pub collisions_ok: bool,

    /// The directory to create the virtual environment in.
    #[arg(value_name = "VENV_DIR")]
    pub venv: PathBuf,
}
