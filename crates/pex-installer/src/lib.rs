//! Install the distributions bundled in a PEX into a virtual environment, and uninstall
//! installed distributions by their `RECORD`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use pex_distribution_types::Version;
use pex_normalize::PackageName;

pub use install::{install_files, INSTALLER};
pub use installer::ArchiveInstaller;
pub use record::{read_record_file, RecordEntry};
pub use uninstall::{uninstall_dist, Uninstall};

mod install;
mod installer;
mod record;
mod uninstall;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Archive(#[from] pex_archive::Error),
    #[error(transparent)]
    Virtualenv(#[from] pex_virtualenv::Error),
    #[error("Failed to read or write a `RECORD` file")]
    Csv(#[from] csv::Error),
    #[error("The PEX at `{}` does not bundle `{name}=={version}`", pex.display())]
    NotBundled {
        name: PackageName,
        version: Version,
        pex: PathBuf,
    },
    #[error("`{name}` is not installed in the environment at `{}`", root.display())]
    NotInstalled { name: PackageName, root: PathBuf },
    #[error("Cannot uninstall `{}`: it has no `RECORD` file", .0.display())]
    MissingRecord(PathBuf),
    #[error("The `.dist-info` directory `{}` is not inside a `site-packages` directory", .0.display())]
    BrokenVenv(PathBuf),
    #[error("Could not find a relative path from `{}` to `{}`", .0.display(), .1.display())]
    RelativePath(PathBuf, PathBuf),
}
