use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use cfg::PyVenvConfiguration;
pub use python::find_python;
pub use virtualenv::{OnExisting, Virtualenv};

mod cfg;
mod probe;
mod python;
mod virtualenv;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Expected `{}` to be a virtual environment, but `pyvenv.cfg` is missing", .0.display())]
    MissingPyVenvCfg(PathBuf),
    #[error("The virtual environment at `{}` has no Python interpreter at `{}`", .0.display(), .1.display())]
    MissingInterpreter(PathBuf, PathBuf),
    #[error("The virtual environment at `{}` has no `site-packages` directory", .0.display())]
    MissingSitePackages(PathBuf),
    #[error("The directory `{}` exists and is not a virtual environment. Use `--force` to replace it", .0.display())]
    Exists(PathBuf),
    #[error("Failed to find a Python interpreter for `{0}`")]
    PythonNotFound(String, #[source] which::Error),
    #[error("Failed to run `{command}` with `{}`", interpreter.display())]
    Spawn {
        command: String,
        interpreter: PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("{message}:\n--- stdout:\n{stdout}\n--- stderr:\n{stderr}\n---")]
    Subprocess {
        message: String,
        stdout: String,
        stderr: String,
    },
    #[error(transparent)]
    InstalledDist(#[from] pex_distribution_types::InstalledDistError),
}
