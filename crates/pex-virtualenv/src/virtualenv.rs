use std::env::consts::EXE_SUFFIX;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use fs_err as fs;
use owo_colors::OwoColorize;
use tracing::{debug, info};

use pex_distribution_types::InstalledDist;
use pex_warnings::warn_user_once;

use crate::cfg::PyVenvConfiguration;
use crate::Error;

/// What to do when the target of [`Virtualenv::create`] already exists.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OnExisting {
    /// Reuse an existing virtual environment or an empty directory; refuse anything else.
    #[default]
    Fail,
    /// Remove whatever is there and start fresh.
    Remove,
}

/// A Python virtual environment on disk.
#[derive(Debug, Clone)]
pub struct Virtualenv {
    pub(crate) root: PathBuf,
    pub(crate) executable: PathBuf,
    pub(crate) site_packages: PathBuf,
    pub(crate) scripts: PathBuf,
    pub(crate) cfg: PyVenvConfiguration,
}

impl Virtualenv {
    /// Locate an existing virtual environment at `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        let cfg_path = root.join("pyvenv.cfg");
        if !cfg_path.is_file() {
            return Err(Error::MissingPyVenvCfg(root));
        }
        let cfg = PyVenvConfiguration::parse(&cfg_path)?;

        let scripts = bin_dir(&root);
        let executable = scripts.join(format!("python{EXE_SUFFIX}"));
        if !executable.exists() {
            return Err(Error::MissingInterpreter(root, executable));
        }

        let site_packages = find_site_packages(&root, &cfg)?
            .ok_or_else(|| Error::MissingSitePackages(root.clone()))?;

        debug!(
            "Found virtual environment at `{}` with `site-packages` at `{}`",
            root.display(),
            site_packages.display()
        );

        Ok(Self {
            root,
            executable,
            site_packages,
            scripts,
            cfg,
        })
    }

    /// Create a virtual environment at `root` using the given base interpreter, without seeding
    /// any packages into it.
    pub fn create(
        root: impl Into<PathBuf>,
        python: &Path,
        on_existing: OnExisting,
    ) -> Result<Self, Error> {
        let root = root.into();

        if root.exists() {
            match on_existing {
                OnExisting::Remove => {
                    info!("Removing existing directory at `{}`", root.display());
                    if root.is_dir() {
                        fs::remove_dir_all(&root)?;
                    } else {
                        fs::remove_file(&root)?;
                    }
                }
                OnExisting::Fail => {
                    if root.join("pyvenv.cfg").is_file() {
                        debug!("Reusing virtual environment at `{}`", root.display());
                        return Self::from_root(root);
                    }
                    if !root.is_dir() || fs::read_dir(&root)?.next().is_some() {
                        return Err(Error::Exists(root));
                    }
                }
            }
        }

        info!(
            "Creating virtual environment at `{}` with `{}`",
            root.display(),
            python.display()
        );
        run(
            python,
            [
                OsStr::new("-m"),
                OsStr::new("venv"),
                OsStr::new("--without-pip"),
                root.as_os_str(),
            ],
            "Failed to create the virtual environment",
        )?;

        Self::from_root(root)
    }

    /// Seed pip into the environment from the interpreter's bundled wheels.
    pub fn install_pip(&self) -> Result<(), Error> {
        info!("Seeding pip into `{}`", self.root.display());
        run(
            &self.executable,
            ["-m", "ensurepip", "--default-pip"],
            "Failed to install pip",
        )?;
        Ok(())
    }

    /// The root directory of the environment.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The environment's Python interpreter.
    pub fn python_executable(&self) -> &Path {
        &self.executable
    }

    pub fn site_packages(&self) -> &Path {
        &self.site_packages
    }

    /// The directory console scripts are installed into (`bin` or `Scripts`).
    pub fn scripts(&self) -> &Path {
        &self.scripts
    }

    pub fn cfg(&self) -> &PyVenvConfiguration {
        &self.cfg
    }

    /// Read the distributions installed in `site-packages`, ordered by `.dist-info` path.
    pub fn installed(&self) -> Result<Vec<InstalledDist>, Error> {
        let mut paths = match fs::read_dir(&self.site_packages) {
            Ok(entries) => entries
                .filter_map(|entry| match entry {
                    Ok(entry) => match entry.file_type() {
                        Ok(file_type) => file_type.is_dir().then_some(Ok(entry.path())),
                        Err(err) => Some(Err(err)),
                    },
                    Err(err) => Some(Err(err)),
                })
                .collect::<Result<Vec<_>, io::Error>>()?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        paths.sort();

        let mut installed = Vec::new();
        for path in paths {
            match InstalledDist::try_from_path(&path) {
                Ok(Some(dist)) => installed.push(dist),
                Ok(None) if path.extension().is_some_and(|ext| ext == "egg-info") => {
                    warn_user_once!(
                        "Ignoring `{}`: distributions without a `.dist-info` directory are not checked against the PEX",
                        path.display().cyan()
                    );
                }
                Ok(None) => {}
                Err(_)
                    if path
                        .file_name()
                        .and_then(OsStr::to_str)
                        .is_some_and(|name| name.starts_with('~')) =>
                {
                    warn_user_once!(
                        "Ignoring dangling temporary directory: `{}`",
                        path.display().cyan()
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(installed)
    }
}

/// Returns the directory in which executables are stored within the environment.
fn bin_dir(root: &Path) -> PathBuf {
    if cfg!(windows) {
        root.join("Scripts")
    } else {
        root.join("bin")
    }
}

/// Locate `site-packages`, trying the recorded interpreter version before scanning `lib`.
fn find_site_packages(root: &Path, cfg: &PyVenvConfiguration) -> Result<Option<PathBuf>, Error> {
    if cfg!(windows) {
        let site_packages = root.join("Lib").join("site-packages");
        return Ok(site_packages.is_dir().then_some(site_packages));
    }

    let lib = root.join("lib");
    if let Some((major, minor)) = cfg.python_tuple() {
        let site_packages = lib
            .join(format!("python{major}.{minor}"))
            .join("site-packages");
        if site_packages.is_dir() {
            return Ok(Some(site_packages));
        }
    }

    // PyPy and free-threaded builds use other directory names, e.g. `pypy3.10` or `python3.13t`.
    let entries = match fs::read_dir(&lib) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_python = path
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| name.starts_with("python") || name.starts_with("pypy"));
        if is_python && path.join("site-packages").is_dir() {
            candidates.push(path.join("site-packages"));
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Run the interpreter to completion, failing on a non-zero exit status.
fn run<I, S>(python: &Path, args: I, message: &str) -> Result<Output, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|arg| arg.as_ref().to_os_string())
        .collect();
    let command = args
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running `{} {command}`", python.display());

    let output = Command::new(python)
        .args(&args)
        .output()
        .map_err(|err| Error::Spawn {
            command,
            interpreter: python.to_path_buf(),
            err,
        })?;

    if !output.status.success() {
        return Err(Error::Subprocess {
            message: format!("{message} (exit status: {})", output.status),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}
