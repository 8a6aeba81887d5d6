use std::process::Command;
use std::str::FromStr;

use tracing::{debug, trace};

use pex_distribution_types::{DistributionIndex, Version};
use pex_normalize::PackageName;
use pex_types::{Environment, ProbeError};

use crate::{Error, Virtualenv};

/// Imports the module named by the first argument and prints its `__version__`.
///
/// Exits with status 3 if the module itself cannot be found.
const REPORT_VERSION: &str = include_str!("report_version.py");

/// The exit status of [`REPORT_VERSION`] for a module that isn't installed.
const MODULE_NOT_FOUND: i32 = 3;

impl Environment for Virtualenv {
    fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn inspect(&self) -> Result<DistributionIndex, ProbeError> {
        let installed = self
            .installed()
            .map_err(|err| ProbeError::probe(&self.root, err))?;
        let index = DistributionIndex::build(installed.iter().map(|dist| dist.to_record()))
            .map_err(|err| ProbeError::AmbiguousSource {
                root: self.root.clone(),
                err,
            })?;
        debug!(
            "Found {} distributions in `{}`",
            index.len(),
            self.site_packages.display()
        );
        Ok(index)
    }

    fn reported_version(&self, name: &PackageName) -> Result<Version, ProbeError> {
        let module = name.as_dist_info_name();
        trace!("Asking `{}` for the version of `{module}`", self.executable.display());

        // Isolated mode (`-I`) keeps the working directory, `PYTHONPATH` and the user
        // `site-packages` off `sys.path`.
        let output = Command::new(&self.executable)
            .arg("-I")
            .arg("-c")
            .arg(REPORT_VERSION)
            .arg(&*module)
            .current_dir(&self.root)
            .output()
            .map_err(|err| {
                ProbeError::probe(
                    &self.root,
                    Error::Spawn {
                        command: format!("-I -c <report version> {module}"),
                        interpreter: self.executable.clone(),
                        err,
                    },
                )
            })?;

        if output.status.code() == Some(MODULE_NOT_FOUND) {
            return Err(ProbeError::PackageNotFound {
                name: name.clone(),
                root: self.root.clone(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(ProbeError::probe(
                &self.root,
                Error::Subprocess {
                    message: format!(
                        "Failed to query the version of `{name}` (exit status: {})",
                        output.status
                    ),
                    stdout,
                    stderr,
                },
            ));
        }

        let version = Version::from_str(&stdout).map_err(|err| {
            ProbeError::probe(
                &self.root,
                Error::Subprocess {
                    message: format!("`{name}` reported an invalid version: {err}"),
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                },
            )
        })?;
        debug!("`{name}` reports version {version}");
        Ok(version)
    }
}
