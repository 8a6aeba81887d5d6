use std::fmt;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, info};

use pex_distribution_types::{DistributionIndex, DistributionRecord, Name, Version};
use pex_normalize::PackageName;
use pex_types::{Environment, Installer, ProbeError};

use crate::{format_abort, format_resolved, Conflicts, ManagedPackages};

/// Whether colliding managed packages may be replaced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Report the collisions and leave the environment untouched.
    #[default]
    Abort,
    /// Uninstall the environment's copies and install the PEX's versions.
    Force,
}

impl From<bool> for CollisionPolicy {
    fn from(collisions_ok: bool) -> Self {
        if collisions_ok {
            Self::Force
        } else {
            Self::Abort
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Nothing collided. Managed packages the environment lacked were installed from the PEX.
    NoConflict { installed: Vec<DistributionRecord> },
    /// Something collided and the request wasn't forced. The environment is unchanged.
    ConflictReportedAborted { message: String },
    /// Something collided and the PEX's versions were installed in place of the environment's.
    ConflictResolvedForced {
        message: String,
        installed: Vec<DistributionRecord>,
    },
}

impl ResolutionOutcome {
    /// The diagnostic to show the user, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::NoConflict { .. } => None,
            Self::ConflictReportedAborted { message }
            | Self::ConflictResolvedForced { message, .. } => Some(message),
        }
    }

    /// The distributions installed while resolving.
    pub fn installed(&self) -> &[DistributionRecord] {
        match self {
            Self::NoConflict { installed } | Self::ConflictResolvedForced { installed, .. } => {
                installed
            }
            Self::ConflictReportedAborted { .. } => &[],
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::ConflictReportedAborted { .. })
    }
}

#[derive(Debug, Error)]
pub enum ResolveError<E> {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("Failed to uninstall `{name}`")]
    Uninstall {
        name: PackageName,
        #[source]
        err: E,
    },
    #[error("Failed to install `{name}=={version}`")]
    Install {
        name: PackageName,
        version: Version,
        #[source]
        err: E,
    },
    #[error(transparent)]
    Verification(#[from] ResolutionVerificationError),
}

/// A managed package whose installed version differs from the PEX's after installing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub name: PackageName,
    pub expected: Version,
    /// The version found in the environment, if any.
    pub found: Option<Version>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(f, "{} {found} (expected {})", self.name, self.expected),
            None => write!(f, "{} is missing (expected {})", self.name, self.expected),
        }
    }
}

/// The environment doesn't hold the PEX's versions after they were installed, and needs to be
/// repaired by hand.
#[derive(Debug, Error)]
#[error(
    "The venv at `{}` does not match the PEX after installing its versions: {}",
    root.display(),
    mismatches.iter().join(", ")
)]
pub struct ResolutionVerificationError {
    pub root: PathBuf,
    pub mismatches: Vec<Mismatch>,
}

/// Apply the collision policy to the detected conflicts.
///
/// Without conflicts, each managed package the environment lacks is installed from the PEX.
/// With conflicts and [`CollisionPolicy::Abort`], nothing is changed. With conflicts and
/// [`CollisionPolicy::Force`], every managed package present in both the environment and the
/// PEX is uninstalled, and only then is every managed package the PEX bundles installed.
/// Managed packages the PEX doesn't bundle are left as they are.
///
/// Any installation is followed by re-inspecting the environment and checking that each
/// installed package is at the PEX's version.
pub fn resolve<E: Environment, I: Installer<E>>(
    conflicts: &Conflicts,
    managed: &ManagedPackages,
    archive: &DistributionIndex,
    source: &Path,
    environment: &E,
    installer: &I,
    policy: CollisionPolicy,
) -> Result<ResolutionOutcome, ResolveError<I::Error>> {
    let current = environment.inspect()?;

    if conflicts.is_empty() {
        let missing = managed
            .iter()
            .filter(|name| !current.contains(name))
            .filter_map(|name| {
                archive
                    .get(name)
                    .map(|version| DistributionRecord::new(name.clone(), version.clone()))
            })
            .collect::<Vec<_>>();
        install_all(environment, installer, &missing)?;
        if !missing.is_empty() {
            verify(environment, &missing)?;
        }
        return Ok(ResolutionOutcome::NoConflict { installed: missing });
    }

    match policy {
        CollisionPolicy::Abort => {
            info!(
                "Found {} collision(s) in `{}`; leaving it untouched",
                conflicts.len(),
                environment.root().display()
            );
            Ok(ResolutionOutcome::ConflictReportedAborted {
                message: format_abort(
                    environment.root(),
                    source,
                    managed.description(),
                    conflicts,
                ),
            })
        }
        CollisionPolicy::Force => {
            let message = format_resolved(
                environment.root(),
                source,
                managed.description(),
                conflicts,
            );

            let replacements = managed
                .iter()
                .filter_map(|name| {
                    archive
                        .get(name)
                        .map(|version| DistributionRecord::new(name.clone(), version.clone()))
                })
                .collect::<Vec<_>>();

            for record in &replacements {
                let name = record.name();
                if let Some(installed) = current.get(name) {
                    debug!("Uninstalling {name} {installed}");
                    installer
                        .uninstall(environment, name)
                        .map_err(|err| ResolveError::Uninstall {
                            name: name.clone(),
                            err,
                        })?;
                }
            }
            install_all(environment, installer, &replacements)?;
            verify(environment, &replacements)?;

            Ok(ResolutionOutcome::ConflictResolvedForced {
                message,
                installed: replacements,
            })
        }
    }
}

fn install_all<E: Environment, I: Installer<E>>(
    environment: &E,
    installer: &I,
    records: &[DistributionRecord],
) -> Result<(), ResolveError<I::Error>> {
    for record in records {
        let name = record.name();
        let version = record.version();
        debug!("Installing {name} {version}");
        installer
            .install(environment, name, version)
            .map_err(|err| ResolveError::Install {
                name: name.clone(),
                version: version.clone(),
                err,
            })?;
    }
    Ok(())
}

/// Re-inspect the environment and check that each record is installed at its version.
fn verify<E: Environment, T>(
    environment: &E,
    expected: &[DistributionRecord],
) -> Result<(), ResolveError<T>> {
    let after = environment.inspect()?;

    let mismatches = expected
        .iter()
        .filter_map(|record| {
            let name = record.name();
            let found = after.get(name);
            (found != Some(record.version())).then(|| Mismatch {
                name: name.clone(),
                expected: record.version().clone(),
                found: found.cloned(),
            })
        })
        .collect::<Vec<_>>();

    if mismatches.is_empty() {
        debug!(
            "Verified {} package(s) in `{}`",
            expected.len(),
            environment.root().display()
        );
        Ok(())
    } else {
        Err(ResolveError::Verification(ResolutionVerificationError {
            root: environment.root().to_path_buf(),
            mismatches,
        }))
    }
}
