//! Traits for the collaborators of collision resolution: the target [`Environment`] and the
//! [`Installer`] that mutates it.

use std::error::Error;
use std::path::{Path, PathBuf};

use thiserror::Error;

use pex_distribution_types::{AmbiguousSourceError, DistributionIndex, Version};
use pex_normalize::PackageName;

/// A target environment whose installed packages can be inspected.
pub trait Environment {
    /// The root directory of the environment, used to name it in diagnostics.
    fn root(&self) -> &Path;

    /// Index the installed distributions by reading their metadata, without executing anything.
    fn inspect(&self) -> Result<DistributionIndex, ProbeError>;

    /// Ask the environment's interpreter, in a fresh process, which version of the package it
    /// imports. Expected to agree with [`Environment::inspect`].
    fn reported_version(&self, name: &PackageName) -> Result<Version, ProbeError>;
}

/// Installs and uninstalls distributions in an [`Environment`].
pub trait Installer<E: Environment> {
    type Error: Error + Send + Sync + 'static;

    /// Remove the installed distribution of the given package.
    fn uninstall(&self, environment: &E, name: &PackageName) -> Result<(), Self::Error>;

    /// Install the given version of the package.
    fn install(
        &self,
        environment: &E,
        name: &PackageName,
        version: &Version,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("`{name}` is not installed in the environment at `{}`", root.display())]
    PackageNotFound { name: PackageName, root: PathBuf },
    #[error("Failed to probe the environment at `{}`", root.display())]
    EnvironmentProbe {
        root: PathBuf,
        #[source]
        err: Box<dyn Error + Send + Sync>,
    },
    #[error("The environment at `{}` is ambiguous", root.display())]
    AmbiguousSource {
        root: PathBuf,
        #[source]
        err: AmbiguousSourceError,
    },
}

impl ProbeError {
    pub fn probe(root: impl Into<PathBuf>, err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::EnvironmentProbe {
            root: root.into(),
            err: err.into(),
        }
    }
}
