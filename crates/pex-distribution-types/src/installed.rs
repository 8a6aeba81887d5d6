use std::path::{Path, PathBuf};
use std::str::FromStr;

use pep440_rs::Version;
use thiserror::Error;

use pex_normalize::{InvalidNameError, PackageName};

use crate::{DistributionRecord, Name};

/// A distribution installed in an environment, identified by its `.dist-info` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDist {
    pub name: PackageName,
    pub version: Version,
    pub path: PathBuf,
}

impl InstalledDist {
    /// Try to parse a distribution from a `.dist-info` directory name (like `pip-23.1.dist-info`).
    ///
    /// Returns `None` for anything that isn't a `.dist-info` directory.
    ///
    /// See: <https://packaging.python.org/en/latest/specifications/recording-installed-packages/#recording-installed-packages>
    pub fn try_from_path(path: &Path) -> Result<Option<Self>, InstalledDistError> {
        if !path.extension().is_some_and(|ext| ext == "dist-info") {
            return Ok(None);
        }
        let Some(file_stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return Ok(None);
        };
        let Some((name, version)) = file_stem.split_once('-') else {
            return Err(InstalledDistError::MissingVersion(path.to_path_buf()));
        };

        let name = PackageName::from_str(name)
            .map_err(|err| InstalledDistError::InvalidName(path.to_path_buf(), err))?;
        let version = Version::from_str(version).map_err(|err| {
            InstalledDistError::InvalidVersion(path.to_path_buf(), err.to_string())
        })?;

        Ok(Some(Self {
            name,
            version,
            path: path.to_path_buf(),
        }))
    }

    /// Return the [`Path`] of the `.dist-info` directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_record(&self) -> DistributionRecord {
        DistributionRecord::new(self.name.clone(), self.version.clone())
    }
}

impl Name for InstalledDist {
    fn name(&self) -> &PackageName {
        &self.name
    }
}

#[derive(Error, Debug)]
pub enum InstalledDistError {
    #[error("The `.dist-info` directory `{}` is missing a version", .0.display())]
    MissingVersion(PathBuf),
    #[error("The `.dist-info` directory `{}` has an invalid package name", .0.display())]
    InvalidName(PathBuf, #[source] InvalidNameError),
    #[error("The `.dist-info` directory `{}` has an invalid version: {}", .0.display(), .1)]
    InvalidVersion(PathBuf, String),
}
