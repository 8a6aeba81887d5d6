use std::fmt::{Display, Formatter};

use pep440_rs::Version;

use pex_distribution_filename::WheelFilename;
use pex_normalize::PackageName;

use crate::Name;

/// One concrete package instance, installed in an environment or bundled in an archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistributionRecord {
    name: PackageName,
    version: Version,
}

impl DistributionRecord {
    pub fn new(name: PackageName, version: Version) -> Self {
        Self { name, version }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn into_parts(self) -> (PackageName, Version) {
        (self.name, self.version)
    }
}

impl Name for DistributionRecord {
    fn name(&self) -> &PackageName {
        &self.name
    }
}

impl From<WheelFilename> for DistributionRecord {
    fn from(filename: WheelFilename) -> Self {
        Self::new(filename.name, filename.version)
    }
}

impl From<&WheelFilename> for DistributionRecord {
    fn from(filename: &WheelFilename) -> Self {
        Self::new(filename.name.clone(), filename.version.clone())
    }
}

impl Display for DistributionRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
