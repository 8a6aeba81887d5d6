use pex_distribution_types::{DistributionIndex, Version};
use pex_normalize::PackageName;
use tracing::debug;

use crate::ManagedPackages;

/// A managed package installed in the environment at a different version than the PEX bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub name: PackageName,
    /// The version installed in the environment.
    pub environment: Version,
    /// The version bundled in the PEX.
    pub archive: Version,
}

/// The conflicts of a request, in the declaration order of its managed packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conflicts(Vec<Conflict>);

impl Conflicts {
    pub fn iter(&self) -> std::slice::Iter<'_, Conflict> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Conflicts {
    type Item = &'a Conflict;
    type IntoIter = std::slice::Iter<'a, Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Conflict> for Conflicts {
    fn from_iter<T: IntoIterator<Item = Conflict>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compare the environment against the PEX for each managed package.
///
/// A package missing from either side can't conflict.
pub fn detect(
    managed: &ManagedPackages,
    environment: &DistributionIndex,
    archive: &DistributionIndex,
) -> Conflicts {
    managed
        .iter()
        .filter_map(|name| {
            let (Some(installed), Some(bundled)) = (environment.get(name), archive.get(name))
            else {
                return None;
            };
            if installed == bundled {
                debug!("`{name}` is at {installed} in both the environment and the PEX");
                return None;
            }
            debug!("`{name}` is at {installed} in the environment but {bundled} in the PEX");
            Some(Conflict {
                name: name.clone(),
                environment: installed.clone(),
                archive: bundled.clone(),
            })
        })
        .collect()
}

/// Find the distributions the PEX bundles, outside the managed packages, that the environment
/// already has at a different version. Replacing them needs the same authorization as a
/// collision.
pub fn detect_outdated(
    managed: &ManagedPackages,
    environment: &DistributionIndex,
    archive: &DistributionIndex,
) -> Conflicts {
    archive
        .iter()
        .filter(|(name, _)| !managed.contains(name))
        .filter_map(|(name, bundled)| {
            let installed = environment.get(name)?;
            if installed == bundled {
                return None;
            }
            debug!("`{name}` is at {installed} in the environment but {bundled} in the PEX");
            Some(Conflict {
                name: name.clone(),
                environment: installed.clone(),
                archive: bundled.clone(),
            })
        })
        .collect()
}
