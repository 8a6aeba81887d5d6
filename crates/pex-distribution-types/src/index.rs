use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use pep440_rs::Version;
use thiserror::Error;

use pex_normalize::PackageName;

use crate::DistributionRecord;

/// The versions of the packages in a single source, either one environment or one archive.
///
/// A source never holds two copies of the same package at once, so the index maps each
/// [`PackageName`] to exactly one [`Version`]. Iteration is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionIndex(BTreeMap<PackageName, Version>);

impl DistributionIndex {
    /// Build an index from the records reported by one source.
    ///
    /// Fails if any package is reported more than once, even at the same version: the
    /// duplication is the defect.
    pub fn build(
        records: impl IntoIterator<Item = DistributionRecord>,
    ) -> Result<Self, AmbiguousSourceError> {
        let mut index = BTreeMap::new();
        for record in records {
            let (name, version) = record.into_parts();
            match index.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(version);
                }
                Entry::Occupied(entry) => {
                    return Err(AmbiguousSourceError {
                        name: entry.key().clone(),
                        first: entry.get().clone(),
                        second: version,
                    });
                }
            }
        }
        Ok(Self(index))
    }

    /// Returns the version of the given package, if the source contains it.
    pub fn get(&self, name: &PackageName) -> Option<&Version> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &PackageName) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &Version)> {
        self.0.iter()
    }

    /// Returns the index as [`DistributionRecord`]s, ordered by name.
    pub fn records(&self) -> impl Iterator<Item = DistributionRecord> + '_ {
        self.0
            .iter()
            .map(|(name, version)| DistributionRecord::new(name.clone(), version.clone()))
    }

    /// Returns the sub-index containing only the given packages.
    #[must_use]
    pub fn restrict<'a>(&self, names: impl IntoIterator<Item = &'a PackageName>) -> Self {
        Self(
            names
                .into_iter()
                .filter_map(|name| {
                    self.0
                        .get_key_value(name)
                        .map(|(name, version)| (name.clone(), version.clone()))
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a DistributionIndex {
    type Item = (&'a PackageName, &'a Version);
    type IntoIter = std::collections::btree_map::Iter<'a, PackageName, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A source reported more than one distribution for the same package.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Found more than one distribution for `{name}`: {first} and {second}")]
pub struct AmbiguousSourceError {
    name: PackageName,
    first: Version,
    second: Version,
}

impl AmbiguousSourceError {
    /// The package that was reported more than once.
    pub fn name(&self) -> &PackageName {
        &self.name
    }
}
