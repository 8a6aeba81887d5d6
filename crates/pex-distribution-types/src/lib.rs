//! The value types shared by every source of packages: a concrete distribution
//! ([`DistributionRecord`]), the identity-to-version view of one source ([`DistributionIndex`]),
//! and a distribution as it sits on disk in an environment ([`InstalledDist`]).

pub use pep440_rs::Version;

pub use index::{AmbiguousSourceError, DistributionIndex};
pub use installed::{InstalledDist, InstalledDistError};
pub use record::DistributionRecord;

use pex_normalize::PackageName;

mod index;
mod installed;
mod record;

pub trait Name {
    /// Return the normalized [`PackageName`] of the distribution.
    fn name(&self) -> &PackageName;
}
