use std::borrow::Cow;
use std::str::FromStr;

use crate::{InvalidNameError, is_normalized, normalize};

/// The normalized name of a package.
///
/// Converts the name to lowercase and collapses runs of `-`, `_`, and `.` down to a single `-`.
/// For example, `---`, `.`, and `__` are all converted to a single `-`, so `Setup_Tools` and
/// `setup.tools` name the same package.
///
/// See: <https://packaging.python.org/en/latest/specifications/name-normalization/>
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Create a name from a literal that is already normalized, like `pip`.
    pub fn from_static(name: &'static str) -> Self {
        debug_assert!(is_normalized(name), "`{name}` is not a normalized package name");
        Self(name.to_string())
    }

    /// Escape this name with underscores (`_`) instead of dashes (`-`).
    ///
    /// This is the spelling used in `.dist-info` directory names and, for the packages this
    /// tool manages, the name of the top-level import package.
    ///
    /// See: <https://packaging.python.org/en/latest/specifications/recording-installed-packages/#recording-installed-packages>
    pub fn as_dist_info_name(&self) -> Cow<'_, str> {
        if self.0.contains('-') {
            Cow::Owned(self.0.replace('-', "_"))
        } else {
            Cow::Borrowed(self.0.as_str())
        }
    }

    /// Returns the underlying package name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PackageName {
    type Err = InvalidNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        normalize(name).map(Self)
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
