use indexmap::IndexSet;

use pex_normalize::PackageName;

/// The packages a request asks to have installed alongside the PEX's own distributions, and
/// which are therefore checked for collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPackages {
    /// How the user asked for these packages, e.g., `--pip`.
    description: String,
    /// The packages, in declaration order.
    names: IndexSet<PackageName>,
}

impl ManagedPackages {
    /// Duplicate names are dropped, keeping the first occurrence.
    pub fn new(
        description: impl Into<String>,
        names: impl IntoIterator<Item = PackageName>,
    ) -> Self {
        Self {
            description: description.into(),
            names: names.into_iter().collect(),
        }
    }

    /// The packages seeded by `--pip`: pip itself and its build backend.
    pub fn pip() -> Self {
        Self::new(
            "--pip",
            [
                PackageName::from_static("pip"),
                PackageName::from_static("setuptools"),
            ],
        )
    }

    /// A request that manages nothing, and so never collides.
    pub fn empty() -> Self {
        Self::new(String::new(), [])
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn contains(&self, name: &PackageName) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> IntoIterator for &'a ManagedPackages {
    type Item = &'a PackageName;
    type IntoIter = indexmap::set::Iter<'a, PackageName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
