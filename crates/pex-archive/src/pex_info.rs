use indexmap::IndexMap;
use serde::Deserialize;

/// The subset of a PEX's `PEX-INFO` manifest needed to materialize a venv.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PexInfo {
    /// The bundled distributions, keyed by wheel file name, mapped to their content fingerprint.
    #[serde(default)]
    pub distributions: IndexMap<String, String>,
    /// Whether each `.deps/` entry is a wheel file rather than an installed chroot, as written
    /// by `pex --no-pre-install-wheels`.
    #[serde(default)]
    pub deps_are_wheel_files: bool,
}

impl PexInfo {
    pub const FILENAME: &'static str = "PEX-INFO";

    /// The directory under which the distribution chroots live.
    pub const DEPS_DIR: &'static str = ".deps";

    pub fn parse(contents: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(contents)
    }
}
