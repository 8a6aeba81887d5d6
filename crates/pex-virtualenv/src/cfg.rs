use std::path::Path;

use fs_err as fs;

/// The `pyvenv.cfg` of a virtual environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyVenvConfiguration {
    /// The directory of the interpreter the environment was created from.
    pub home: Option<String>,
    /// The full version of that interpreter, e.g., `3.12.1`.
    pub version: Option<String>,
    pub include_system_site_packages: bool,
}

impl PyVenvConfiguration {
    /// Parse a `pyvenv.cfg` file into a [`PyVenvConfiguration`].
    pub fn parse(cfg: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        Ok(Self::parse_str(&fs::read_to_string(cfg.as_ref())?))
    }

    pub fn parse_str(content: &str) -> Self {
        let mut configuration = Self::default();

        // Per https://snarky.ca/how-virtual-environments-work/, the `pyvenv.cfg` file is not a
        // valid INI file, and is instead expected to be parsed by partitioning each line on the
        // first equals sign.
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "home" => configuration.home = Some(value.to_string()),
                // `venv` writes `version`; `virtualenv` writes `version_info`.
                "version" | "version_info" => {
                    if configuration.version.is_none() {
                        configuration.version = Some(value.to_string());
                    }
                }
                "include-system-site-packages" => {
                    configuration.include_system_site_packages = value.eq_ignore_ascii_case("true");
                }
                _ => {}
            }
        }

        configuration
    }

    /// The `(major, minor)` version of the interpreter, if recorded.
    pub fn python_tuple(&self) -> Option<(u8, u8)> {
        let mut parts = self.version.as_deref()?.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some((major, minor))
    }
}
