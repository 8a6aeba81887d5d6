use std::fmt::{Display, Formatter};
use std::str::FromStr;

use pep440_rs::Version;
use thiserror::Error;

use pex_normalize::{InvalidNameError, PackageName};

/// A parsed wheel file name, e.g., `pip-23.1.2-py3-none-any.whl`.
///
/// PEXes key their bundled distributions by the file name of the wheel each one was installed
/// from, so this is how a PEX says which version of a package it carries.
///
/// See: <https://packaging.python.org/en/latest/specifications/binary-distribution-format/#file-name-convention>
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WheelFilename {
    pub name: PackageName,
    pub version: Version,
    pub build_tag: Option<String>,
    pub python_tag: Vec<String>,
    pub abi_tag: Vec<String>,
    pub platform_tag: Vec<String>,
}

impl WheelFilename {
    /// The `.dist-info` directory name the wheel installs, e.g., `pip-23.1.2.dist-info`.
    pub fn dist_info_dir(&self) -> String {
        format!("{}-{}.dist-info", self.name.as_dist_info_name(), self.version)
    }

    /// The `.data` directory name the wheel may carry, e.g., `pip-23.1.2.data`.
    pub fn data_dir(&self) -> String {
        format!("{}-{}.data", self.name.as_dist_info_name(), self.version)
    }
}

impl FromStr for WheelFilename {
    type Err = WheelFilenameError;

    fn from_str(filename: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| {
            WheelFilenameError::InvalidWheelFileName(filename.to_string(), reason.to_string())
        };

        let stem = filename
            .strip_suffix(".whl")
            .ok_or_else(|| invalid("Must end with .whl"))?;

        // Five components, or six if a build tag sits between the version and the Python tag.
        let parts: Vec<&str> = stem.split('-').collect();
        let (name, version, build_tag, python_tag, abi_tag, platform_tag) = match parts.as_slice()
        {
            [name, version, python, abi, platform] => {
                (*name, *version, None, *python, *abi, *platform)
            }
            [name, version, build, python, abi, platform] => {
                if !build.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(invalid("The build tag must start with a digit"));
                }
                (*name, *version, Some(*build), *python, *abi, *platform)
            }
            [_] => return Err(invalid("Must have a version")),
            [_, _] => return Err(invalid("Must have a Python tag")),
            [_, _, _] => return Err(invalid("Must have an ABI tag")),
            [_, _, _, _] => return Err(invalid("Must have a platform tag")),
            _ => return Err(invalid("Must have 5 or 6 components, but has more")),
        };

        let name = PackageName::from_str(name)
            .map_err(|err| WheelFilenameError::InvalidPackageName(filename.to_string(), err))?;
        let version = Version::from_str(version)
            .map_err(|err| WheelFilenameError::InvalidVersion(filename.to_string(), err.to_string()))?;

        let tags = |tag: &str| tag.split('.').map(String::from).collect::<Vec<_>>();

        Ok(Self {
            name,
            version,
            build_tag: build_tag.map(String::from),
            python_tag: tags(python_tag),
            abi_tag: tags(abi_tag),
            platform_tag: tags(platform_tag),
        })
    }
}

impl Display for WheelFilename {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name.as_dist_info_name(), self.version)?;
        if let Some(build_tag) = &self.build_tag {
            write!(f, "-{build_tag}")?;
        }
        write!(
            f,
            "-{}-{}-{}.whl",
            self.python_tag.join("."),
            self.abi_tag.join("."),
            self.platform_tag.join(".")
        )
    }
}

#[derive(Error, Debug)]
pub enum WheelFilenameError {
    #[error("The wheel filename \"{0}\" is invalid: {1}")]
    InvalidWheelFileName(String, String),
    #[error("The wheel filename \"{0}\" has an invalid version part: {1}")]
    InvalidVersion(String, String),
    #[error("The wheel filename \"{0}\" has an invalid package name")]
    InvalidPackageName(String, #[source] InvalidNameError),
}
