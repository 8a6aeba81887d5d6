//! Package names, compared in their normalized form.

use thiserror::Error;

pub use package_name::PackageName;

mod package_name;

/// A string that isn't a valid package name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "`{0}` is not a valid package name: names start and end with a letter or digit, and may only contain letters, digits, `-`, `_` and `.`"
)]
pub struct InvalidNameError(String);

const fn is_separator(byte: u8) -> bool {
    matches!(byte, b'-' | b'_' | b'.')
}

/// Lowercase the name and collapse each run of separators into a single `-`.
pub(crate) fn normalize(name: &str) -> Result<String, InvalidNameError> {
    let bytes = name.as_bytes();
    let valid = bytes
        .iter()
        .all(|&byte| byte.is_ascii_alphanumeric() || is_separator(byte))
        && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && bytes.last().is_some_and(u8::is_ascii_alphanumeric);
    if !valid {
        return Err(InvalidNameError(name.to_string()));
    }

    Ok(name
        .split(|c: char| c.is_ascii() && is_separator(c as u8))
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-"))
}

/// Returns `true` if the name is valid and already in its normalized form.
pub(crate) fn is_normalized(name: &str) -> bool {
    normalize(name).is_ok_and(|normalized| normalized == name)
}
