// The `unreachable_pub` is to silence false positives in RustRover.
#![allow(dead_code, unreachable_pub)]

use std::borrow::BorrowMut;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_fs::fixture::{ChildPath, FileTouch, FileWriteStr, PathChild, PathCreateDir};
use indoc::formatdoc;
use regex::Regex;

use pex_static::EnvVars;

#[doc(hidden)] // Macro and test context only, don't use directly.
pub const INSTA_FILTERS: &[(&str, &str)] = &[
    // Rewrite Windows output to Unix output
    (r"\\([\w\d]|\.)", "/$1"),
    (r"pex-tools\.exe", "pex-tools"),
    (r"Scripts/", "bin/"),
    // Trim end-of-line whitespaces, to allow removing them on save.
    (r"([^\s])[ \t]+(\r?\n)", "$1$2"),
];

/// A temporary directory with helpers to lay out PEXes and virtual environments in it.
pub struct TestContext {
    pub temp_dir: assert_fs::TempDir,

    /// Standard filters for this test context.
    filters: Vec<(String, String)>,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp dir");

        let mut filters = Vec::new();
        filters.extend(
            Self::path_patterns(temp_dir.path())
                .into_iter()
                .map(|pattern| (pattern, "[TEMP_DIR]/".to_string())),
        );
        filters.extend(
            INSTA_FILTERS
                .iter()
                .map(|(pattern, replacement)| ((*pattern).to_string(), (*replacement).to_string())),
        );

        Self { temp_dir, filters }
    }

    /// Generate regex patterns that match the given path, with or without a trailing separator.
    fn path_patterns(path: &Path) -> Vec<String> {
        let mut patterns = Vec::new();
        let display = path.display().to_string();
        // The canonical path may contain the given one, e.g. `/private/var` and `/var`.
        if let Ok(canonical) = dunce_like_canonicalize(path) {
            let canonical = canonical.display().to_string();
            if canonical != display {
                patterns.push(format!(r"{}[\\/]?", regex::escape(&canonical)));
            }
        }
        patterns.push(format!(r"{}[\\/]?", regex::escape(&display)));
        patterns
    }

    /// Shared filters, including the temporary directory.
    pub fn filters(&self) -> Vec<(&str, &str)> {
        self.filters
            .iter()
            .map(|(pattern, replacement)| (pattern.as_str(), replacement.as_str()))
            .collect()
    }

    /// A `pex-tools` command isolated from the caller's environment.
    pub fn command(&self) -> Command {
        let mut command = Command::new(get_bin());
        command
            .current_dir(self.temp_dir.path())
            .env_remove(EnvVars::PEX_TOOLS_PEX)
            .env_remove(EnvVars::PEX_PYTHON)
            .env_remove(EnvVars::PEX_TOOLS_PIP)
            .env_remove(EnvVars::PEX_TOOLS_FORCE)
            .env_remove(EnvVars::PEX_COLLISIONS_OK)
            .env_remove(EnvVars::RUST_LOG)
            .env_remove(EnvVars::FORCE_COLOR)
            .env(EnvVars::NO_COLOR, "1")
            .env(EnvVars::PEX_NO_WRAP, "1");
        command
    }

    /// `pex-tools venv --pex <pex> <venv>`.
    pub fn venv(&self, pex: impl AsRef<Path>, venv: impl AsRef<Path>) -> Command {
        let mut command = self.command();
        command
            .arg("venv")
            .arg("--pex")
            .arg(pex.as_ref())
            .arg(venv.as_ref());
        command
    }

    /// Write a loose PEX whose distributions each provide a top-level module of the same name
    /// that reports its version.
    pub fn loose_pex(&self, name: &str, dists: &[(&str, &str)]) -> ChildPath {
        let pex = self.temp_dir.child(name);
        let distributions = dists
            .iter()
            .map(|(name, version)| format!("\"{name}-{version}-py3-none-any.whl\": \"0000\""))
            .collect::<Vec<_>>()
            .join(",\n    ");
        pex.child("PEX-INFO")
            .write_str(&formatdoc! {r#"
                {{
                  "distributions": {{
                    {distributions}
                  }}
                }}
            "#})
            .expect("Failed to write PEX-INFO");
        pex.child("__main__.py").touch().expect("Failed to write __main__.py");
        for (name, version) in dists {
            let chroot = pex.child(format!(".deps/{name}-{version}-py3-none-any.whl"));
            chroot
                .child(format!("{name}/__init__.py"))
                .write_str(&format!("__version__ = \"{version}\"\n"))
                .expect("Failed to write module");
            chroot
                .child(format!("{name}-{version}.dist-info/METADATA"))
                .write_str(&format!(
                    "Metadata-Version: 2.1\nName: {name}\nVersion: {version}\n"
                ))
                .expect("Failed to write METADATA");
        }
        pex
    }

    /// Lay out a virtual environment without running Python, with the given distributions
    /// installed as if by pip. Its interpreter is a placeholder that can't be run.
    pub fn fake_venv(&self, name: &str, installed: &[(&str, &str)]) -> ChildPath {
        let venv = self.temp_dir.child(name);
        venv.child("pyvenv.cfg")
            .write_str("home = /usr/bin\ninclude-system-site-packages = false\nversion = 3.12.1\n")
            .expect("Failed to write pyvenv.cfg");
        venv.child(python_executable())
            .touch()
            .expect("Failed to write interpreter");
        let site_packages = venv.child(site_packages());
        site_packages
            .create_dir_all()
            .expect("Failed to create site-packages");
        for (name, version) in installed {
            let dist_info = format!("{name}-{version}.dist-info");
            site_packages
                .child(format!("{name}/__init__.py"))
                .write_str(&format!("__version__ = \"{version}\"\n"))
                .expect("Failed to write module");
            site_packages
                .child(format!("{dist_info}/METADATA"))
                .write_str(&format!("Name: {name}\nVersion: {version}\n"))
                .expect("Failed to write METADATA");
            site_packages
                .child(format!("{dist_info}/INSTALLER"))
                .write_str("pip\n")
                .expect("Failed to write INSTALLER");
            site_packages
                .child(format!("{dist_info}/RECORD"))
                .write_str(&formatdoc! {"
                    {name}/__init__.py,,
                    {dist_info}/METADATA,,
                    {dist_info}/INSTALLER,,
                    {dist_info}/RECORD,,
                "})
                .expect("Failed to write RECORD");
        }
        venv
    }
}

/// The interpreter of a virtual environment, relative to its root.
pub fn python_executable() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("Scripts").join("python.exe")
    } else {
        PathBuf::from("bin").join("python")
    }
}

/// The `site-packages` of a Python 3.12 virtual environment, relative to its root.
pub fn site_packages() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("Lib").join("site-packages")
    } else {
        PathBuf::from("lib").join("python3.12").join("site-packages")
    }
}

/// Resolve symlinks in the temporary directory, e.g., `/var` to `/private/var` on macOS.
fn dunce_like_canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    let canonical = fs_err::canonicalize(path)?;
    // Strip the verbatim prefix on Windows.
    Ok(canonical
        .to_str()
        .and_then(|path| path.strip_prefix(r"\\?\"))
        .map_or(canonical.clone(), PathBuf::from))
}

/// Returns the `pex-tools` binary that cargo built before launching the tests.
pub fn get_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pex-tools"))
}

pub fn apply_filters<T: AsRef<str>>(mut snapshot: String, filters: impl AsRef<[(T, T)]>) -> String {
    for (matcher, replacement) in filters.as_ref() {
        let re = Regex::new(matcher.as_ref()).expect("Do you need to regex::escape your filter?");
        if re.is_match(&snapshot) {
            snapshot = re.replace_all(&snapshot, replacement.as_ref()).to_string();
        }
    }
    snapshot
}

/// Execute the command and format its output status, stdout and stderr into a snapshot string.
///
/// This function is derived from `insta_cmd`s `spawn_with_info`.
#[allow(clippy::print_stderr)]
pub fn run_and_format<T: AsRef<str>>(
    mut command: impl BorrowMut<Command>,
    filters: impl AsRef<[(T, T)]>,
) -> (String, Output) {
    let program = command
        .borrow_mut()
        .get_program()
        .to_string_lossy()
        .to_string();

    let output = command
        .borrow_mut()
        .output()
        .unwrap_or_else(|err| panic!("Failed to spawn {program}: {err}"));

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━ Unfiltered output ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "----- stdout -----\n{}\n----- stderr -----\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
    eprintln!("────────────────────────────────────────────────────────────────────────────────\n");

    let snapshot = apply_filters(
        format!(
            "success: {:?}\nexit_code: {}\n----- stdout -----\n{}\n----- stderr -----\n{}",
            output.status.success(),
            output.status.code().unwrap_or(!0),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ),
        filters,
    );

    (snapshot, output)
}

/// Run a command and snapshot its output, with the default filters or with custom filters.
#[allow(unused_macros)]
macro_rules! pex_snapshot {
    ($spawnable:expr, @$snapshot:literal) => {{
        pex_snapshot!($crate::common::INSTA_FILTERS.to_vec(), $spawnable, @$snapshot)
    }};
    ($filters:expr, $spawnable:expr, @$snapshot:literal) => {{
        let (snapshot, output) = $crate::common::run_and_format($spawnable, &$filters);
        ::insta::assert_snapshot!(snapshot, @$snapshot);
        output
    }};
}

/// <https://stackoverflow.com/a/31749071/3549270>
#[allow(unused_imports)]
pub(crate) use pex_snapshot;
