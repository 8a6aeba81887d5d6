/// Declares all environment variables used throughout `pex-tools` and its crates.
pub struct EnvVars;

impl EnvVars {
    /// Equivalent to the `--pex` command-line argument. The PEX to materialize a venv from.
    pub const PEX_TOOLS_PEX: &'static str = "PEX_TOOLS_PEX";

    /// Equivalent to the `--python` command-line argument. The interpreter used to create the
    /// virtual environment.
    pub const PEX_PYTHON: &'static str = "PEX_PYTHON";

    /// Equivalent to the `--pip` command-line argument.
    pub const PEX_TOOLS_PIP: &'static str = "PEX_TOOLS_PIP";

    /// Equivalent to the `--force` command-line argument.
    pub const PEX_TOOLS_FORCE: &'static str = "PEX_TOOLS_FORCE";

    /// Equivalent to the `--collisions-ok` command-line argument. If set, packages in the venv
    /// that collide with packages in the PEX are uninstalled in favor of the PEX's versions.
    pub const PEX_COLLISIONS_OK: &'static str = "PEX_COLLISIONS_OK";

    /// Cleared in tests that run a venv's interpreter, so that only its own `site-packages` are
    /// importable.
    pub const PYTHONPATH: &'static str = "PYTHONPATH";

    /// Used to set the `RUST_LOG` filter for logging, overriding the `--verbose` defaults.
    pub const RUST_LOG: &'static str = "RUST_LOG";

    /// Disables colored output (takes precedence over `FORCE_COLOR`).
    ///
    /// See [no-color.org](https://no-color.org).
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Forces colored output regardless of terminal support.
    ///
    /// See [force-color.org](https://force-color.org).
    pub const FORCE_COLOR: &'static str = "FORCE_COLOR";

    /// Disables line wrapping of diagnostics.
    pub const PEX_NO_WRAP: &'static str = "PEX_NO_WRAP";

    /// Used in tests to pin the Python interpreter the test suite runs against.
    pub const PEX_TEST_PYTHON: &'static str = "PEX_TEST_PYTHON";
}
