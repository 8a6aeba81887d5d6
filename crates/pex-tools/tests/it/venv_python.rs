use std::env;
use std::process::Command;

use anyhow::Result;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;

use pex_static::EnvVars;

use crate::common::{python_executable, TestContext};

/// The interpreter to create virtual environments with.
fn python() -> String {
    env::var(EnvVars::PEX_TEST_PYTHON).unwrap_or_else(|_| "python3".to_string())
}

const DIAGNOSTIC_TAIL: &str = "already contains:\npip 0.0.1\n";

#[test]
fn pip_collision() -> Result<()> {
    let context = TestContext::new();
    let pex = context.loose_pex("pip.pex", &[("pip", "0.0.1")]);
    let venv = context.temp_dir.path().join("venv");

    // The seeded pip collides with the PEX's.
    context
        .venv(&pex, &venv)
        .arg("--pip")
        .arg("--python")
        .arg(python())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(DIAGNOSTIC_TAIL))
        .stderr(predicate::str::contains(
            "Consider re-running either without --pip or with --collisions-ok.",
        ));

    context
        .venv(&pex, &venv)
        .arg("--pip")
        .arg("--force")
        .arg("--collisions-ok")
        .arg("--python")
        .arg(python())
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "{DIAGNOSTIC_TAIL}Uninstalling venv versions and using versions from the PEX.\n"
        )))
        // The interpreter agrees with what was installed.
        .stderr(predicate::str::contains("warning:").not());

    Command::new(venv.join(python_executable()))
        .arg("-c")
        .arg("import pip; print(pip.__version__)")
        .env_remove(EnvVars::PYTHONPATH)
        .assert()
        .success()
        .stdout("0.0.1\n");

    Ok(())
}

#[test]
fn pip_without_collision() -> Result<()> {
    let context = TestContext::new();
    let pex = context.loose_pex("app.pex", &[("cowsay", "6.1")]);
    let venv = context.temp_dir.path().join("venv");

    context
        .venv(&pex, &venv)
        .arg("--pip")
        .arg("--python")
        .arg(python())
        .assert()
        .success()
        .stderr(predicate::str::contains(" + cowsay==6.1"));

    Command::new(venv.join(python_executable()))
        .arg("-c")
        .arg("import cowsay, pip; print(cowsay.__version__)")
        .env_remove(EnvVars::PYTHONPATH)
        .assert()
        .success()
        .stdout("6.1\n");

    Ok(())
}
