use std::fmt::Write;
use std::path::Path;

use anstream::{eprint, eprintln};
use anyhow::Result;
use miette::{Diagnostic, IntoDiagnostic};
use owo_colors::OwoColorize;
use thiserror::Error;
use tracing::debug;

use pex_archive::PexArchive;
use pex_collisions::{
    detect, detect_outdated, format_abort, format_outdated_abort, format_outdated_resolved,
    resolve, CollisionPolicy, ManagedPackages, ResolutionOutcome, ResolveError,
};
use pex_distribution_types::{DistributionRecord, Name};
use pex_installer::ArchiveInstaller;
use pex_normalize::PackageName;
use pex_types::{Environment, Installer, ProbeError};
use pex_virtualenv::{find_python, OnExisting, Virtualenv};
use pex_warnings::warn_user;

use crate::commands::ExitStatus;
use crate::printer::Printer;

/// Create a virtual environment from a PEX.
#[allow(clippy::fn_params_excessive_bools)]
pub(crate) fn venv(
    pex: &Path,
    path: &Path,
    python_request: Option<&str>,
    pip: bool,
    force: bool,
    policy: CollisionPolicy,
    printer: Printer,
) -> Result<ExitStatus> {
    match venv_impl(pex, path, python_request, pip, force, policy, printer) {
        Ok(status) => Ok(status),
        Err(err) => {
            eprint!("{err:?}");
            Ok(ExitStatus::Failure)
        }
    }
}

#[derive(Error, Debug, Diagnostic)]
enum VenvError {
    #[error("Failed to read the PEX")]
    #[diagnostic(code(pex::venv::archive))]
    Archive(#[source] pex_archive::Error),

    #[error("Failed to find a Python interpreter")]
    #[diagnostic(code(pex::venv::python))]
    Python(#[source] pex_virtualenv::Error),

    #[error("Failed to create virtualenv")]
    #[diagnostic(code(pex::venv::creation))]
    Creation(#[source] pex_virtualenv::Error),

    #[error("Failed to install pip")]
    #[diagnostic(code(pex::venv::seed))]
    Seed(#[source] pex_virtualenv::Error),

    #[error("Failed to inspect the virtualenv")]
    #[diagnostic(code(pex::venv::probe))]
    Probe(#[source] ProbeError),

    #[error("Failed to resolve collisions between the PEX and the virtualenv")]
    #[diagnostic(
        code(pex::venv::collisions),
        help("The virtualenv may be left partially updated; re-run with `--force` to recreate it")
    )]
    Resolve(#[source] ResolveError<pex_installer::Error>),

    #[error("Failed to install the distributions of the PEX")]
    #[diagnostic(code(pex::venv::install))]
    Install(#[source] pex_installer::Error),
}

/// Create a virtual environment from a PEX.
fn venv_impl(
    pex: &Path,
    path: &Path,
    python_request: Option<&str>,
    pip: bool,
    force: bool,
    policy: CollisionPolicy,
    printer: Printer,
) -> miette::Result<ExitStatus> {
    let archive = PexArchive::open(pex).map_err(VenvError::Archive)?;
    let archive_index = archive.index().map_err(VenvError::Archive)?;

    // Reuse an existing virtual environment unless asked to start over; only look for an
    // interpreter when one needs to be created.
    let venv = if !force && path.join("pyvenv.cfg").is_file() {
        writeln!(
            printer.stderr(),
            "Using existing virtualenv at: {}",
            path.display().cyan()
        )
        .into_diagnostic()?;
        Virtualenv::from_root(path).map_err(VenvError::Creation)?
    } else {
        let python = find_python(python_request).map_err(VenvError::Python)?;
        writeln!(
            printer.stderr(),
            "Using Python interpreter at: {}",
            python.display().cyan()
        )
        .into_diagnostic()?;
        writeln!(
            printer.stderr(),
            "Creating virtualenv at: {}",
            path.display().cyan()
        )
        .into_diagnostic()?;
        let on_existing = if force {
            OnExisting::Remove
        } else {
            OnExisting::Fail
        };
        Virtualenv::create(path, &python, on_existing).map_err(VenvError::Creation)?
    };

    let managed = if pip {
        if !venv
            .inspect()
            .map_err(VenvError::Probe)?
            .contains(&PackageName::from_static("pip"))
        {
            venv.install_pip().map_err(VenvError::Seed)?;
        }
        ManagedPackages::pip()
    } else {
        ManagedPackages::empty()
    };

    let environment_index = venv.inspect().map_err(VenvError::Probe)?;
    let conflicts = detect(&managed, &environment_index, &archive_index);
    let outdated = detect_outdated(&managed, &environment_index, &archive_index);

    // Refuse before changing anything if any replacement is unauthorized.
    if policy == CollisionPolicy::Abort && !outdated.is_empty() {
        if !conflicts.is_empty() {
            eprintln!(
                "{}",
                format_abort(
                    venv.root(),
                    archive.path(),
                    managed.description(),
                    &conflicts
                )
            );
        }
        eprintln!(
            "{}",
            format_outdated_abort(venv.root(), archive.path(), &outdated)
        );
        return Ok(ExitStatus::Failure);
    }

    let installer = ArchiveInstaller::new(&archive);
    let outcome = resolve(
        &conflicts,
        &managed,
        &archive_index,
        archive.path(),
        &venv,
        &installer,
        policy,
    )
    .map_err(VenvError::Resolve)?;

    match &outcome {
        ResolutionOutcome::ConflictReportedAborted { message } => {
            // Shown even with `--quiet`: it's the only explanation for the failure.
            eprintln!("{message}");
            return Ok(ExitStatus::Failure);
        }
        ResolutionOutcome::ConflictResolvedForced { message, .. } => {
            eprintln!("{message}");
        }
        ResolutionOutcome::NoConflict { .. } => {}
    }
    cross_check(&venv, outcome.installed());
    report(printer, outcome.installed())?;

    if !outdated.is_empty() {
        eprintln!(
            "{}",
            format_outdated_resolved(venv.root(), archive.path(), &outdated)
        );
    }

    // Everything else the PEX bundles.
    let installed = venv.inspect().map_err(VenvError::Probe)?;
    let mut changes = Vec::new();
    for record in archive_index.records() {
        let name = record.name();
        if managed.contains(name) {
            continue;
        }
        match installed.get(name) {
            Some(version) if version == record.version() => {
                debug!("{name} {version} is already installed");
                continue;
            }
            Some(version) => {
                debug!("Replacing {name} {version} with {}", record.version());
                installer
                    .uninstall(&venv, name)
                    .map_err(VenvError::Install)?;
            }
            None => {}
        }
        installer
            .install(&venv, name, record.version())
            .map_err(VenvError::Install)?;
        changes.push(record);
    }
    report(printer, &changes)?;

    Ok(ExitStatus::Success)
}

/// Ask the interpreter which versions it actually imports for the packages just installed, and
/// warn if that disagrees with the installed metadata.
fn cross_check(venv: &Virtualenv, installed: &[DistributionRecord]) {
    for record in installed {
        match venv.reported_version(record.name()) {
            Ok(version) if version == *record.version() => {
                debug!("`{}` reports {version}", record.name());
            }
            Ok(version) => warn_user!(
                "`{}` reports version {version}, but {} was installed",
                record.name(),
                record.version()
            ),
            Err(err) => warn_user!(
                "Failed to check the version of `{}`: {err}",
                record.name()
            ),
        }
    }
}

/// List the installed distributions, like ` + pip==23.1`.
fn report(printer: Printer, records: &[DistributionRecord]) -> miette::Result<()> {
    for record in records {
        writeln!(
            printer.stderr(),
            " {} {}{}",
            "+".green(),
            record.name().as_str().bold(),
            format!("=={}", record.version()).dimmed()
        )
        .into_diagnostic()?;
    }
    Ok(())
}
