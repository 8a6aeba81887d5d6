use std::path::Path;

use crate::Conflicts;

const TRAILER_RESOLVED: &str = "Uninstalling venv versions and using versions from the PEX.";

/// The message printed when a request collides with the environment and isn't forced.
pub fn format_abort(target: &Path, source: &Path, request: &str, conflicts: &Conflicts) -> String {
    header(target, source, request, conflicts)
        + &format!("Consider re-running either without {request} or with --collisions-ok.")
}

/// The message printed when a colliding request is forced through.
pub fn format_resolved(
    target: &Path,
    source: &Path,
    request: &str,
    conflicts: &Conflicts,
) -> String {
    header(target, source, request, conflicts) + TRAILER_RESOLVED
}

/// The message printed when the environment already holds other versions of distributions the
/// PEX bundles, and replacing them wasn't authorized.
pub fn format_outdated_abort(target: &Path, source: &Path, outdated: &Conflicts) -> String {
    outdated_header(target, source, outdated)
        + "Consider re-running with --collisions-ok to replace them, or with --force to recreate the venv."
}

/// The message printed when other versions of the PEX's distributions are replaced.
pub fn format_outdated_resolved(target: &Path, source: &Path, outdated: &Conflicts) -> String {
    outdated_header(target, source, outdated) + TRAILER_RESOLVED
}

/// The request, the two locations, and one `<name> <PEX version>` line per conflict.
fn header(target: &Path, source: &Path, request: &str, conflicts: &Conflicts) -> String {
    let mut message = format!(
        "You asked for {request} to be installed in the venv at {},\nbut the PEX at {} already contains:\n",
        target.display(),
        source.display()
    );
    for conflict in conflicts {
        message.push_str(&format!("{} {}\n", conflict.name, conflict.archive));
    }
    message
}

/// The two locations, and one `<name> <venv version> (the PEX contains <PEX version>)` line per
/// distribution.
fn outdated_header(target: &Path, source: &Path, outdated: &Conflicts) -> String {
    let mut message = format!(
        "The venv at {} already contains other versions of distributions in the PEX at {}:\n",
        target.display(),
        source.display()
    );
    for conflict in outdated {
        message.push_str(&format!(
            "{} {} (the PEX contains {})\n",
            conflict.name, conflict.environment, conflict.archive
        ));
    }
    message
}
