use std::io::Write;
use std::path::{Path, PathBuf};

use data_encoding::BASE64URL_NOPAD;
use fs_err as fs;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use pex_archive::ArchiveFile;
use pex_distribution_filename::WheelFilename;
use pex_virtualenv::Virtualenv;

use crate::record::{write_record_file, RecordEntry};
use crate::Error;

/// The name written to the `INSTALLER` file of every distribution we install.
pub const INSTALLER: &str = "pex";

/// Where a file of an installed chroot lands.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    SitePackages(PathBuf),
    Script(PathBuf),
    Data(PathBuf),
}

/// Install the files of a bundled distribution into the virtual environment.
///
/// The files are laid out as in `site-packages`, except for the entries of the `.data`
/// directory, which are routed by scheme. The chroot's own `RECORD` and `INSTALLER` are replaced
/// with ones describing this installation. Returns the number of files written.
pub fn install_files(
    venv: &Virtualenv,
    filename: &WheelFilename,
    files: &[ArchiveFile],
) -> Result<usize, Error> {
    let site_packages = venv.site_packages();
    let dist_info = top_level_dir(files, ".dist-info").unwrap_or_else(|| filename.dist_info_dir());
    let data = top_level_dir(files, ".data").unwrap_or_else(|| filename.data_dir());

    let record_path = format!("{dist_info}/RECORD");
    let installer_path = format!("{dist_info}/INSTALLER");

    let mut record = Vec::with_capacity(files.len() + 2);
    for file in files {
        if file.path == record_path || file.path == installer_path {
            continue;
        }

        let (absolute, executable) = match route(&file.path, &data, venv) {
            Target::SitePackages(path) => (path, file.executable),
            Target::Data(path) => (path, file.executable),
            Target::Script(path) => (path, true),
        };

        let contents = if executable && file.contents.starts_with(b"#!python") {
            rewrite_shebang(&file.contents, venv.python_executable())
        } else {
            file.contents.clone()
        };

        write_file(&absolute, &contents, executable)?;
        trace!("Installed: {}", absolute.display());
        record.push(record_entry(site_packages, &absolute, &contents)?);
    }

    let installer = site_packages.join(&installer_path);
    write_file(&installer, INSTALLER.as_bytes(), false)?;
    record.push(record_entry(site_packages, &installer, INSTALLER.as_bytes())?);

    record.push(RecordEntry::unhashed(record_path.clone()));
    record.sort();
    let mut writer = fs::File::create(site_packages.join(&record_path))?;
    write_record_file(&mut writer, &record)?;
    writer.flush()?;

    debug!(
        "Installed {} file(s) for `{}`",
        record.len(),
        filename.name
    );
    Ok(record.len())
}

/// The name of the top-level directory with the given suffix, if the chroot has one.
fn top_level_dir(files: &[ArchiveFile], suffix: &str) -> Option<String> {
    files.iter().find_map(|file| {
        let (first, _) = file.path.split_once('/')?;
        first.ends_with(suffix).then(|| first.to_string())
    })
}

/// Map a chroot path to its location in the environment.
///
/// See: <https://packaging.python.org/en/latest/specifications/binary-distribution-format/#installing-a-wheel-distribution-1-0-py32-none-any-whl>
fn route(path: &str, data_dir: &str, venv: &Virtualenv) -> Target {
    let Some(rest) = path
        .strip_prefix(data_dir)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return Target::SitePackages(venv.site_packages().join(path));
    };
    let (scheme, rest) = rest.split_once('/').unwrap_or((rest, ""));
    match scheme {
        "purelib" | "platlib" => Target::SitePackages(venv.site_packages().join(rest)),
        "scripts" => Target::Script(venv.scripts().join(rest)),
        "data" => Target::Data(venv.root().join(rest)),
        "headers" => Target::Data(venv.root().join("include").join(rest)),
        // Unknown schemes are kept as-is, in `site-packages`.
        _ => Target::SitePackages(venv.site_packages().join(path)),
    }
}

/// Replace a `#!python` (or `#!pythonw`) placeholder with the environment's interpreter.
fn rewrite_shebang(contents: &[u8], python: &Path) -> Vec<u8> {
    let body = contents
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(&[][..], |newline| &contents[newline..]);
    let mut rewritten = format!("#!{}", python.display()).into_bytes();
    rewritten.extend_from_slice(body);
    rewritten
}

fn write_file(path: &Path, contents: &[u8], executable: bool) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;

    #[cfg(unix)]
    if executable {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;

        let permissions = fs::metadata(path)?.permissions();
        fs::set_permissions(path, Permissions::from_mode(permissions.mode() | 0o111))?;
    }
    #[cfg(not(unix))]
    let _ = executable;

    Ok(())
}

/// Hash the contents and record the path relative to `site-packages`.
fn record_entry(
    site_packages: &Path,
    absolute: &Path,
    contents: &[u8],
) -> Result<RecordEntry, Error> {
    let relative = pathdiff::diff_paths(absolute, site_packages).ok_or_else(|| {
        Error::RelativePath(absolute.to_path_buf(), site_packages.to_path_buf())
    })?;
    let hash = Sha256::new().chain_update(contents).finalize();
    Ok(RecordEntry::new(
        portable(&relative),
        format!("sha256={}", BASE64URL_NOPAD.encode(&hash)),
        contents.len() as u64,
    ))
}

/// Render a relative path with `/` separators.
fn portable(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
