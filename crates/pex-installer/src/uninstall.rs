use std::collections::BTreeSet;
use std::io;
use std::path::{Component, Path, PathBuf};

use fs_err as fs;
use tracing::debug;

use crate::record::read_record_file;
use crate::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Uninstall {
    /// The number of files removed.
    pub file_count: usize,
    /// The number of directories removed, including emptied parents and `__pycache__`.
    pub dir_count: usize,
}

/// Uninstall the distribution whose `.dist-info` directory is given, by removing every path
/// its `RECORD` lists.
///
/// Directories left empty are pruned up to, but never including, `site-packages`. The
/// `.dist-info` directory itself is always removed.
pub fn uninstall_dist(dist_info: &Path) -> Result<Uninstall, Error> {
    let Some(site_packages) = dist_info.parent() else {
        return Err(Error::BrokenVenv(dist_info.to_path_buf()));
    };

    let record_path = dist_info.join("RECORD");
    let record = match fs::File::open(&record_path) {
        Ok(file) => read_record_file(file)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::MissingRecord(record_path));
        }
        Err(err) => return Err(err.into()),
    };

    let mut uninstall = Uninstall::default();

    let mut parents = BTreeSet::new();
    for entry in &record {
        let path = site_packages.join(&entry.path);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed file: {}", path.display());
                uninstall.file_count += 1;
                if let Some(parent) = path.parent() {
                    parents.insert(normalize_path(parent));
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    // Deepest first, so that emptied children are gone before their parents are checked.
    for parent in parents.iter().rev() {
        if !parent.starts_with(site_packages) {
            continue;
        }
        uninstall.dir_count += prune(parent, site_packages)?;
    }

    match fs::remove_dir_all(dist_info) {
        Ok(()) => {
            debug!("Removed directory: {}", dist_info.display());
            uninstall.dir_count += 1;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    Ok(uninstall)
}

/// Remove `dir` and its ancestors below `site_packages` for as long as they're empty, once any
/// `__pycache__` in them is gone. Returns the number of directories removed.
fn prune(dir: &Path, site_packages: &Path) -> Result<usize, Error> {
    let mut removed = 0;
    let mut dir = dir;
    while dir != site_packages {
        let pycache = dir.join("__pycache__");
        match fs::remove_dir_all(&pycache) {
            Ok(()) => {
                debug!("Removed directory: {}", pycache.display());
                removed += 1;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let mut entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            // Already removed while pruning a deeper directory.
            Err(err) if err.kind() == io::ErrorKind::NotFound => break,
            Err(err) => return Err(err.into()),
        };
        if entries.next().is_some() {
            break;
        }

        fs::remove_dir(dir)?;
        debug!("Removed directory: {}", dir.display());
        removed += 1;

        let Some(parent) = dir.parent() else {
            break;
        };
        dir = parent;
    }
    Ok(removed)
}

/// Normalize a path lexically, resolving `.` and `..`.
///
/// Source: <https://github.com/rust-lang/cargo/blob/b48c41aedbd69ee3990d62a0e2006edbb506a480/crates/cargo-util/src/paths.rs#L76C1-L109C2>
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(..) => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
        }
    }
    normalized
}
