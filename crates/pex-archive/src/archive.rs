use std::io::{Cursor, Read, Seek};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use fs_err as fs;
use tracing::{debug, trace};
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::result::ZipError;

use pex_distribution_filename::WheelFilename;
use pex_distribution_types::{DistributionIndex, DistributionRecord, Version};
use pex_normalize::PackageName;

use crate::{Error, PexInfo};

/// How a PEX is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PexLayout {
    /// A single zip file, usually prefixed with a shebang line.
    Zipapp,
    /// A directory. Each `.deps/` entry is either an installed chroot (loose) or a zip of one
    /// (packed).
    Directory,
}

/// A distribution bundled in a PEX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledDist {
    /// The key under which `PEX-INFO` records the distribution; also its `.deps/` entry name.
    pub key: String,
    pub filename: WheelFilename,
}

impl BundledDist {
    pub fn name(&self) -> &PackageName {
        &self.filename.name
    }

    pub fn version(&self) -> &Version {
        &self.filename.version
    }
}

/// A file of a bundled distribution, relative to the distribution's root, which is laid out as
/// it should appear in `site-packages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// The `/`-separated path relative to the distribution root.
    pub path: String,
    pub contents: Vec<u8>,
    pub executable: bool,
}

/// A PEX opened for reading. The PEX is never modified.
#[derive(Debug, Clone)]
pub struct PexArchive {
    path: PathBuf,
    layout: PexLayout,
    info: PexInfo,
}

impl PexArchive {
    /// Open the PEX at the given path and read its `PEX-INFO`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        let (layout, contents) = if fs::metadata(&path)?.is_dir() {
            match fs::read(path.join(PexInfo::FILENAME)) {
                Ok(contents) => (PexLayout::Directory, contents),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Err(Error::MissingPexInfo(path));
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            let mut zip = open_zip(&path)?;
            let contents = match zip.by_name(PexInfo::FILENAME) {
                Ok(mut file) => {
                    let mut contents = Vec::new();
                    file.read_to_end(&mut contents)?;
                    contents
                }
                Err(ZipError::FileNotFound) => return Err(Error::MissingPexInfo(path)),
                Err(err) => return Err(Error::Zip { path, err }),
            };
            (PexLayout::Zipapp, contents)
        };

        let info = PexInfo::parse(&contents).map_err(|err| Error::InvalidPexInfo {
            path: path.clone(),
            err,
        })?;

        debug!(
            "Opened {layout:?} PEX at `{}` with {} distribution(s)",
            path.display(),
            info.distributions.len()
        );

        Ok(Self { path, layout, info })
    }

    /// The path the PEX was opened from, as given.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> PexLayout {
        self.layout
    }

    pub fn info(&self) -> &PexInfo {
        &self.info
    }

    /// The distributions bundled in the PEX, in `PEX-INFO` order.
    pub fn bundled(&self) -> Result<Vec<BundledDist>, Error> {
        self.info
            .distributions
            .keys()
            .map(|key| {
                let filename =
                    WheelFilename::from_str(key).map_err(|err| Error::InvalidDistribution {
                        path: self.path.clone(),
                        err,
                    })?;
                Ok(BundledDist {
                    key: key.clone(),
                    filename,
                })
            })
            .collect()
    }

    /// The already-resolved distributions bundled in the PEX.
    pub fn resolved_distributions(&self) -> Result<Vec<DistributionRecord>, Error> {
        Ok(self
            .bundled()?
            .into_iter()
            .map(|dist| DistributionRecord::from(dist.filename))
            .collect())
    }

    /// Index the bundled distributions by name.
    pub fn index(&self) -> Result<DistributionIndex, Error> {
        DistributionIndex::build(self.resolved_distributions()?).map_err(|err| {
            Error::AmbiguousSource {
                path: self.path.clone(),
                err,
            }
        })
    }

    /// Find the bundled distribution for the given package at the given version.
    pub fn find(&self, name: &PackageName, version: &Version) -> Result<Option<BundledDist>, Error> {
        Ok(self
            .bundled()?
            .into_iter()
            .find(|dist| dist.name() == name && dist.version() == version))
    }

    /// Read every file of a bundled distribution.
    pub fn files(&self, dist: &BundledDist) -> Result<Vec<ArchiveFile>, Error> {
        let files = match self.layout {
            PexLayout::Zipapp if self.info.deps_are_wheel_files => {
                let entry = format!("{}/{}", PexInfo::DEPS_DIR, dist.key);
                let mut zip = open_zip(&self.path)?;
                match read_nested_zip_files(&mut zip, &entry) {
                    Ok(files) => files,
                    Err(ZipError::FileNotFound) => Vec::new(),
                    Err(err) => {
                        return Err(Error::Zip {
                            path: self.path.clone(),
                            err,
                        });
                    }
                }
            }
            PexLayout::Zipapp => {
                let prefix = format!("{}/{}/", PexInfo::DEPS_DIR, dist.key);
                let mut zip = open_zip(&self.path)?;
                read_zip_files(&mut zip, &prefix).map_err(|err| Error::Zip {
                    path: self.path.clone(),
                    err,
                })?
            }
            PexLayout::Directory => {
                let root = self.path.join(PexInfo::DEPS_DIR).join(&dist.key);
                match fs::metadata(&root) {
                    Ok(metadata) if metadata.is_dir() => read_dir_files(&root)?,
                    Ok(_) => {
                        let mut zip = open_zip(&root)?;
                        read_zip_files(&mut zip, "")
                            .map_err(|err| Error::Zip { path: root, err })?
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                    Err(err) => return Err(err.into()),
                }
            }
        };

        if files.is_empty() {
            return Err(Error::MissingDistribution {
                path: self.path.clone(),
                wheel: dist.key.clone(),
            });
        }

        if let Some(file) = files.iter().find(|file| !is_safe_relative(&file.path)) {
            return Err(Error::UnsafePath {
                wheel: dist.key.clone(),
                entry: file.path.clone(),
            });
        }

        trace!("Read {} file(s) for `{}`", files.len(), dist.key);
        Ok(files)
    }
}

fn open_zip(path: &Path) -> Result<ZipArchive<fs::File>, Error> {
    let file = fs::File::open(path)?;
    ZipArchive::new(file).map_err(|err| Error::Zip {
        path: path.to_path_buf(),
        err,
    })
}

/// Read all file entries below `prefix`, stripping the prefix.
fn read_zip_files<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    prefix: &str,
) -> Result<Vec<ArchiveFile>, ZipError> {
    let mut files = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.name().strip_prefix(prefix) else {
            continue;
        };
        let path = relative.to_string();
        let executable = entry.unix_mode().is_some_and(|mode| mode & 0o111 != 0);
        let mut contents = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut contents)?;
        files.push(ArchiveFile {
            path,
            contents,
            executable,
        });
    }
    Ok(files)
}

/// Read all file entries of a wheel stored as a single entry of the outer zip.
fn read_nested_zip_files<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    entry: &str,
) -> Result<Vec<ArchiveFile>, ZipError> {
    let mut contents = Vec::new();
    zip.by_name(entry)?.read_to_end(&mut contents)?;
    let mut wheel = ZipArchive::new(Cursor::new(contents))?;
    read_zip_files(&mut wheel, "")
}

fn read_dir_files(root: &Path) -> Result<Vec<ArchiveFile>, Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| Error::WalkDir {
            path: root.to_path_buf(),
            err,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(ArchiveFile {
            path,
            contents: fs::read(entry.path())?,
            executable: is_executable(entry.path())?,
        });
    }
    Ok(files)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> Result<bool, std::io::Error> {
    use std::os::unix::fs::PermissionsExt;

    Ok(fs::metadata(path)?.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> Result<bool, std::io::Error> {
    Ok(false)
}

/// Returns `true` if the path stays below the directory it is relative to.
fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
