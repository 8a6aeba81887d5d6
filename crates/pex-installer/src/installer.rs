use tracing::{debug, info};

use pex_archive::PexArchive;
use pex_distribution_types::Version;
use pex_normalize::PackageName;
use pex_types::Installer;
use pex_virtualenv::Virtualenv;

use crate::install::install_files;
use crate::uninstall::uninstall_dist;
use crate::Error;

/// Installs distributions into a [`Virtualenv`] from the chroots bundled in a PEX.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveInstaller<'a> {
    archive: &'a PexArchive,
}

impl<'a> ArchiveInstaller<'a> {
    pub fn new(archive: &'a PexArchive) -> Self {
        Self { archive }
    }
}

impl Installer<Virtualenv> for ArchiveInstaller<'_> {
    type Error = Error;

    fn uninstall(&self, venv: &Virtualenv, name: &PackageName) -> Result<(), Error> {
        let installed = venv
            .installed()?
            .into_iter()
            .filter(|dist| dist.name == *name)
            .collect::<Vec<_>>();
        if installed.is_empty() {
            return Err(Error::NotInstalled {
                name: name.clone(),
                root: venv.root().to_path_buf(),
            });
        }

        for dist in installed {
            let uninstall = uninstall_dist(dist.path())?;
            info!(
                "Uninstalled {} {} ({} file(s), {} director(ies))",
                dist.name, dist.version, uninstall.file_count, uninstall.dir_count
            );
        }
        Ok(())
    }

    fn install(&self, venv: &Virtualenv, name: &PackageName, version: &Version) -> Result<(), Error> {
        let dist = self
            .archive
            .find(name, version)?
            .ok_or_else(|| Error::NotBundled {
                name: name.clone(),
                version: version.clone(),
                pex: self.archive.path().to_path_buf(),
            })?;
        debug!("Installing `{}` from `{}`", dist.key, self.archive.path().display());

        let files = self.archive.files(&dist)?;
        let count = install_files(venv, &dist.filename, &files)?;
        info!("Installed {name} {version} ({count} file(s))");
        Ok(())
    }
}
