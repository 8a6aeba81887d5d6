//! Install into and uninstall from an on-disk virtual environment laid out without Python.

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use fs_err as fs;
use indoc::indoc;

use pex_archive::PexArchive;
use pex_distribution_types::Version;
use pex_installer::{read_record_file, ArchiveInstaller, Error, INSTALLER};
use pex_normalize::PackageName;
use pex_types::{Environment, Installer};
use pex_virtualenv::Virtualenv;

fn venv(root: &ChildPath) -> Result<Virtualenv> {
    root.child("pyvenv.cfg")
        .write_str("home = /usr/bin\nversion = 3.12.1\n")?;
    if cfg!(windows) {
        root.child("Scripts/python.exe").touch()?;
        root.child("Lib/site-packages").create_dir_all()?;
    } else {
        root.child("bin/python").touch()?;
        root.child("lib/python3.12/site-packages").create_dir_all()?;
    }
    Ok(Virtualenv::from_root(root.path())?)
}

fn pex(root: &ChildPath) -> Result<PexArchive> {
    root.child("PEX-INFO").write_str(indoc! {r#"
        {
          "distributions": {
            "pip-23.1-py3-none-any.whl": "7d8e",
            "cowsay-6.1-py3-none-any.whl": "a1b2"
          }
        }
    "#})?;
    let pip = root.child(".deps/pip-23.1-py3-none-any.whl");
    pip.child("pip/__init__.py")
        .write_str("__version__ = \"23.1\"\n")?;
    pip.child("pip/_internal/__init__.py").write_str("")?;
    pip.child("pip-23.1.dist-info/METADATA")
        .write_str("Name: pip\nVersion: 23.1\n")?;
    pip.child("pip-23.1.dist-info/INSTALLER").write_str("pip\n")?;
    pip.child("pip-23.1.dist-info/RECORD")
        .write_str("pip/__init__.py,,\n")?;
    let cowsay = root.child(".deps/cowsay-6.1-py3-none-any.whl");
    cowsay
        .child("cowsay/__init__.py")
        .write_str("__version__ = \"6.1\"\n")?;
    cowsay
        .child("cowsay-6.1.dist-info/METADATA")
        .write_str("Name: cowsay\nVersion: 6.1\n")?;
    cowsay
        .child("cowsay-6.1.data/scripts/cowsay")
        .write_str("#!python\nimport cowsay\n")?;
    Ok(PexArchive::open(root.path())?)
}

fn name(name: &str) -> PackageName {
    PackageName::from_str(name).unwrap()
}

fn version(version: &str) -> Version {
    Version::from_str(version).unwrap()
}

#[test]
fn install_then_uninstall() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let venv = venv(&temp_dir.child("venv"))?;
    let archive = pex(&temp_dir.child("app.pex"))?;
    let installer = ArchiveInstaller::new(&archive);

    installer.install(&venv, &name("pip"), &version("23.1"))?;

    let index = venv.inspect()?;
    assert_eq!(index.get(&name("pip")), Some(&version("23.1")));

    let dist_info = venv.site_packages().join("pip-23.1.dist-info");
    assert_eq!(fs::read_to_string(dist_info.join("INSTALLER"))?, INSTALLER);
    let record = read_record_file(fs::File::open(dist_info.join("RECORD"))?)?
        .into_iter()
        .map(|entry| entry.path)
        .collect::<Vec<_>>();
    assert_eq!(
        record,
        [
            "pip-23.1.dist-info/INSTALLER",
            "pip-23.1.dist-info/METADATA",
            "pip-23.1.dist-info/RECORD",
            "pip/__init__.py",
            "pip/_internal/__init__.py",
        ]
    );

    installer.uninstall(&venv, &name("pip"))?;
    assert!(venv.inspect()?.is_empty());
    assert!(!venv.site_packages().join("pip").exists());
    Ok(())
}

#[test]
fn install_routes_scripts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let venv = venv(&temp_dir.child("venv"))?;
    let archive = pex(&temp_dir.child("app.pex"))?;
    let installer = ArchiveInstaller::new(&archive);

    installer.install(&venv, &name("cowsay"), &version("6.1"))?;

    let script = venv.scripts().join("cowsay");
    let contents = fs::read_to_string(&script)?;
    assert_eq!(
        contents,
        format!("#!{}\nimport cowsay\n", venv.python_executable().display())
    );
    assert!(!venv.site_packages().join("cowsay-6.1.data").exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        assert_ne!(fs::metadata(&script)?.permissions().mode() & 0o111, 0);
    }

    // The script is recorded relative to `site-packages`, and removed on uninstall.
    installer.uninstall(&venv, &name("cowsay"))?;
    assert!(!script.exists());
    assert!(venv.python_executable().exists());
    Ok(())
}

#[test]
fn install_not_bundled() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let venv = venv(&temp_dir.child("venv"))?;
    let archive = pex(&temp_dir.child("app.pex"))?;

    let err = ArchiveInstaller::new(&archive)
        .install(&venv, &name("pip"), &version("24.0"))
        .unwrap_err();
    assert!(matches!(err, Error::NotBundled { .. }));
    assert!(venv.inspect()?.is_empty());
    Ok(())
}

#[test]
fn uninstall_not_installed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let venv = venv(&temp_dir.child("venv"))?;
    let archive = pex(&temp_dir.child("app.pex"))?;

    let err = ArchiveInstaller::new(&archive)
        .uninstall(&venv, &name("pip"))
        .unwrap_err();
    assert!(matches!(err, Error::NotInstalled { .. }));
    Ok(())
}

#[test]
fn reinstall_other_version() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let venv = venv(&temp_dir.child("venv"))?;
    let archive = pex(&temp_dir.child("app.pex"))?;
    let installer = ArchiveInstaller::new(&archive);

    // An environment copy of pip, as `ensurepip` would leave it.
    let site_packages = ChildPath::new(venv.site_packages());
    site_packages
        .child("pip/__init__.py")
        .write_str("__version__ = \"23.3.2\"\n")?;
    site_packages.child("pip/_vendor/six.py").write_str("")?;
    site_packages
        .child("pip-23.3.2.dist-info/RECORD")
        .write_str(indoc! {"
            pip/__init__.py,,
            pip/_vendor/six.py,,
            pip-23.3.2.dist-info/RECORD,,
        "})?;

    installer.uninstall(&venv, &name("pip"))?;
    installer.install(&venv, &name("pip"), &version("23.1"))?;

    assert_eq!(venv.inspect()?.get(&name("pip")), Some(&version("23.1")));
    assert!(!site_packages.child("pip/_vendor").path().exists());
    assert_eq!(
        fs::read_to_string(Path::new(venv.site_packages()).join("pip/__init__.py"))?,
        "__version__ = \"23.1\"\n"
    );
    Ok(())
}
