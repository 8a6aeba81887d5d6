//! Read access to a PEX: its `PEX-INFO` manifest and the installed chroots of the
//! distributions it bundles under `.deps/`.

use std::path::PathBuf;

use thiserror::Error;

pub use archive::{ArchiveFile, BundledDist, PexArchive, PexLayout};
pub use pex_info::PexInfo;

use pex_distribution_filename::WheelFilenameError;
use pex_distribution_types::AmbiguousSourceError;

mod archive;
mod pex_info;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to read the PEX zip at `{}`", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        err: zip::result::ZipError,
    },
    #[error("Failed to walk the PEX directory at `{}`", path.display())]
    WalkDir {
        path: PathBuf,
        #[source]
        err: walkdir::Error,
    },
    #[error("The PEX at `{}` has no `PEX-INFO`", .0.display())]
    MissingPexInfo(PathBuf),
    #[error("The `PEX-INFO` of the PEX at `{}` is invalid", path.display())]
    InvalidPexInfo {
        path: PathBuf,
        #[source]
        err: serde_json::Error,
    },
    #[error("The PEX at `{}` records an invalid distribution", path.display())]
    InvalidDistribution {
        path: PathBuf,
        #[source]
        err: WheelFilenameError,
    },
    #[error("The PEX at `{}` is ambiguous", path.display())]
    AmbiguousSource {
        path: PathBuf,
        #[source]
        err: AmbiguousSourceError,
    },
    #[error("The PEX at `{}` does not contain the files of `{wheel}`", path.display())]
    MissingDistribution { path: PathBuf, wheel: String },
    #[error("The entry `{entry}` of `{wheel}` escapes the distribution's root")]
    UnsafePath { wheel: String, entry: String },
}
