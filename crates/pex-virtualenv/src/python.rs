use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Error;

/// Find the Python interpreter to create a virtual environment with.
///
/// A request containing a path separator (or naming an existing file) is used as a path;
/// anything else, e.g. `python3.11`, is looked up on `PATH`. Without a request, `python3` is
/// preferred over `python`.
pub fn find_python(request: Option<&str>) -> Result<PathBuf, Error> {
    if let Some(request) = request {
        let path = Path::new(request);
        if path.components().count() > 1 || path.is_file() {
            debug!("Using the Python interpreter at `{}`", path.display());
            return Ok(path.to_path_buf());
        }
        let python = which::which(request)
            .map_err(|err| Error::PythonNotFound(request.to_string(), err))?;
        debug!("Found `{request}` at `{}`", python.display());
        return Ok(python);
    }

    match which::which("python3") {
        Ok(python) => {
            debug!("Found `python3` at `{}`", python.display());
            Ok(python)
        }
        Err(_) => {
            let python = which::which("python")
                .map_err(|err| Error::PythonNotFound("python3".to_string(), err))?;
            debug!("Found `python` at `{}`", python.display());
            Ok(python)
        }
    }
}
