use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Line in a RECORD file.
///
/// See: <https://packaging.python.org/en/latest/specifications/recording-installed-packages/#the-record-file>
///
/// ```csv
/// pip/__init__.py,sha256=2-mGV3Y9_9y0RkVQXzCmk6bnzLp9Gjqq3ekzP0fNaT0,357
/// pip-23.3.2.dist-info/RECORD,,
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialOrd, PartialEq, Ord, Eq)]
pub struct RecordEntry {
    pub path: String,
    pub hash: Option<String>,
    pub size: Option<u64>,
}

impl RecordEntry {
    pub fn new(path: String, hash: String, size: u64) -> Self {
        Self {
            path,
            hash: Some(hash),
            size: Some(size),
        }
    }

    /// An entry for a file that isn't hashed, i.e., the `RECORD` itself.
    pub fn unhashed(path: String) -> Self {
        Self {
            path,
            hash: None,
            size: None,
        }
    }
}

/// Read the entries of a `RECORD` file.
pub fn read_record_file(record: impl Read) -> Result<Vec<RecordEntry>, Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .escape(Some(b'"'))
        .from_reader(record)
        .deserialize()
        .map(|entry| {
            let entry: RecordEntry = entry?;
            // Some installers record absolute-looking paths.
            Ok(RecordEntry {
                path: entry.path.trim_start_matches('/').to_string(),
                ..entry
            })
        })
        .collect()
}

pub(crate) fn write_record_file(
    writer: impl Write,
    entries: &[RecordEntry],
) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .escape(b'"')
        .from_writer(writer);
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}
