//! Reading raw snapshot payloads from disk
//!
//! Only I/O and JSON syntax errors are reported here; a well-formed
//! document of any shape indexes successfully.

use crate::error::{ExplorerError, Result};
use crate::index::{index_snapshot, SnapshotIndex};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Parse a raw payload from any reader
pub fn read_payload<R: Read>(reader: R) -> Result<Value> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read and parse a JSON document from a file
pub fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ExplorerError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load and index a snapshot file
pub fn load_snapshot_file(path: impl AsRef<Path>) -> Result<SnapshotIndex> {
    let path = path.as_ref();
    let payload: Value = read_json_file(path)?;
    let index = index_snapshot(&payload);

    debug!(
        path = %path.display(),
        resources = index.total_resources(),
        "Loaded snapshot file"
    );

    Ok(index)
}
