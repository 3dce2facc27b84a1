//! In-memory payload extraction from tile archives.
//!
//! Each tile archive is a zip holding the CSV payload alongside metadata
//! files. The payload is the first entry, in stored order, whose name ends
//! in `.csv` and contains the filename prefix computed for the request.
//! Archives are expected to hold only one such entry, but that is not
//! checked.

use std::io::{Cursor, Read};

use thiserror::Error;
use zip::ZipArchive;

/// Extension of the payload file inside a tile archive.
pub const PAYLOAD_EXTENSION: &str = ".csv";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 64 << 20;

/// A payload file pulled out of a tile archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Entry name as stored in the tile archive.
    pub filename: String,
    /// Uncompressed file contents.
    pub bytes: Vec<u8>,
}

/// Payload validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The bytes could not be read as a zip archive.
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    /// No entry matched both the extension and the prefix.
    #[error("no .csv entry containing '{prefix}' in archive")]
    NoMatchingPayload { prefix: String },
}

/// Extracts the payload matching `expected_prefix` from `archive`.
pub fn extract_payload(archive: &[u8], expected_prefix: &str) -> Result<Payload, ExtractError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))
        .map_err(|e| ExtractError::CorruptArchive(e.to_string()))?;

    // Only the matching entry is opened; sidecars may be encrypted or use
    // compression methods this build cannot decode.
    let found = (0..zip.len()).find(|&index| {
        zip.name_for_index(index)
            .is_some_and(|name| name.ends_with(PAYLOAD_EXTENSION) && name.contains(expected_prefix))
    });

    let Some(index) = found else {
        return Err(ExtractError::NoMatchingPayload {
            prefix: expected_prefix.to_string(),
        });
    };

    let mut entry = zip
        .by_index(index)
        .map_err(|e| ExtractError::CorruptArchive(format!("entry {}: {}", index, e)))?;

    let filename = entry.name().to_string();
    // The declared size comes from the server and is only a hint.
    let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ExtractError::CorruptArchive(format!("{}: {}", filename, e)))?;

    Ok(Payload { filename, bytes })
}
