//! Packaging batch results for delivery.
//!
//! A batch with nothing to deliver is an error. A single-item request
//! that produced exactly one payload is delivered bare under the payload's
//! own filename. Everything else becomes a deflate zip named after the
//! plan, holding each payload under its original filename.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::BatchResult;
use crate::extract::Payload;

/// Name of the failure listing added to containers when enabled.
pub const FAILURE_MANIFEST_NAME: &str = "failed_tiles.csv";

/// How the caller wants the result packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRequest {
    /// Container name used when the output is zipped.
    pub name_hint: String,
    /// The user asked for one item rather than a batch.
    pub single_item: bool,
    /// Append a listing of failed tiles to the container.
    pub failure_manifest: bool,
}

/// Aggregation errors.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Every task failed.
    #[error("no files could be downloaded ({attempted} attempted)")]
    EmptyResult { attempted: usize },

    /// Writing the container failed.
    #[error("failed to write archive: {0}")]
    Write(#[from] ZipError),
}

/// Format of the delivered blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// A bare payload file.
    Csv,
    /// A zip container.
    Zip,
}

/// The delivered blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArchive {
    pub name: String,
    pub bytes: Vec<u8>,
    pub kind: ArchiveKind,
}

impl OutputArchive {
    /// MIME type derived from the file extension.
    pub fn mime_type(&self) -> &'static str {
        if self.name.ends_with(".zip") {
            "application/zip"
        } else {
            "text/csv"
        }
    }

    /// Writes the blob into `dir` under its own name, returning the path.
    ///
    /// Only the final path component of the name is used, so payload names
    /// carrying archive folders land directly in `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let file_name = Path::new(&self.name)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty output name"))?;
        let path = dir.join(file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Packages `result` according to `request`.
pub fn aggregate(
    result: BatchResult,
    request: &OutputRequest,
) -> Result<OutputArchive, AggregateError> {
    let succeeded = result.succeeded();
    if succeeded == 0 {
        return Err(AggregateError::EmptyResult {
            attempted: result.attempted(),
        });
    }

    if succeeded == 1 && request.single_item {
        if let Some(payload) = result.payloads().next() {
            debug!(file = %payload.filename, "Delivering single payload unpackaged");
            return Ok(OutputArchive {
                name: payload.filename.clone(),
                bytes: payload.bytes.clone(),
                kind: ArchiveKind::Csv,
            });
        }
    }

    let manifest = if request.failure_manifest && result.failed() > 0 {
        Some(failure_manifest(&result))
    } else {
        None
    };

    let bytes = build_container(result.payloads(), manifest.as_deref())?;
    Ok(OutputArchive {
        name: request.name_hint.clone(),
        bytes,
        kind: ArchiveKind::Zip,
    })
}

fn build_container<'a>(
    payloads: impl Iterator<Item = &'a Payload>,
    manifest: Option<&str>,
) -> Result<Vec<u8>, AggregateError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut written = HashSet::new();

    for payload in payloads {
        if !written.insert(payload.filename.as_str()) {
            warn!(file = %payload.filename, "Skipping duplicate payload name");
            continue;
        }
        writer.start_file(payload.filename.as_str(), options)?;
        writer.write_all(&payload.bytes).map_err(ZipError::Io)?;
    }

    if let Some(manifest) = manifest {
        writer.start_file(FAILURE_MANIFEST_NAME, options)?;
        writer.write_all(manifest.as_bytes()).map_err(ZipError::Io)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// `tile,reason` rows for every failed task.
fn failure_manifest(result: &BatchResult) -> String {
    let mut manifest = String::from("tile,reason\n");
    for (label, reason) in result.failures() {
        manifest.push_str(&csv_field(label));
        manifest.push(',');
        manifest.push_str(&csv_field(&reason.to_string()));
        manifest.push('\n');
    }
    manifest
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
