use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{CarveError, Result};
use crate::options::ExtractOptions;
use crate::types::{ImageCandidate, ImageFormat, Offset, ScanResult, Termination};

#[derive(Debug, Clone, Serialize)]
pub struct SavedImage {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub start_offset: Offset,
    pub length: usize,
    pub termination: Termination,
}

#[derive(Debug, Default, Serialize)]
pub struct ExtractionReport {
    pub saved: Vec<SavedImage>,
    pub failed: usize,
}

impl ExtractionReport {
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

/// Writes every candidate of `result` to `image_NNN.ext` in result order.
///
/// A file that ends up no larger than `min_file_bytes` on disk is deleted
/// and counted as failed. Per-file I/O errors are logged and counted; only
/// failing to create the output directory aborts the run.
pub fn extract_all(result: &ScanResult<'_>, options: &ExtractOptions) -> Result<ExtractionReport> {
    fs::create_dir_all(&options.output_dir)?;

    let mut report = ExtractionReport::default();

    for (i, candidate) in result.iter().enumerate() {
        let filename = generate_filename(i + 1, candidate.format);
        let output_path = options.output_dir.join(&filename);

        match extract_single(candidate, &output_path, options) {
            Ok(true) => {
                info!(
                    file = %filename,
                    bytes = candidate.len(),
                    offset = candidate.start_offset,
                    "saved"
                );
                report.saved.push(SavedImage {
                    path: output_path,
                    format: candidate.format,
                    start_offset: candidate.start_offset,
                    length: candidate.len(),
                    termination: candidate.termination,
                });
            }
            Ok(false) => {
                warn!(file = %filename, "too small or invalid, removed");
                report.failed += 1;
            }
            Err(e) => {
                warn!(file = %filename, error = %e, "failed to save");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Writes one candidate and re-checks its size on disk. Returns `false`
/// when the written file was too small and has been removed.
pub fn extract_single(
    candidate: &ImageCandidate<'_>,
    output_path: &Path,
    options: &ExtractOptions,
) -> Result<bool> {
    if !options.overwrite && output_path.exists() {
        return Err(CarveError::FileExists(output_path.to_path_buf()));
    }

    let mut out = File::create(output_path)?;
    out.write_all(candidate.bytes)?;
    out.sync_all()?;
    drop(out);

    let written = fs::metadata(output_path)?.len();
    if written > options.min_file_bytes {
        Ok(true)
    } else {
        fs::remove_file(output_path)?;
        Ok(false)
    }
}

/// `image_001.jpg` style name; `index` is 1-based.
pub fn generate_filename(index: usize, format: ImageFormat) -> String {
    format!("image_{:03}.{}", index, format.extension())
}

pub fn write_manifest(report: &ExtractionReport, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}
