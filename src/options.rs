//! Scan and extraction options

use std::path::PathBuf;

use crate::types::ImageFormat;

/// Default output directory for carved images
pub const DEFAULT_OUTPUT_DIR: &str = "images_all";
/// Files at or below this size on disk are discarded after writing
pub const DEFAULT_MIN_FILE_BYTES: u64 = 500;

/// Options for scanning a document
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Formats to detect (empty = all)
    pub formats: Vec<ImageFormat>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts detection to the given formats
    pub fn with_formats(mut self, formats: Vec<ImageFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn is_enabled(&self, format: ImageFormat) -> bool {
        self.formats.is_empty() || self.formats.contains(&format)
    }

    /// Enabled formats in detection order
    pub fn enabled_formats(&self) -> Vec<ImageFormat> {
        ImageFormat::ALL
            .into_iter()
            .filter(|format| self.is_enabled(*format))
            .collect()
    }
}

/// Options for writing carved images
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory receiving `image_NNN.ext` files
    pub output_dir: PathBuf,
    /// Minimum on-disk size a written file must exceed to be kept
    pub min_file_bytes: u64,
    /// Whether to overwrite existing files
    pub overwrite: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            min_file_bytes: DEFAULT_MIN_FILE_BYTES,
            overwrite: true,
        }
    }
}

impl ExtractOptions {
    /// Creates extraction options writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Sets the on-disk size threshold
    pub fn with_min_file_bytes(mut self, bytes: u64) -> Self {
        self.min_file_bytes = bytes;
        self
    }

    /// Refuses to replace files already present in the output directory
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }
}
