//! The seam between the carver and the per-format detectors.

use crate::types::{ImageCandidate, ImageFormat, ScanStats};

/// Signature-based detection of one embedded image format.
///
/// A detector walks the whole buffer with a cursor, repeatedly searching for
/// its start signature from the end of the previous match, and returns the
/// candidates that pass its size gates in the order they were found.
/// Rejected candidates are tallied in `stats`, never reported as errors.
///
/// # Example
///
/// ```ignore
/// let detector = JpegDetector::new();
/// let mut stats = ScanStats::default();
/// for candidate in detector.detect(&buffer, &mut stats) {
///     println!("{} at {}", candidate.format, candidate.start_offset);
/// }
/// ```
pub trait FormatDetector {
    /// The format this detector carves.
    fn format(&self) -> ImageFormat;

    /// Finds every candidate of this format in `buffer`.
    ///
    /// Candidates borrow from `buffer` and are ordered by discovery, which
    /// for a single detector is also ascending offset order.
    fn detect<'a>(&self, buffer: &'a [u8], stats: &mut ScanStats) -> Vec<ImageCandidate<'a>>;
}
