use std::fmt;
use tracing::{debug, info};

use crate::formats::detector_for;
use crate::options::ScanOptions;
use crate::traits::FormatDetector;
use crate::types::{DEDUP_TOLERANCE, ImageCandidate, ImageFormat, ScanResult, ScanStats};

/// Runs the format detectors over a buffer and merges their candidates.
pub struct Carver {
    detectors: Vec<Box<dyn FormatDetector>>,
}

impl Carver {
    /// A carver running every detector.
    pub fn new() -> Self {
        Self::with_options(&ScanOptions::default())
    }

    pub fn with_options(options: &ScanOptions) -> Self {
        Self {
            detectors: options
                .enabled_formats()
                .into_iter()
                .map(detector_for)
                .collect(),
        }
    }

    pub fn formats(&self) -> Vec<ImageFormat> {
        self.detectors.iter().map(|d| d.format()).collect()
    }

    /// Scans `buffer` for embedded images.
    ///
    /// Detectors run in the fixed order JPEG, PNG, BMP, GIF, TIFF and their
    /// candidates are pooled in that order before dedup, so an image found by
    /// an earlier detector shadows an overlapping one found later. The result
    /// is sorted by start offset. Never fails: unterminated or undersized
    /// candidates only show up in the stats.
    pub fn scan<'a>(&self, buffer: &'a [u8]) -> ScanResult<'a> {
        let mut stats = ScanStats::default();
        let mut pooled = Vec::new();

        for detector in &self.detectors {
            let found = detector.detect(buffer, &mut stats);
            debug!(
                format = %detector.format(),
                candidates = found.len(),
                "detector finished"
            );
            pooled.extend(found);
        }

        let (mut candidates, duplicates) = dedup_candidates(pooled);
        stats.duplicates = duplicates;
        candidates.sort_by_key(|c| c.start_offset);

        info!(
            bytes = buffer.len(),
            images = candidates.len(),
            duplicates,
            dropped = stats.dropped(),
            "scan complete"
        );

        ScanResult { candidates, stats }
    }
}

impl fmt::Debug for Carver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carver")
            .field("formats", &self.formats())
            .finish()
    }
}

impl Default for Carver {
    fn default() -> Self {
        Self::new()
    }
}

/// Scans `buffer` with every detector enabled.
pub fn carve(buffer: &[u8]) -> ScanResult<'_> {
    Carver::new().scan(buffer)
}

/// Greedy dedup in discovery order.
///
/// A candidate is dropped when its start lies within [`DEDUP_TOLERANCE`]
/// bytes of an accepted candidate's start, or inside an accepted candidate's
/// byte range. Accepted candidates keep their input order; the second value
/// is the number dropped.
///
/// The rule is order dependent and does not guarantee a non-overlapping
/// set: a later candidate may start before an accepted one and extend over
/// it.
pub fn dedup_candidates<'a, I>(pooled: I) -> (Vec<ImageCandidate<'a>>, usize)
where
    I: IntoIterator<Item = ImageCandidate<'a>>,
{
    let mut accepted: Vec<ImageCandidate<'a>> = Vec::new();
    let mut duplicates = 0;

    for candidate in pooled {
        if accepted.iter().any(|seen| is_duplicate(&candidate, seen)) {
            duplicates += 1;
            continue;
        }
        accepted.push(candidate);
    }

    (accepted, duplicates)
}

#[inline]
pub fn is_duplicate(candidate: &ImageCandidate<'_>, seen: &ImageCandidate<'_>) -> bool {
    candidate.start_offset.abs_diff(seen.start_offset) < DEDUP_TOLERANCE
        || seen.contains_offset(candidate.start_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Termination;

    fn candidate(
        data: &[u8],
        format: ImageFormat,
        start: usize,
        len: usize,
    ) -> ImageCandidate<'_> {
        ImageCandidate::new(
            format,
            start,
            &data[start..start + len],
            Termination::Terminated,
        )
    }

    #[test]
    fn nearby_start_is_duplicate() {
        let data = vec![0u8; 4096];
        let first = candidate(&data, ImageFormat::Jpeg, 1000, 10);
        let near = candidate(&data, ImageFormat::Png, 1099, 500);
        let far = candidate(&data, ImageFormat::Png, 1100, 500);

        assert!(is_duplicate(&near, &first));
        assert!(!is_duplicate(&far, &first));
    }

    #[test]
    fn start_inside_accepted_range_is_duplicate() {
        let data = vec![0u8; 4096];
        let big = candidate(&data, ImageFormat::Tiff, 0, 3000);
        let inside = candidate(&data, ImageFormat::Gif, 2999, 200);
        let after = candidate(&data, ImageFormat::Gif, 3000, 200);

        assert!(is_duplicate(&inside, &big));
        assert!(!is_duplicate(&after, &big));
    }

    #[test]
    fn earlier_discovery_wins() {
        let data = vec![0u8; 4096];
        let pooled = vec![
            candidate(&data, ImageFormat::Png, 500, 100),
            candidate(&data, ImageFormat::Tiff, 450, 3000),
            candidate(&data, ImageFormat::Gif, 2000, 300),
        ];

        let (accepted, duplicates) = dedup_candidates(pooled);

        assert_eq!(duplicates, 1);
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].format, ImageFormat::Png);
        assert_eq!(accepted[1].format, ImageFormat::Gif);
    }

    #[test]
    fn later_candidate_may_swallow_accepted_one() {
        let data = vec![0u8; 4096];
        let pooled = vec![
            candidate(&data, ImageFormat::Png, 1000, 200),
            candidate(&data, ImageFormat::Tiff, 0, 3000),
        ];

        let (accepted, duplicates) = dedup_candidates(pooled);
        assert_eq!(duplicates, 0);
        assert_eq!(accepted.len(), 2);
    }

    #[test]
    fn disabled_formats_are_not_scanned() {
        let carver = Carver::with_options(
            &ScanOptions::new().with_formats(vec![ImageFormat::Gif, ImageFormat::Jpeg]),
        );
        assert_eq!(carver.formats(), vec![ImageFormat::Jpeg, ImageFormat::Gif]);
        assert_eq!(format!("{carver:?}"), "Carver { formats: [Jpeg, Gif] }");
    }

    #[test]
    fn empty_buffer_scans_clean() {
        let result = carve(&[]);
        assert!(result.is_empty());
        assert_eq!(result.stats, ScanStats::default());
    }
}
