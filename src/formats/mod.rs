pub mod bmp;
pub mod gif;
pub mod jpeg;
pub mod png;
pub mod tiff;

use memchr::memmem::Finder;

use crate::traits::FormatDetector;
use crate::types::{ImageCandidate, ImageFormat, ScanStats};

pub use bmp::BmpDetector;
pub use gif::GifDetector;
pub use jpeg::JpegDetector;
pub use png::PngDetector;
pub use tiff::TiffDetector;

/// Builds the detector for `format`.
pub fn detector_for(format: ImageFormat) -> Box<dyn FormatDetector> {
    match format {
        ImageFormat::Jpeg => Box::new(JpegDetector::new()),
        ImageFormat::Png => Box::new(PngDetector::new()),
        ImageFormat::Gif => Box::new(GifDetector::new()),
        ImageFormat::Bmp => Box::new(BmpDetector::new()),
        ImageFormat::Tiff => Box::new(TiffDetector::new()),
    }
}

/// Position of the first match at or after `from`, as an absolute offset.
#[inline]
pub(crate) fn find_from(finder: &Finder<'_>, haystack: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)
        .and_then(|tail| finder.find(tail))
        .map(|pos| pos + from)
}

/// Position of the first match lying entirely within `from..to`.
#[inline]
pub(crate) fn find_within(
    finder: &Finder<'_>,
    haystack: &[u8],
    from: usize,
    to: usize,
) -> Option<usize> {
    let to = to.min(haystack.len());
    haystack
        .get(from..to)
        .and_then(|window| finder.find(window))
        .map(|pos| pos + from)
}

/// Applies the format's minimum-length gate and records the outcome.
#[inline]
pub(crate) fn keep_if_sized<'a>(
    candidate: ImageCandidate<'a>,
    candidates: &mut Vec<ImageCandidate<'a>>,
    stats: &mut ScanStats,
) {
    if candidate.len() >= candidate.format.min_len() {
        stats.detected.increment(candidate.format);
        candidates.push(candidate);
    } else {
        stats.undersized += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_from_returns_absolute_offset() {
        let finder = Finder::new(b"AB");
        let data = b"AB..AB..";
        assert_eq!(find_from(&finder, data, 0), Some(0));
        assert_eq!(find_from(&finder, data, 1), Some(4));
        assert_eq!(find_from(&finder, data, 5), None);
        assert_eq!(find_from(&finder, data, 100), None);
    }

    #[test]
    fn find_within_requires_whole_match_inside_window() {
        let finder = Finder::new(b"BM");
        let data = b"xxxxBMxx";
        assert_eq!(find_within(&finder, data, 0, 6), Some(4));
        assert_eq!(find_within(&finder, data, 0, 5), None);
        assert_eq!(find_within(&finder, data, 2, 1000), Some(4));
    }

    #[test]
    fn detector_for_matches_format() {
        for format in ImageFormat::ALL {
            assert_eq!(detector_for(format).format(), format);
        }
    }
}
