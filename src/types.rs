use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::CarveError;

pub type Offset = usize;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;

/// Two detections whose start offsets are closer than this are the same image.
pub const DEDUP_TOLERANCE: usize = 100;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detection order. Dedup is greedy, so this order decides which of two
    /// overlapping detections survives.
    pub const ALL: [ImageFormat; 5] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Bmp,
        ImageFormat::Gif,
        ImageFormat::Tiff,
    ];

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
        }
    }

    /// Smallest candidate length kept by the detector, inclusive.
    #[must_use]
    pub const fn min_len(&self) -> usize {
        match self {
            Self::Jpeg | Self::Tiff => 1000,
            Self::Png | Self::Gif | Self::Bmp => 100,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ImageFormat {
    type Err = CarveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            "bmp" => Ok(Self::Bmp),
            "tiff" | "tif" => Ok(Self::Tiff),
            _ => Err(CarveError::UnknownFormat(s.to_string())),
        }
    }
}

/// How a candidate's end offset was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// An end marker, a declared length or the next image's signature.
    Terminated,
    /// No terminator was found; the length is a bounded guess.
    FallbackBounded,
}

/// An embedded image located in the source buffer. Borrows its bytes from
/// that buffer, so carving never copies image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCandidate<'a> {
    pub format: ImageFormat,
    pub start_offset: Offset,
    pub bytes: &'a [u8],
    pub termination: Termination,
}

impl<'a> ImageCandidate<'a> {
    pub fn new(
        format: ImageFormat,
        start_offset: Offset,
        bytes: &'a [u8],
        termination: Termination,
    ) -> Self {
        Self {
            format,
            start_offset,
            bytes,
            termination,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn end_offset(&self) -> Offset {
        self.start_offset + self.bytes.len()
    }

    #[inline]
    pub fn range(&self) -> Range<Offset> {
        self.start_offset..self.end_offset()
    }

    #[inline]
    pub fn contains_offset(&self, offset: Offset) -> bool {
        self.range().contains(&offset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormatCounts {
    pub jpeg: usize,
    pub png: usize,
    pub gif: usize,
    pub bmp: usize,
    pub tiff: usize,
}

impl FormatCounts {
    pub fn increment(&mut self, format: ImageFormat) {
        *self.slot(format) += 1;
    }

    pub fn get(&self, format: ImageFormat) -> usize {
        match format {
            ImageFormat::Jpeg => self.jpeg,
            ImageFormat::Png => self.png,
            ImageFormat::Gif => self.gif,
            ImageFormat::Bmp => self.bmp,
            ImageFormat::Tiff => self.tiff,
        }
    }

    pub fn total(&self) -> usize {
        self.jpeg + self.png + self.gif + self.bmp + self.tiff
    }

    fn slot(&mut self, format: ImageFormat) -> &mut usize {
        match format {
            ImageFormat::Jpeg => &mut self.jpeg,
            ImageFormat::Png => &mut self.png,
            ImageFormat::Gif => &mut self.gif,
            ImageFormat::Bmp => &mut self.bmp,
            ImageFormat::Tiff => &mut self.tiff,
        }
    }
}

/// Diagnostic tally of a scan. Nothing here is an error; dropped candidates
/// are only counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Candidates recorded by each detector, before dedup.
    pub detected: FormatCounts,
    pub undersized: usize,
    pub unmarked_jpeg: usize,
    pub implausible_bmp: usize,
    pub duplicates: usize,
}

impl ScanStats {
    pub fn dropped(&self) -> usize {
        self.undersized + self.unmarked_jpeg + self.implausible_bmp
    }
}

/// Deduplicated candidates in ascending offset order.
#[derive(Debug, Clone, Default)]
pub struct ScanResult<'a> {
    pub candidates: Vec<ImageCandidate<'a>>,
    pub stats: ScanStats,
}

impl<'a> ScanResult<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageCandidate<'a>> {
        self.candidates.iter()
    }

    pub fn count_by_format(&self) -> FormatCounts {
        let mut counts = FormatCounts::default();
        for candidate in &self.candidates {
            counts.increment(candidate.format);
        }
        counts
    }

    pub fn total_bytes(&self) -> usize {
        self.candidates.iter().map(ImageCandidate::len).sum()
    }

    pub fn summary(&self) -> String {
        let counts = self.count_by_format();
        let mut summary = format!(
            "Found {} unique images ({}):\n",
            self.len(),
            size_human(self.total_bytes() as u64)
        );
        for format in ImageFormat::ALL {
            summary.push_str(&format!(
                "  - {}: {} kept, {} detected\n",
                format,
                counts.get(format),
                self.stats.detected.get(format)
            ));
        }
        summary.push_str(&format!(
            "  duplicates: {}, dropped: {}\n",
            self.stats.duplicates,
            self.stats.dropped()
        ));
        summary
    }
}

pub fn size_human(size: u64) -> String {
    if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Tiff.extension(), "tiff");
        assert_eq!(ImageFormat::Bmp.extension(), "bmp");
    }

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("tif".parse::<ImageFormat>().unwrap(), ImageFormat::Tiff);
        assert!("webp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_candidate_range() {
        let data = [0u8; 64];
        let candidate =
            ImageCandidate::new(ImageFormat::Gif, 10, &data[10..40], Termination::Terminated);
        assert_eq!(candidate.end_offset(), 40);
        assert!(candidate.contains_offset(10));
        assert!(candidate.contains_offset(39));
        assert!(!candidate.contains_offset(40));
    }

    #[test]
    fn test_size_human() {
        assert_eq!(size_human(512), "512 B");
        assert_eq!(size_human(2048), "2.00 KB");
        assert!(size_human(3 * MB).contains("MB"));
    }
}
