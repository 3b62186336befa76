use memchr::memmem::Finder;

use super::jpeg::JPEG_SOI;
use super::png::PNG_SIGNATURE;
use super::{find_from, keep_if_sized};
use crate::traits::FormatDetector;
use crate::types::{ImageCandidate, ImageFormat, ScanStats, Termination};

pub const TIFF_LE: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];
pub const TIFF_BE: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];

pub const TIFF_PROBE_STRIDE: usize = 1000;
pub const TIFF_PROBE_LIMIT: usize = 10_000_000;
pub const MAX_TIFF_BYTES: usize = 50_000_000;
const CURSOR_GUARD: usize = 10;

/// Carves TIFF files. TIFF has no end marker, so the end is the first
/// stride-aligned probe that lands on a JPEG or PNG start, else a fixed cap.
#[derive(Debug, Clone)]
pub struct TiffDetector {
    little_endian: Finder<'static>,
    big_endian: Finder<'static>,
    probe_limit: usize,
    max_bytes: usize,
}

impl TiffDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            little_endian: Finder::new(&TIFF_LE),
            big_endian: Finder::new(&TIFF_BE),
            probe_limit: TIFF_PROBE_LIMIT,
            max_bytes: MAX_TIFF_BYTES,
        }
    }

    /// Probes stop before `start + probe_limit`.
    #[must_use]
    pub fn with_probe_limit(mut self, probe_limit: usize) -> Self {
        self.probe_limit = probe_limit;
        self
    }

    /// Length given to a TIFF when no probe hits.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for TiffDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector for TiffDetector {
    fn format(&self) -> ImageFormat {
        ImageFormat::Tiff
    }

    fn detect<'a>(&self, buffer: &'a [u8], stats: &mut ScanStats) -> Vec<ImageCandidate<'a>> {
        let mut candidates = Vec::new();
        let mut offset = 0;

        while offset + CURSOR_GUARD < buffer.len() {
            let Some(start) = find_from(&self.little_endian, buffer, offset)
                .or_else(|| find_from(&self.big_endian, buffer, offset))
            else {
                break;
            };

            let (end, termination) = match probe_next_image(buffer, start, self.probe_limit) {
                Some(pos) => (pos, Termination::Terminated),
                None => (
                    (start + self.max_bytes).min(buffer.len()),
                    Termination::FallbackBounded,
                ),
            };

            keep_if_sized(
                ImageCandidate::new(ImageFormat::Tiff, start, &buffer[start..end], termination),
                &mut candidates,
                stats,
            );

            offset = end;
        }

        candidates
    }
}

/// First probe offset in `start + 1000, start + 2000, ...` that begins a
/// JPEG (`FF D8`) or PNG stream, below `start + probe_limit`.
pub fn probe_next_image(buffer: &[u8], start: usize, probe_limit: usize) -> Option<usize> {
    let limit = (start + probe_limit).min(buffer.len());

    (start + TIFF_PROBE_STRIDE..limit)
        .step_by(TIFF_PROBE_STRIDE)
        .find(|&pos| {
            let tail = &buffer[pos..];
            tail.starts_with(&JPEG_SOI[..2]) || tail.starts_with(&PNG_SIGNATURE)
        })
}
