use memchr::memmem::Finder;

use super::{find_from, keep_if_sized};
use crate::traits::FormatDetector;
use crate::types::{ImageCandidate, ImageFormat, ScanStats, Termination};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// `IEND` chunk type followed by its fixed CRC.
pub const PNG_IEND_TRAILER: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];
pub const PNG_IEND: [u8; 4] = *b"IEND";

/// Bytes taken from the start of a bare `IEND` match when the CRC is absent.
pub const IEND_FALLBACK_SPAN: usize = 12;
pub const MAX_PNG_BYTES: usize = 50_000_000;
const CURSOR_GUARD: usize = 8;

/// Carves PNG streams from signature to the `IEND` trailer.
#[derive(Debug, Clone)]
pub struct PngDetector {
    signature: Finder<'static>,
    trailer: Finder<'static>,
    iend: Finder<'static>,
    max_bytes: usize,
}

impl PngDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            signature: Finder::new(&PNG_SIGNATURE),
            trailer: Finder::new(&PNG_IEND_TRAILER),
            iend: Finder::new(&PNG_IEND),
            max_bytes: MAX_PNG_BYTES,
        }
    }

    /// A bare `IEND` must start less than `max_bytes` past the signature.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for PngDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector for PngDetector {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn detect<'a>(&self, buffer: &'a [u8], stats: &mut ScanStats) -> Vec<ImageCandidate<'a>> {
        let mut candidates = Vec::new();
        let mut offset = 0;

        while offset + CURSOR_GUARD < buffer.len() {
            let Some(start) = find_from(&self.signature, buffer, offset) else {
                break;
            };

            if let Some(trailer) = find_from(&self.trailer, buffer, start) {
                let end = trailer + PNG_IEND_TRAILER.len();
                keep_if_sized(
                    ImageCandidate::new(
                        ImageFormat::Png,
                        start,
                        &buffer[start..end],
                        Termination::Terminated,
                    ),
                    &mut candidates,
                    stats,
                );
                offset = end;
                continue;
            }

            // CRC bytes missing or damaged: cut a fixed span after a bare IEND.
            if let Some(iend) = find_from(&self.iend, buffer, start)
                .filter(|&pos| pos < start + self.max_bytes)
            {
                let end = (iend + IEND_FALLBACK_SPAN).min(buffer.len());
                keep_if_sized(
                    ImageCandidate::new(
                        ImageFormat::Png,
                        start,
                        &buffer[start..end],
                        Termination::FallbackBounded,
                    ),
                    &mut candidates,
                    stats,
                );
            }
            offset = start + 1;
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_with_body(body_len: usize) -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(vec![0x44; body_len]);
        png.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        png.extend_from_slice(&PNG_IEND_TRAILER);
        png
    }

    #[test]
    fn carves_terminated_png() {
        let mut buffer = vec![0x00; 32];
        let png = png_with_body(200);
        buffer.extend_from_slice(&png);
        buffer.extend(vec![0x00; 32]);

        let mut stats = ScanStats::default();
        let found = PngDetector::new().detect(&buffer, &mut stats);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_offset, 32);
        assert_eq!(found[0].bytes, png.as_slice());
        assert_eq!(found[0].termination, Termination::Terminated);
    }

    #[test]
    fn bare_iend_uses_fixed_span() {
        let mut buffer = PNG_SIGNATURE.to_vec();
        buffer.extend(vec![0x44; 150]);
        let iend_pos = buffer.len();
        buffer.extend_from_slice(b"IEND");
        buffer.extend(vec![0x00; 40]);

        let mut stats = ScanStats::default();
        let found = PngDetector::new().detect(&buffer, &mut stats);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].len(), iend_pos + IEND_FALLBACK_SPAN);
        assert_eq!(found[0].termination, Termination::FallbackBounded);
    }

    #[test]
    fn bare_iend_span_is_clipped_to_buffer() {
        let mut buffer = PNG_SIGNATURE.to_vec();
        buffer.extend(vec![0x44; 150]);
        buffer.extend_from_slice(b"IEND");

        let mut stats = ScanStats::default();
        let found = PngDetector::new().detect(&buffer, &mut stats);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].end_offset(), buffer.len());
    }

    #[test]
    fn bare_iend_must_start_inside_window() {
        let mut buffer = vec![0x00; 16];
        buffer.extend_from_slice(&PNG_SIGNATURE);
        buffer.extend(vec![0x44; 492]);
        // IEND at exactly signature + 500.
        buffer.extend_from_slice(b"IEND");
        buffer.extend(vec![0x00; 40]);

        let mut stats = ScanStats::default();
        let outside = PngDetector::new()
            .with_max_bytes(500)
            .detect(&buffer, &mut stats);
        assert!(outside.is_empty());
        assert_eq!(stats, ScanStats::default());

        let inside = PngDetector::new()
            .with_max_bytes(501)
            .detect(&buffer, &mut stats);
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].start_offset, 16);
        assert_eq!(inside[0].len(), 500 + IEND_FALLBACK_SPAN);
    }

    #[test]
    fn png_without_any_iend_is_skipped() {
        let mut buffer = PNG_SIGNATURE.to_vec();
        buffer.extend(vec![0x44; 500]);

        let mut stats = ScanStats::default();
        assert!(PngDetector::new().detect(&buffer, &mut stats).is_empty());
    }

    #[test]
    fn undersized_png_is_counted() {
        let buffer = png_with_body(10);
        let mut stats = ScanStats::default();
        assert!(PngDetector::new().detect(&buffer, &mut stats).is_empty());
        assert_eq!(stats.undersized, 1);
    }
}
