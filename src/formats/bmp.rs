use memchr::memmem::Finder;

use super::{find_from, find_within, keep_if_sized};
use crate::traits::FormatDetector;
use crate::types::{ImageCandidate, ImageFormat, ScanStats, Termination};

pub const BITMAPINFOHEADER: &[u8] = b"BITMAPINFOHEADER";
pub const BITMAPCOREHEADER: &[u8] = b"BITMAPCOREHEADER";
pub const BMP_MAGIC: [u8; 2] = *b"BM";

/// How far before a DIB header name a `BM` marker may sit.
pub const BM_LOOKBEHIND: usize = 100;
/// How far after a DIB header name a `BM` marker may sit.
pub const BM_LOOKAHEAD: usize = 1000;
pub const MIN_BMP_DECLARED: u32 = 100;
pub const MAX_BMP_DECLARED: u32 = 50_000_000;
const SIZE_FIELD_OFFSET: usize = 2;
const CURSOR_GUARD: usize = 100;

/// Carves bitmaps found through the DIB header type names that embedding
/// applications leave next to the pixel data.
///
/// The `BM` file header nearest the name supplies the length in its
/// little-endian size field, so a BMP candidate is always terminated.
#[derive(Debug, Clone)]
pub struct BmpDetector {
    info_header: Finder<'static>,
    core_header: Finder<'static>,
    magic: Finder<'static>,
}

impl BmpDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            info_header: Finder::new(BITMAPINFOHEADER),
            core_header: Finder::new(BITMAPCOREHEADER),
            magic: Finder::new(&BMP_MAGIC),
        }
    }

    /// Next DIB header name at or after `offset`. `BITMAPINFOHEADER` is
    /// preferred even when a `BITMAPCOREHEADER` occurs earlier.
    fn next_dib_name(&self, buffer: &[u8], offset: usize) -> Option<(usize, usize)> {
        find_from(&self.info_header, buffer, offset)
            .map(|pos| (pos, BITMAPINFOHEADER.len()))
            .or_else(|| {
                find_from(&self.core_header, buffer, offset)
                    .map(|pos| (pos, BITMAPCOREHEADER.len()))
            })
    }
}

impl Default for BmpDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector for BmpDetector {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn detect<'a>(&self, buffer: &'a [u8], stats: &mut ScanStats) -> Vec<ImageCandidate<'a>> {
        let mut candidates = Vec::new();
        let mut offset = 0;

        while offset + CURSOR_GUARD < buffer.len() {
            let Some((name_pos, name_len)) = self.next_dib_name(buffer, offset) else {
                break;
            };

            let window_start = name_pos.saturating_sub(BM_LOOKBEHIND);
            let window_end = name_pos + BM_LOOKAHEAD;

            if let Some(bm) = find_within(&self.magic, buffer, window_start, window_end) {
                if let Some(size) = declared_size(buffer, bm) {
                    let end = bm + size as usize;
                    if plausible_size(size) && end < buffer.len() {
                        keep_if_sized(
                            ImageCandidate::new(
                                ImageFormat::Bmp,
                                bm,
                                &buffer[bm..end],
                                Termination::Terminated,
                            ),
                            &mut candidates,
                            stats,
                        );
                    } else {
                        stats.implausible_bmp += 1;
                    }
                }
            }

            offset = name_pos + name_len;
        }

        candidates
    }
}

/// The `bfSize` field of a BMP file header starting at `bm`, if present.
pub fn declared_size(buffer: &[u8], bm: usize) -> Option<u32> {
    let start = bm.checked_add(SIZE_FIELD_OFFSET)?;
    let field = buffer.get(start..start + 4)?;
    Some(u32::from_le_bytes([field[0], field[1], field[2], field[3]]))
}

#[inline]
pub fn plausible_size(size: u32) -> bool {
    size > MIN_BMP_DECLARED && size < MAX_BMP_DECLARED
}
