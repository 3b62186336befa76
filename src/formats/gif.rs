use memchr::memmem::Finder;

use super::{find_from, keep_if_sized};
use crate::traits::FormatDetector;
use crate::types::{ImageCandidate, ImageFormat, ScanStats, Termination};

pub const GIF89A: [u8; 6] = *b"GIF89a";
pub const GIF87A: [u8; 6] = *b"GIF87a";
/// Block terminator followed by the GIF trailer byte `;`.
pub const GIF_TRAILER: [u8; 2] = [0x00, 0x3B];
pub const MAX_GIF_BYTES: usize = 10_000_000;
const CURSOR_GUARD: usize = 10;

/// Carves GIF streams up to, not including, the first `00 3B` trailer.
///
/// `GIF89a` headers are preferred: `GIF87a` is only searched for once no
/// `GIF89a` remains past the cursor.
#[derive(Debug, Clone)]
pub struct GifDetector {
    gif89a: Finder<'static>,
    gif87a: Finder<'static>,
    trailer: Finder<'static>,
    max_bytes: usize,
}

impl GifDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gif89a: Finder::new(&GIF89A),
            gif87a: Finder::new(&GIF87A),
            trailer: Finder::new(&GIF_TRAILER),
            max_bytes: MAX_GIF_BYTES,
        }
    }

    /// Length given to a GIF with no trailer after it.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for GifDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector for GifDetector {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn detect<'a>(&self, buffer: &'a [u8], stats: &mut ScanStats) -> Vec<ImageCandidate<'a>> {
        let mut candidates = Vec::new();
        let mut offset = 0;

        while offset + CURSOR_GUARD < buffer.len() {
            let Some(start) = find_from(&self.gif89a, buffer, offset)
                .or_else(|| find_from(&self.gif87a, buffer, offset))
            else {
                break;
            };

            let (end, termination) = match find_from(&self.trailer, buffer, start) {
                Some(pos) => (pos, Termination::Terminated),
                None => (
                    (start + self.max_bytes).min(buffer.len()),
                    Termination::FallbackBounded,
                ),
            };

            keep_if_sized(
                ImageCandidate::new(ImageFormat::Gif, start, &buffer[start..end], termination),
                &mut candidates,
                stats,
            );

            offset = if end < buffer.len() { end } else { start + 1 };
        }

        candidates
    }
}
