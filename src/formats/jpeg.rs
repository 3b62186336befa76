use memchr::memmem::{self, Finder};

use super::{find_from, keep_if_sized};
use crate::traits::FormatDetector;
use crate::types::{ImageCandidate, ImageFormat, ScanStats, Termination};

pub const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

const APP0: [u8; 2] = [0xFF, 0xE0];
const APP1: [u8; 2] = [0xFF, 0xE1];
const IDENT_WINDOW: usize = 100;
const APP_MARKER_WINDOW: usize = 20;
const CURSOR_GUARD: usize = 4;

/// Carves JPEG streams bounded by SOI and the first following EOI.
///
/// A JPEG without an EOI anywhere after its SOI is not carved; the cursor
/// just steps past that SOI.
#[derive(Debug, Clone)]
pub struct JpegDetector {
    soi: Finder<'static>,
    eoi: Finder<'static>,
}

impl JpegDetector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            soi: Finder::new(&JPEG_SOI),
            eoi: Finder::new(&JPEG_EOI),
        }
    }
}

impl Default for JpegDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector for JpegDetector {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn detect<'a>(&self, buffer: &'a [u8], stats: &mut ScanStats) -> Vec<ImageCandidate<'a>> {
        let mut candidates = Vec::new();
        let mut offset = 0;

        while offset + CURSOR_GUARD < buffer.len() {
            let Some(soi) = find_from(&self.soi, buffer, offset) else {
                break;
            };

            let Some(eoi) = find_from(&self.eoi, buffer, soi + 2) else {
                offset = soi + 1;
                continue;
            };

            let end = eoi + JPEG_EOI.len();
            let data = &buffer[soi..end];

            if data.len() >= ImageFormat::Jpeg.min_len() && !has_app_marker(data) {
                stats.unmarked_jpeg += 1;
            } else {
                keep_if_sized(
                    ImageCandidate::new(ImageFormat::Jpeg, soi, data, Termination::Terminated),
                    &mut candidates,
                    stats,
                );
            }

            offset = end;
        }

        candidates
    }
}

/// True when the stream carries a JFIF/Exif identifier or an APP0/APP1
/// marker near its start. Bare SOI/EOI pairs inside compressed data rarely do.
pub fn has_app_marker(data: &[u8]) -> bool {
    let ident = &data[..data.len().min(IDENT_WINDOW)];
    let app = &data[..data.len().min(APP_MARKER_WINDOW)];

    memmem::find(ident, b"JFIF").is_some()
        || memmem::find(ident, b"Exif").is_some()
        || memmem::find(app, &APP0).is_some()
        || memmem::find(app, &APP1).is_some()
}
