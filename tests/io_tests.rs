use std::io::Write;
use tempfile::NamedTempFile;

use slidecarve::carving::carve;
use slidecarve::formats::gif::{GIF_TRAILER, GIF89A};
use slidecarve::io::SourceFile;
use slidecarve::types::ImageFormat;

#[test]
fn test_source_file_scans_in_place() {
    let mut gif = GIF89A.to_vec();
    gif.extend(vec![0x55; 600]);
    gif.extend_from_slice(&GIF_TRAILER);

    let mut doc = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    doc.resize(512, 0x00);
    doc.extend_from_slice(&gif);
    doc.extend(vec![0x00; 512]);

    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(&doc).unwrap();
    temp.flush().unwrap();

    let source = SourceFile::open(temp.path()).unwrap();
    assert_eq!(source.len(), doc.len());

    let result = carve(source.as_bytes());
    assert_eq!(result.len(), 1);
    assert_eq!(result.candidates[0].format, ImageFormat::Gif);
    assert_eq!(result.candidates[0].start_offset, 512);
    assert_eq!(
        result.candidates[0].bytes,
        &gif[..gif.len() - GIF_TRAILER.len()]
    );
}
