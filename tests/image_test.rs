//! Image classification through the standard registry.

use std::fs;
use std::io::{Cursor, Seek, SeekFrom};

use docx_oxml::image::{Emu, HEADER_LEN, Image, ImageFormat, ImageRegistry};
use docx_oxml::Error;
use tempfile::TempDir;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    out.extend_from_slice(&13u32.to_be_bytes());
    out.extend_from_slice(b"IHDR");
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&[8, 2, 0, 0, 0]);
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(b"IEND");
    out.extend_from_slice(&[0; 4]);
    out
}

fn gif(width: u16, height: u16) -> Vec<u8> {
    let mut out = b"GIF89a".to_vec();
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&[0, 0, 0, 0x3B]);
    out
}

fn bmp(width: i32, height: i32) -> Vec<u8> {
    let mut out = vec![0u8; 0x36];
    out[0..2].copy_from_slice(b"BM");
    out[0x12..0x16].copy_from_slice(&width.to_le_bytes());
    out[0x16..0x1A].copy_from_slice(&height.to_le_bytes());
    out[0x1C..0x1E].copy_from_slice(&8u16.to_le_bytes());
    out
}

#[test]
fn test_png_classification() {
    let image = Image::from_blob(png(800, 600), Some("chart.png".to_string())).unwrap();
    assert_eq!(image.format(), ImageFormat::Png);
    assert_eq!(image.content_type(), "image/png");
    assert_eq!((image.px_width(), image.px_height()), (800, 600));
    assert_eq!((image.horz_dpi(), image.vert_dpi()), (72, 72));
    assert_eq!(image.ext(), "png");
    // 800 px at 72 dpi
    assert_eq!(image.width(), Emu(800 * 914400 / 72));
}

#[test]
fn test_format_comes_from_bytes_not_name() {
    let image = Image::from_blob(gif(3, 4), Some("mislabeled.png".to_string())).unwrap();
    assert_eq!(image.format(), ImageFormat::Gif);
    assert_eq!(image.content_type(), "image/gif");
    assert_eq!(image.ext(), "png");
}

#[test]
fn test_unrecognized_format() {
    let data = b"%PDF-1.7 not an image at all, padded out past the header".to_vec();
    let err = Image::from_blob(data.clone(), None).unwrap_err();
    match err {
        Error::UnrecognizedFormat { prefix } => assert_eq!(prefix, data[..HEADER_LEN].to_vec()),
        other => panic!("expected unrecognized format, got {other:?}"),
    }

    assert!(matches!(
        ImageRegistry::standard().classify(b""),
        Err(Error::UnrecognizedFormat { .. })
    ));
}

#[test]
fn test_bmp_and_gif() {
    let image = Image::from_blob(bmp(64, -32), None).unwrap();
    assert_eq!(image.format(), ImageFormat::Bmp);
    assert_eq!((image.px_width(), image.px_height()), (64, 32));
    assert_eq!(image.attrs().get("bit_depth"), Some(8));
    assert_eq!(image.ext(), "bmp");

    let image = Image::from_blob(gif(400, 300), None).unwrap();
    assert_eq!((image.px_width(), image.px_height()), (400, 300));
}

#[test]
fn test_standard_registry_order() {
    let names: Vec<_> = ImageRegistry::standard()
        .recognizers()
        .iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names[0], "png");
    assert_eq!(names.len(), 7);
    assert_eq!(names.last(), Some(&"bmp"));
}

#[test]
fn test_path_and_stream_agree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("figure.png");
    let data = png(1024, 768);
    fs::write(&path, &data).unwrap();

    let from_path = Image::from_file(&path).unwrap();
    assert_eq!(from_path.filename(), Some("figure.png"));

    let mut cursor = Cursor::new(data);
    cursor.seek(SeekFrom::End(0)).unwrap();
    let from_stream = Image::from_stream(&mut cursor).unwrap();
    assert_eq!(from_stream.filename(), None);

    assert_eq!(from_path.format(), from_stream.format());
    assert_eq!(from_path.px_width(), from_stream.px_width());
    assert_eq!(from_path.px_height(), from_stream.px_height());
    assert_eq!(from_path.attrs(), from_stream.attrs());
    assert_eq!(from_path.sha1(), from_stream.sha1());
    assert_eq!(from_path.blob(), from_stream.blob());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Image::from_file(dir.path().join("absent.png")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_scaled_dimensions_keep_aspect() {
    let image = Image::from_blob(png(200, 100), None).unwrap();
    let (w, h) = image.scaled_dimensions(Some(Emu::from_inches(1.0)), None);
    assert_eq!(w, Emu(914400));
    assert_eq!(h, Emu(457200));
}
