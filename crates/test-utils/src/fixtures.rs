//! Common test fixtures for heatmap tests.
//!
//! Base maps are plain RGBA byte vectors so both the renderer and the
//! service tests can use them without depending on each other.

use std::io::{Cursor, Write};

/// Base-map colors used across tests.
pub mod colors {
    /// Blue-dominant ocean pixel
    pub const WATER: [u8; 4] = [10, 20, 200, 255];

    /// Sandy land pixel (not blue-dominant)
    pub const LAND: [u8; 4] = [200, 180, 50, 255];

    /// Half-transparent land pixel, for alpha preservation checks
    pub const LAND_TRANSLUCENT: [u8; 4] = [200, 180, 50, 128];
}

/// RGBA bytes of a `width x height` image filled with `rgba`.
pub fn solid_rgba(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 4);
    for _ in 0..width * height {
        data.extend_from_slice(&rgba);
    }
    data
}

/// Base map whose left half is water and right half is land.
pub fn half_water_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 4);
    for _ in 0..height {
        for x in 0..width {
            let px = if x < width / 2 {
                colors::WATER
            } else {
                colors::LAND
            };
            data.extend_from_slice(&px);
        }
    }
    data
}

/// Encode RGBA bytes as a PNG file using the `image` crate.
pub fn encode_base_png(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba).expect("rgba length matches size");
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png)
        .expect("png encoding");
    out.into_inner()
}

/// Decode PNG bytes back into `(width, height, rgba)`.
pub fn decode_png(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let img = image::load_from_memory(bytes).expect("valid image").to_rgba8();
    (img.width(), img.height(), img.into_raw())
}

/// Build a zip archive in memory from `(name, contents)` entries.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(contents).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_water_layout() {
        let data = half_water_rgba(4, 1);
        assert_eq!(&data[0..4], &colors::WATER);
        assert_eq!(&data[12..16], &colors::LAND);
    }

    #[test]
    fn test_base_png_roundtrip() {
        let rgba = half_water_rgba(6, 3);
        let png = encode_base_png(6, 3, rgba.clone());
        assert_eq!(decode_png(&png), (6, 3, rgba));
    }

    #[test]
    fn test_zip_archive_entries() {
        let bytes = zip_archive(&[("a.txt", b"hello".as_slice()), ("data/b.grid", &[1, 2, 3])]);
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
    }
}
