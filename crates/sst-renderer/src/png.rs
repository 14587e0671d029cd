//! Streaming PNG encoding for RGBA image data.
//!
//! Output is always color type 6 (8-bit RGBA), filter type 0, no interlace.
//! Scanlines are pushed through a zlib encoder whose output is cut into
//! IDAT chunks of at most [`IDAT_CHUNK_SIZE`] bytes as it is produced, so a
//! full-resolution render never needs an uncompressed copy next to the
//! source pixel buffer.
//!
//! The encoder is deterministic: identical pixels and compression level
//! always produce identical bytes.

use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;

use crate::buffer::PixelBuffer;
use crate::error::{RenderError, RenderResult};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest IDAT payload emitted in one chunk.
pub const IDAT_CHUNK_SIZE: usize = 64 * 1024;

/// PNG limits dimensions to 2^31 - 1.
const MAX_DIMENSION: usize = i32::MAX as usize;

/// zlib level used for IDAT data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PngCompression {
    /// Stored blocks only
    None,
    #[default]
    Fast,
    Default,
    Best,
}

impl PngCompression {
    fn level(self) -> flate2::Compression {
        match self {
            PngCompression::None => flate2::Compression::none(),
            PngCompression::Fast => flate2::Compression::fast(),
            PngCompression::Default => flate2::Compression::default(),
            PngCompression::Best => flate2::Compression::best(),
        }
    }
}

impl FromStr for PngCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "stored" => Ok(PngCompression::None),
            "fast" => Ok(PngCompression::Fast),
            "default" => Ok(PngCompression::Default),
            "best" => Ok(PngCompression::Best),
            other => Err(format!("unknown PNG compression: {}", other)),
        }
    }
}

/// Write a PNG chunk
fn write_chunk<W: Write>(out: &mut W, chunk_type: &[u8; 4], data: &[u8]) -> io::Result<()> {
    out.write_all(&(data.len() as u32).to_be_bytes())?;
    out.write_all(chunk_type)?;
    out.write_all(data)?;

    let mut crc = crc32fast::Hasher::new();
    crc.update(chunk_type);
    crc.update(data);
    out.write_all(&crc.finalize().to_be_bytes())
}

/// Sink for compressed image data that frames it as IDAT chunks.
struct IdatWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> IdatWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(IDAT_CHUNK_SIZE),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            write_chunk(&mut self.inner, b"IDAT", &self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }

    fn finish(mut self) -> io::Result<W> {
        self.emit()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for IdatWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = IDAT_CHUNK_SIZE - self.pending.len();
        let n = room.min(buf.len());
        self.pending.extend_from_slice(&buf[..n]);
        if self.pending.len() == IDAT_CHUNK_SIZE {
            self.emit()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Row-at-a-time RGBA PNG encoder writing into any [`Write`].
///
/// ```ignore
/// let mut encoder = PngStreamEncoder::new(file, width, height, PngCompression::Fast)?;
/// for y in 0..height {
///     encoder.write_row(buffer.row(y))?;
/// }
/// let file = encoder.finish()?;
/// ```
pub struct PngStreamEncoder<W: Write> {
    encoder: ZlibEncoder<IdatWriter<W>>,
    width: usize,
    height: usize,
    rows_written: usize,
}

impl<W: Write> PngStreamEncoder<W> {
    /// Write the signature and IHDR, ready for `height` rows.
    pub fn new(
        mut writer: W,
        width: usize,
        height: usize,
        compression: PngCompression,
    ) -> io::Result<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported PNG dimensions {}x{}", width, height),
            ));
        }

        writer.write_all(&PNG_SIGNATURE)?;

        let mut ihdr_data = Vec::with_capacity(13);
        ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
        ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
        ihdr_data.push(8); // bit depth
        ihdr_data.push(6); // color type (RGBA)
        ihdr_data.push(0); // compression method
        ihdr_data.push(0); // filter method
        ihdr_data.push(0); // interlace method
        write_chunk(&mut writer, b"IHDR", &ihdr_data)?;

        Ok(Self {
            encoder: ZlibEncoder::new(IdatWriter::new(writer), compression.level()),
            width,
            height,
            rows_written: 0,
        })
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append one scanline of `width * 4` RGBA bytes.
    pub fn write_row(&mut self, row: &[u8]) -> io::Result<()> {
        if row.len() != self.width * 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("row has {} bytes, expected {}", row.len(), self.width * 4),
            ));
        }
        if self.rows_written >= self.height {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "more rows than declared image height",
            ));
        }

        self.encoder.write_all(&[0])?; // filter type: none
        self.encoder.write_all(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Append any number of whole scanlines.
    pub fn write_rows(&mut self, rows: &[u8]) -> io::Result<()> {
        let stride = self.width * 4;
        if rows.len() % stride != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "pixel data is not a whole number of rows",
            ));
        }
        for row in rows.chunks_exact(stride) {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush the remaining IDAT data, write IEND and hand back the writer.
    pub fn finish(self) -> io::Result<W> {
        if self.rows_written != self.height {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} of {} rows written", self.rows_written, self.height),
            ));
        }
        let idat = self.encoder.finish()?;
        let mut writer = idat.finish()?;
        write_chunk(&mut writer, b"IEND", &[])?;
        writer.flush()?;
        Ok(writer)
    }
}

/// Encode a whole buffer into `writer`, row by row.
pub fn encode_png<W: Write>(
    buffer: &PixelBuffer,
    writer: W,
    compression: PngCompression,
) -> RenderResult<W> {
    let mut encoder = PngStreamEncoder::new(writer, buffer.width(), buffer.height(), compression)?;
    encoder.write_rows(buffer.as_raw())?;
    Ok(encoder.finish()?)
}

/// Create a PNG image from RGBA pixel data (color type 6).
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(RenderError::InvalidBuffer(format!(
            "{} bytes for {}x{} RGBA",
            pixels.len(),
            width,
            height
        )));
    }
    let mut encoder = PngStreamEncoder::new(Vec::new(), width, height, PngCompression::Fast)?;
    encoder.write_rows(pixels)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split a PNG into (type, data) pairs, checking every CRC.
    fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        let mut out = Vec::new();
        let mut pos = 8;
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
            let data = png[pos + 8..pos + 8 + len].to_vec();
            let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
            assert_eq!(crc, crc32fast::hash(&png[pos + 4..pos + 8 + len]));
            out.push((kind, data));
            pos += 12 + len;
        }
        out
    }

    #[test]
    fn test_chunk_layout() {
        let pixels = [255, 0, 0, 255, 0, 255, 0, 255];
        let png = create_png(&pixels, 2, 1).unwrap();
        let kinds: Vec<[u8; 4]> = chunks(&png).into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![*b"IHDR", *b"IDAT", *b"IEND"]);
    }

    #[test]
    fn test_ihdr_fields() {
        let png = create_png(&[0u8; 3 * 5 * 4], 3, 5).unwrap();
        let (_, ihdr) = &chunks(&png)[0];
        assert_eq!(&ihdr[0..4], &3u32.to_be_bytes());
        assert_eq!(&ihdr[4..8], &5u32.to_be_bytes());
        assert_eq!(&ihdr[8..], &[8, 6, 0, 0, 0]);
    }

    #[test]
    fn test_large_image_spans_multiple_idat_chunks() {
        // 256x128 RGBA stored uncompressed is ~128 KiB of IDAT payload
        let buffer = PixelBuffer::filled(256, 128, [1, 2, 3, 255]);
        let png = encode_png(&buffer, Vec::new(), PngCompression::None).unwrap();
        let idats: Vec<usize> = chunks(&png)
            .into_iter()
            .filter(|(k, _)| k == b"IDAT")
            .map(|(_, d)| d.len())
            .collect();
        assert!(idats.len() >= 2);
        assert!(idats.iter().all(|&len| len <= IDAT_CHUNK_SIZE));
        assert!(idats[..idats.len() - 1].iter().all(|&len| len == IDAT_CHUNK_SIZE));
    }

    #[test]
    fn test_missing_rows_fail_finish() {
        let mut encoder = PngStreamEncoder::new(Vec::new(), 1, 2, PngCompression::Fast).unwrap();
        encoder.write_row(&[0, 0, 0, 255]).unwrap();
        assert!(encoder.finish().is_err());
    }

    #[test]
    fn test_extra_rows_rejected() {
        let mut encoder = PngStreamEncoder::new(Vec::new(), 1, 1, PngCompression::Fast).unwrap();
        encoder.write_row(&[0, 0, 0, 255]).unwrap();
        assert!(encoder.write_row(&[0, 0, 0, 255]).is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(PngStreamEncoder::new(Vec::new(), 0, 4, PngCompression::Fast).is_err());
    }

    #[test]
    fn test_wrong_pixel_length() {
        assert!(matches!(
            create_png(&[0u8; 7], 1, 2),
            Err(RenderError::InvalidBuffer(_))
        ));
    }
}
