//! PNG encoding of rendered maps.
//!
//! Maps are written as indexed PNGs (colour type 3) whenever they hold at
//! most 256 distinct RGBA colours. A ramp quantized to 255 levels plus the
//! transparent no-data colour always fits, so truecolour with alpha
//! (colour type 6) is only a fallback for unquantized pixel buffers.
//!
//! Chunks are framed by hand: `flate2` provides the zlib stream for IDAT and
//! `crc32fast` the chunk checksums.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use crate::error::RenderError;

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Distinct colours of an RGBA image and each pixel's index into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl Palette {
    /// Build a palette from RGBA bytes, or `None` if the image has more
    /// than 256 colours.
    pub fn extract(pixels: &[u8]) -> Option<Self> {
        if pixels.len() / 4 >= PARALLEL_THRESHOLD {
            Self::extract_parallel(pixels)
        } else {
            Self::extract_sequential(pixels)
        }
    }

    /// Palette in order of first appearance.
    fn extract_sequential(pixels: &[u8]) -> Option<Self> {
        let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
        let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
        let mut indices = Vec::with_capacity(pixels.len() / 4);

        for px in pixels.chunks_exact(4) {
            let key = pack(px);
            let index = match lookup.get(&key) {
                Some(&index) => index,
                None => {
                    if colors.len() == MAX_PALETTE_SIZE {
                        return None;
                    }
                    let index = colors.len() as u8;
                    colors.push(key.to_le_bytes());
                    lookup.insert(key, index);
                    index
                }
            };
            indices.push(index);
        }

        Some(Self { colors, indices })
    }

    /// Palette sorted by packed colour value.
    ///
    /// One parallel pass collects the distinct colours per chunk, a second
    /// maps every pixel to its index.
    fn extract_parallel(pixels: &[u8]) -> Option<Self> {
        let distinct = pixels
            .par_chunks_exact(4)
            .fold(HashSet::new, |mut seen, px| {
                // Stop growing once the image is known not to fit
                if seen.len() <= MAX_PALETTE_SIZE {
                    seen.insert(pack(px));
                }
                seen
            })
            .reduce(HashSet::new, |mut a, b| {
                a.extend(b);
                a
            });

        if distinct.len() > MAX_PALETTE_SIZE {
            return None;
        }

        let mut keys: Vec<u32> = distinct.into_iter().collect();
        keys.sort_unstable();
        let lookup: HashMap<u32, u8> = keys
            .iter()
            .enumerate()
            .map(|(index, &key)| (key, index as u8))
            .collect();

        let indices = pixels
            .par_chunks_exact(4)
            .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
            .collect();

        Some(Self {
            colors: keys.into_iter().map(u32::to_le_bytes).collect(),
            indices,
        })
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Whether any entry is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.colors.iter().any(|c| c[3] < 255)
    }
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Encode RGBA pixels, indexed when the palette fits and RGBA otherwise.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width, height, 4)?;
    match Palette::extract(pixels) {
        Some(palette) => encode_indexed(&palette, width, height),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode a palette image (colour type 3, 8 bit indices).
///
/// A tRNS chunk is written only when some palette entry is translucent.
pub fn encode_indexed(
    palette: &Palette,
    width: usize,
    height: usize,
) -> Result<Vec<u8>, RenderError> {
    check_len(palette.indices.len(), width, height, 1)?;

    let plte: Vec<u8> = palette.colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let idat = compress_scanlines(&palette.indices, width)?;

    let mut png = start_png(width, height, COLOR_TYPE_INDEXED);
    write_chunk(&mut png, b"PLTE", &plte);
    if palette.has_transparency() {
        let trns: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode truecolour with alpha (colour type 6).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, RenderError> {
    check_len(pixels.len(), width, height, 4)?;

    let idat = compress_scanlines(pixels, width * 4)?;

    let mut png = start_png(width, height, COLOR_TYPE_RGBA);
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(
    actual: usize,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    let expected = width * height * bytes_per_pixel;
    if actual != expected {
        return Err(RenderError::BufferSize { expected, actual });
    }
    Ok(())
}

/// Signature plus IHDR for an 8 bit image.
fn start_png(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter and interlace methods stay 0

    let mut png = Vec::with_capacity(64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr);
    png
}

/// Prefix each scanline with filter type 0 and zlib-compress the result.
fn compress_scanlines(data: &[u8], row_bytes: usize) -> io::Result<Vec<u8>> {
    let rows = data.len() / row_bytes;
    let mut raw = Vec::with_capacity(data.len() + rows);
    for row in data.chunks_exact(row_bytes) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw)?;
    encoder.finish()
}

/// Append a length-prefixed chunk with its CRC over type and data.
fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    png.extend_from_slice(&crc.finalize().to_be_bytes());
}

/// Read `(width, height)` back from a PNG's IHDR chunk.
pub fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    if png.len() < 24 || png[0..8] != PNG_SIGNATURE || &png[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quantized ramp image with scattered no-data pixels.
    fn map_like_pixels(width: usize, height: usize, levels: usize) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                if (x + y) % 17 == 0 {
                    pixels.extend_from_slice(&[0, 0, 0, 0]);
                    continue;
                }
                let level = ((x * levels) / width) as u8;
                pixels.extend_from_slice(&[level, 255 - level, (y % 2) as u8 * 40, 255]);
            }
        }
        pixels
    }

    fn many_colours(n: u32) -> Vec<u8> {
        (0..n)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
            .collect()
    }

    #[test]
    fn test_palette_first_appearance_order() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 0, 0, // no data
            255, 0, 0, 255, // red again
        ];

        let palette = Palette::extract(&pixels).unwrap();
        assert_eq!(palette.colors().len(), 3);
        assert_eq!(palette.indices(), &[0, 1, 2, 0]);
        assert!(palette.has_transparency());
    }

    #[test]
    fn test_parallel_palette_maps_back_to_pixels() {
        // 128x128 is above PARALLEL_THRESHOLD
        let pixels = map_like_pixels(128, 128, 50);

        let parallel = Palette::extract_parallel(&pixels).unwrap();
        let sequential = Palette::extract_sequential(&pixels).unwrap();
        assert_eq!(parallel.colors().len(), sequential.colors().len());

        for (i, &index) in parallel.indices().iter().enumerate() {
            assert_eq!(&pixels[i * 4..i * 4 + 4], &parallel.colors()[index as usize]);
        }
    }

    #[test]
    fn test_too_many_colours() {
        let pixels = many_colours(300);
        assert!(Palette::extract_sequential(&pixels).is_none());

        let large = many_colours(5000);
        assert!(Palette::extract_parallel(&large).is_none());
    }

    #[test]
    fn test_indexed_png_structure() {
        let pixels = map_like_pixels(40, 20, 10);
        let png = encode_png(&pixels, 40, 20).unwrap();

        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(png_dimensions(&png), Some((40, 20)));
        assert_eq!(png[25], COLOR_TYPE_INDEXED);
        assert!(png.windows(4).any(|w| w == b"PLTE"));
        assert!(png.windows(4).any(|w| w == b"tRNS"));
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_opaque_palette_has_no_trns() {
        let png = encode_png(&[10, 20, 30, 255, 40, 50, 60, 255], 2, 1).unwrap();
        assert!(!png.windows(4).any(|w| w == b"tRNS"));
    }

    #[test]
    fn test_rgba_fallback() {
        let png = encode_png(&many_colours(300), 300, 1).unwrap();
        assert_eq!(png[25], COLOR_TYPE_RGBA);
        assert_eq!(png_dimensions(&png), Some((300, 1)));
    }

    #[test]
    fn test_indexed_smaller_than_rgba() {
        let pixels = map_like_pixels(256, 128, 32);
        let indexed = encode_png(&pixels, 256, 128).unwrap();
        let rgba = encode_rgba(&pixels, 256, 128).unwrap();
        assert!(indexed.len() < rgba.len());
    }

    #[test]
    fn test_ihdr_crc() {
        let png = encode_rgba(&[0, 0, 0, 255], 1, 1).unwrap();
        let crc = u32::from_be_bytes([png[29], png[30], png[31], png[32]]);
        assert_eq!(crc, crc32fast::hash(&png[12..29]));
    }

    #[test]
    fn test_buffer_size_checked() {
        let err = encode_rgba(&[0; 12], 2, 2).unwrap_err();
        assert!(matches!(err, RenderError::BufferSize { expected: 16, actual: 12 }));
        assert!(matches!(
            encode_png(&[], 0, 5),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_png_dimensions_rejects_garbage() {
        assert_eq!(png_dimensions(b"not a png"), None);
    }
}
