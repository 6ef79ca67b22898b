//! Icon conversion to the device bitmap format.

use super::EncodedIcon;
use flate2::{Compress, Compression, FlushCompress, Status};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::io::Read;

/// Icon edge length in pixels
pub const ICON_DIM: u32 = 32;

/// Size of the uncompressed RGB565 pixel grid
pub const ICON_PIXEL_BYTES: usize = (ICON_DIM * ICON_DIM * 2) as usize;

/// Deflate window size (2^10), matching the small fixed payload
const WINDOW_BITS: u8 = 10;

const ZLIB_HEADER_LEN: usize = 2;
const ZLIB_TRAILER_LEN: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("failed to decode icon image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("icon image has no alpha channel ({0:?})")]
    NoAlpha(image::ColorType),

    #[error("icon compression failed: {0}")]
    Compress(String),

    #[error("icon decompression failed: {0}")]
    Decompress(#[from] std::io::Error),
}

/// Convert arbitrary image bytes into an [`EncodedIcon`]
pub fn encode_icon(image_bytes: &[u8]) -> Result<EncodedIcon, IconError> {
    let decoded = image::load_from_memory(image_bytes)?;
    if !decoded.color().has_alpha() {
        return Err(IconError::NoAlpha(decoded.color()));
    }

    let resized = imageops::resize(&decoded.to_rgba8(), ICON_DIM, ICON_DIM, FilterType::Lanczos3);
    let pixels = quantize(&resized);
    compress(&pixels).map(EncodedIcon)
}

/// Flatten alpha onto black and pack every pixel as big-endian RGB565
pub fn quantize(icon: &RgbaImage) -> Vec<u8> {
    let mut data = Vec::with_capacity(icon.width() as usize * icon.height() as usize * 2);
    for pixel in icon.pixels() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = (over_black(r, a), over_black(g, a), over_black(b, a));
        let c: u16 = ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | ((b as u16 & 0xF8) >> 3);
        data.extend_from_slice(&c.to_be_bytes());
    }
    data
}

fn over_black(channel: u8, alpha: u8) -> u8 {
    ((channel as u32 * alpha as u32 + 127) / 255) as u8
}

/// zlib at maximum level with a 1 KiB window, then strip the 2-byte header
/// and the 4-byte Adler-32 trailer
fn compress(pixels: &[u8]) -> Result<Vec<u8>, IconError> {
    let mut compressor = Compress::new_with_window_bits(Compression::best(), true, WINDOW_BITS);
    let mut out = Vec::with_capacity(pixels.len() + 64);

    loop {
        if out.len() == out.capacity() {
            out.reserve(256);
        }
        let consumed = compressor.total_in() as usize;
        let status = compressor
            .compress_vec(&pixels[consumed..], &mut out, FlushCompress::Finish)
            .map_err(|e| IconError::Compress(e.to_string()))?;
        if status == Status::StreamEnd {
            break;
        }
    }

    if out.len() < ZLIB_HEADER_LEN + ZLIB_TRAILER_LEN {
        return Err(IconError::Compress(format!("zlib stream too short ({} bytes)", out.len())));
    }
    Ok(out[ZLIB_HEADER_LEN..out.len() - ZLIB_TRAILER_LEN].to_vec())
}

/// Inflate an encoded icon back into its RGB565 pixel grid
pub fn decode_icon(icon: &EncodedIcon) -> Result<Vec<u8>, IconError> {
    let mut pixels = Vec::with_capacity(ICON_PIXEL_BYTES);
    flate2::read::DeflateDecoder::new(icon.as_bytes()).read_to_end(&mut pixels)?;
    Ok(pixels)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba};
    use std::io::Cursor;

    /// PNG bytes of a square RGBA gradient with partial transparency
    pub(crate) fn sample_png(dim: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(dim, dim, |x, y| {
            Rgba([(x * 255 / dim) as u8, (y * 255 / dim) as u8, 0x80, ((x + y) % 256) as u8])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_round_trip_matches_quantized_reference() {
        let png = sample_png(32);
        let encoded = encode_icon(&png).unwrap();
        assert!(encoded.len() < ICON_PIXEL_BYTES);

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        let reference = quantize(&imageops::resize(
            &decoded,
            ICON_DIM,
            ICON_DIM,
            FilterType::Lanczos3,
        ));

        let pixels = decode_icon(&encoded).unwrap();
        assert_eq!(pixels.len(), ICON_PIXEL_BYTES);
        assert_eq!(pixels, reference);
    }

    #[test]
    fn test_large_icon_is_resampled() {
        let encoded = encode_icon(&sample_png(200)).unwrap();
        assert_eq!(decode_icon(&encoded).unwrap().len(), ICON_PIXEL_BYTES);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let png = sample_png(64);
        assert_eq!(encode_icon(&png).unwrap(), encode_icon(&png).unwrap());
    }

    #[test]
    fn test_alpha_is_flattened_onto_black() {
        let transparent = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0]));
        assert_eq!(quantize(&transparent), vec![0x00, 0x00]);

        let opaque_white = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        assert_eq!(quantize(&opaque_white), vec![0xFF, 0xFF]);

        let opaque_red = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        assert_eq!(quantize(&opaque_red), vec![0xF8, 0x00]);
    }

    #[test]
    fn test_image_without_alpha_is_rejected() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        assert!(matches!(encode_icon(&buf), Err(IconError::NoAlpha(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(encode_icon(b"not an image"), Err(IconError::Decode(_))));
    }
}
