//! Raster decode and encode.
//!
//! Every raster output is written twice: the original format (recompressed
//! when the target asks for it) and a lossless WebP copy.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};

/// Recompression settings.
#[derive(Debug, Clone, Copy)]
pub struct Compression {
    pub jpeg_quality: u8,
}

/// Decode `data`, naming `path` in errors.
pub fn decode(data: &[u8], path: &Path) -> Result<DynamicImage> {
    image::load_from_memory(data).with_context(|| format!("failed to decode {}", path.display()))
}

/// Format of a raster source, from its extension.
pub fn format_of(path: &Path) -> Result<ImageFormat> {
    match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format),
        _ => bail!("unsupported image format: {}", path.display()),
    }
}

/// Re-encode `img` as `format` with maximum PNG compression or the
/// configured JPEG quality.
pub fn compress(img: &DynamicImage, format: ImageFormat, options: Compression) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        other => bail!("cannot compress {other:?}"),
    }
    Ok(buf.into_inner())
}

/// Encode `img` as lossless WebP.
pub fn to_webp(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = WebPEncoder::new_lossless(&mut buf);
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)?;
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    }
    Ok(buf.into_inner())
}

/// Encode `img` as PNG with default settings.
pub fn to_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 4, |x, _| {
            Rgba([x as u8 * 30, 0, 0, if x % 2 == 0 { 255 } else { 128 }])
        }))
    }

    #[test]
    fn test_format_of() {
        assert_eq!(format_of(Path::new("a/b.PNG")).unwrap(), ImageFormat::Png);
        assert_eq!(format_of(Path::new("a.jpeg")).unwrap(), ImageFormat::Jpeg);
        assert!(format_of(Path::new("a.gif")).is_err());
    }

    #[test]
    fn test_webp_is_lossless() {
        let img = sample();
        let webp = to_webp(&img).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        let back = image::load_from_memory(&webp).unwrap();
        assert_eq!(back.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_compress_png_round_trips_pixels() {
        let img = sample();
        let png = compress(&img, ImageFormat::Png, Compression { jpeg_quality: 80 }).unwrap();
        let back = decode(&png, Path::new("a.png")).unwrap();
        assert_eq!(back.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_compress_jpeg_drops_alpha() {
        let jpg = compress(&sample(), ImageFormat::Jpeg, Compression { jpeg_quality: 60 }).unwrap();
        assert_eq!(&jpg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_decode_error_names_file() {
        let err = decode(b"not an image", Path::new("hero.png")).unwrap_err();
        assert!(err.to_string().contains("hero.png"));
    }
}
