//! JPEG and PNG encoding of finished canvases.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use tiny_skia::Pixmap;

use crate::error::{Error, Result};
use crate::request::CompressFormat;

/// Encode `pixmap` in `format`. `jpeg_quality` is ignored for PNG.
pub(crate) fn encode(pixmap: &Pixmap, format: CompressFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut out = Vec::new();
    let to_error = |e: image::ImageError| Error::Encoding {
        format,
        reason: e.to_string(),
    };

    match format {
        CompressFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = straight_pixels(pixmap, false);
            JpegEncoder::new_with_quality(&mut out, jpeg_quality)
                .write_image(&rgb, width, height, ColorType::Rgb8)
                .map_err(to_error)?;
        }
        CompressFormat::Png => {
            let rgba = straight_pixels(pixmap, true);
            PngEncoder::new(&mut out)
                .write_image(&rgba, width, height, ColorType::Rgba8)
                .map_err(to_error)?;
        }
    }

    Ok(out)
}

/// tiny-skia stores premultiplied RGBA; encoders want straight color.
fn straight_pixels(pixmap: &Pixmap, with_alpha: bool) -> Vec<u8> {
    let channels = if with_alpha { 4 } else { 3 };
    let mut data = Vec::with_capacity(pixmap.pixels().len() * channels);

    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        if with_alpha {
            data.push(c.alpha());
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn solid(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(Color::from_rgba8(200, 30, 60, 255));
        pixmap
    }

    #[test]
    fn png_is_lossless() {
        let data = encode(&solid(7, 3), CompressFormat::Png, 100).unwrap();
        let decoded = image::load_from_memory(&data).unwrap().into_rgba8();

        assert_eq!(decoded.dimensions(), (7, 3));
        assert!(decoded.pixels().all(|p| p.0 == [200, 30, 60, 255]));
    }

    #[test]
    fn jpeg_keeps_dimensions() {
        let data = encode(&solid(16, 9), CompressFormat::Jpeg, 100).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (16, 9));
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn straight_pixels_drop_alpha_for_rgb() {
        let pixmap = solid(2, 1);
        assert_eq!(straight_pixels(&pixmap, false), vec![200, 30, 60, 200, 30, 60]);
        assert_eq!(straight_pixels(&pixmap, true).len(), 8);
    }
}
