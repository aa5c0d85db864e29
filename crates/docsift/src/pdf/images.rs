//! Decoding of PDF image XObjects and re-encoding to JPEG.
//!
//! Supported encodings:
//! - `DCTDecode` streams are JPEG already and are decoded with `image`
//! - unfiltered or `FlateDecode` samples in `DeviceRGB`, `DeviceGray` or
//!   `DeviceCMYK` at 8 bits per component
//!
//! `JPXDecode`, `CCITTFaxDecode` and `JBIG2Decode` images are reported as
//! unsupported and skipped by the caller.
//!
//! Sample buffers are sized from the declared dimensions and never exceed
//! [`MAX_IMAGE_SAMPLES`]. A lone `FlateDecode` stream is inflated only up to
//! that size; other filter chains go through lopdf and are rejected when they
//! expand past it.

use super::error::{PdfError, Result};
use flate2::read::ZlibDecoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::xobject::PdfImage;
use lopdf::{Document, Object};
use std::io::Read;

/// Re-encoding quality for extracted images.
pub const JPEG_QUALITY: u8 = 100;

/// Largest raw sample buffer accepted for one image (256 MiB).
pub const MAX_IMAGE_SAMPLES: usize = 256 * 1024 * 1024;

const UNSUPPORTED_FILTERS: &[&str] = &["JPXDecode", "CCITTFaxDecode", "JBIG2Decode"];

/// Colour model of raw image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Rgb,
    Gray,
    Cmyk,
}

impl ColorModel {
    fn channels(self) -> usize {
        match self {
            ColorModel::Rgb => 3,
            ColorModel::Gray => 1,
            ColorModel::Cmyk => 4,
        }
    }

    /// Map a PDF colour space name. Unknown spaces are treated as RGB.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("DeviceGray") | Some("G") | Some("CalGray") => ColorModel::Gray,
            Some("DeviceCMYK") | Some("CMYK") => ColorModel::Cmyk,
            _ => ColorModel::Rgb,
        }
    }
}

pub fn decode_pdf_image(doc: &Document, pdf_image: &PdfImage<'_>) -> Result<DynamicImage> {
    let filters: &[String] = pdf_image.filters.as_deref().unwrap_or(&[]);

    if let Some(unsupported) = filters.iter().find(|f| UNSUPPORTED_FILTERS.contains(&f.as_str())) {
        return Err(PdfError::UnsupportedImage(unsupported.clone()));
    }

    if filters.iter().any(|f| f == "DCTDecode") {
        return Ok(image::load_from_memory_with_format(pdf_image.content, ImageFormat::Jpeg)?);
    }

    let stream = doc.get_object(pdf_image.id).and_then(Object::as_stream).ok();
    let bits = stream
        .and_then(|s| s.dict.get(b"BitsPerComponent").and_then(Object::as_i64).ok())
        .unwrap_or(8);
    if bits != 8 {
        return Err(PdfError::UnsupportedImage(format!("{} bits per component", bits)));
    }

    let width = dimension(pdf_image.width)?;
    let height = dimension(pdf_image.height)?;
    let model = ColorModel::from_name(pdf_image.color_space.as_deref());
    let expected = expected_sample_len(width, height, model)?;

    let samples = if filters.is_empty() {
        pdf_image.content.to_vec()
    } else {
        let stream = stream.ok_or_else(|| PdfError::ImageDecodeFailed("image stream not found".to_string()))?;
        let plain_flate = filters.len() == 1 && filters[0] == "FlateDecode" && stream.dict.get(b"DecodeParms").is_err();
        if plain_flate {
            inflate_bounded(&stream.content, expected)?
        } else {
            let decompressed = stream.decompressed_content()?;
            if decompressed.len() > MAX_IMAGE_SAMPLES {
                return Err(PdfError::ImageDecodeFailed(format!(
                    "decoded stream of {} bytes exceeds the {} byte limit",
                    decompressed.len(),
                    MAX_IMAGE_SAMPLES
                )));
            }
            decompressed
        }
    };

    raw_to_image(samples, width, height, model)
}

/// Byte length of `width * height` pixels in `model`, bounded by [`MAX_IMAGE_SAMPLES`].
fn expected_sample_len(width: u32, height: u32, model: ColorModel) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(model.channels()))
        .filter(|len| *len <= MAX_IMAGE_SAMPLES)
        .ok_or_else(|| {
            PdfError::ImageDecodeFailed(format!(
                "{}x{} {:?} image exceeds the {} byte sample limit",
                width, height, model, MAX_IMAGE_SAMPLES
            ))
        })
}

/// Inflate a zlib stream, stopping after `limit` bytes of output.
fn inflate_bounded(compressed: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut samples = Vec::new();
    ZlibDecoder::new(compressed)
        .take(limit as u64)
        .read_to_end(&mut samples)
        .map_err(|e| PdfError::ImageDecodeFailed(format!("inflate failed: {}", e)))?;
    Ok(samples)
}

fn dimension(value: i64) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| PdfError::ImageDecodeFailed(format!("invalid image dimension {}", value)))
}

/// Build an image from 8-bit samples. Extra trailing bytes are ignored.
pub fn raw_to_image(mut samples: Vec<u8>, width: u32, height: u32, model: ColorModel) -> Result<DynamicImage> {
    let expected = expected_sample_len(width, height, model)?;
    if samples.len() < expected {
        return Err(PdfError::ImageDecodeFailed(format!(
            "expected {} bytes of samples, found {}",
            expected,
            samples.len()
        )));
    }
    samples.truncate(expected);

    let image = match model {
        ColorModel::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        ColorModel::Gray => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        ColorModel::Cmyk => RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).map(DynamicImage::ImageRgb8),
    };
    image.ok_or_else(|| PdfError::ImageDecodeFailed("sample buffer does not match dimensions".to_string()))
}

/// Convert CMYK bytes to RGB.
#[allow(clippy::many_single_char_names)]
pub fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for chunk in cmyk.chunks_exact(4) {
        let c = f32::from(chunk[0]) / 255.0;
        let m = f32::from(chunk[1]) / 255.0;
        let y = f32::from(chunk[2]) / 255.0;
        let k = f32::from(chunk[3]) / 255.0;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            rgb.push((255.0 * (1.0 - c) * (1.0 - k)).round() as u8);
            rgb.push((255.0 * (1.0 - m) * (1.0 - k)).round() as u8);
            rgb.push((255.0 * (1.0 - y) * (1.0 - k)).round() as u8);
        }
    }
    rgb
}

/// Encode as baseline RGB JPEG at [`JPEG_QUALITY`].
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| PdfError::ImageEncodeFailed(e.to_string()))?;
    Ok(out)
}
