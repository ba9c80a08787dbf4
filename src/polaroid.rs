//! Turning uploaded images into polaroid textures.
//!
//! Every upload is drawn onto the same fixed card: a white 500×600 canvas
//! with a 25px border and a 100px caption strip at the bottom. The photo is
//! cover-fitted into the window (scaled to fill, centered, overflow cropped),
//! encoded as JPEG and carried around as a `data:` URI.
//!
//! ```ignore
//! let bytes = std::fs::read("family.jpg")?;
//! let uri = tinsel::polaroid::process_upload(&bytes)?;
//! assert!(uri.starts_with("data:image/jpeg;base64,"));
//! ```

use crate::error::PolaroidError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, Rgb, RgbImage, RgbaImage};
use std::path::Path;

/// Prefix of the data URIs produced by [`process_upload`].
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Card geometry and encoding settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolaroidLayout {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Border on the left, right and top.
    pub padding: u32,
    /// Caption strip at the bottom (replaces the bottom border).
    pub caption: u32,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl PolaroidLayout {
    /// Photo window as `(x, y, width, height)`. Empty when the border and
    /// caption leave no room.
    pub fn window(&self) -> (u32, u32, u32, u32) {
        (
            self.padding,
            self.padding,
            self.width.saturating_sub(2 * self.padding),
            self.height
                .saturating_sub(self.padding)
                .saturating_sub(self.caption),
        )
    }
}

impl Default for PolaroidLayout {
    fn default() -> Self {
        Self {
            width: 500,
            height: 600,
            padding: 25,
            caption: 100,
            quality: 90,
        }
    }
}

/// Centered region of a `src_w × src_h` source with the window's aspect
/// ratio, as `(x, y, width, height)`. Scaled to the window it covers it
/// exactly; the rest of the source is never rasterized.
pub fn cover_crop(src_w: u32, src_h: u32, window_w: u32, window_h: u32) -> (u32, u32, u32, u32) {
    let src_ratio = src_w as f64 / src_h as f64;
    let window_ratio = window_w as f64 / window_h as f64;

    let (w, h) = if src_ratio > window_ratio {
        let w = (src_h as f64 * window_ratio).round().clamp(1.0, src_w as f64) as u32;
        (w, src_h)
    } else {
        let h = (src_w as f64 / window_ratio).round().clamp(1.0, src_h as f64) as u32;
        (src_w, h)
    };
    ((src_w - w) / 2, (src_h - h) / 2, w, h)
}

/// Draw `source` onto a polaroid card.
pub fn compose(source: &DynamicImage, layout: &PolaroidLayout) -> Result<RgbImage, PolaroidError> {
    if source.width() == 0 || source.height() == 0 {
        return Err(PolaroidError::EmptyImage);
    }

    let mut card = RgbImage::from_pixel(layout.width, layout.height, Rgb([255, 255, 255]));
    let (win_x, win_y, win_w, win_h) = layout.window();
    if win_w == 0 || win_h == 0 {
        return Ok(card);
    }

    let (crop_x, crop_y, crop_w, crop_h) = cover_crop(source.width(), source.height(), win_w, win_h);
    let photo = imageops::resize(
        &source.crop_imm(crop_x, crop_y, crop_w, crop_h).to_rgb8(),
        win_w,
        win_h,
        imageops::FilterType::Triangle,
    );
    imageops::replace(&mut card, &photo, win_x as i64, win_y as i64);
    Ok(card)
}

/// Encode an RGB image as JPEG.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PolaroidError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(image)
        .map_err(PolaroidError::Encode)?;
    Ok(bytes)
}

/// Wrap encoded JPEG bytes in a data URI.
pub fn jpeg_data_uri(bytes: &[u8]) -> String {
    format!("{JPEG_DATA_URI_PREFIX}{}", BASE64_STANDARD.encode(bytes))
}

/// Extract the raw bytes from a base64 `data:` URI of any media type.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, PolaroidError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PolaroidError::InvalidDataUri("missing `data:` scheme".into()))?;
    let (_, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| PolaroidError::InvalidDataUri("not base64 encoded".into()))?;
    Ok(BASE64_STANDARD.decode(payload)?)
}

/// Decode a data URI back into pixels, ready for texture upload.
pub fn load_data_uri(uri: &str) -> Result<RgbaImage, PolaroidError> {
    let bytes = decode_data_uri(uri)?;
    let image = image::load_from_memory(&bytes).map_err(PolaroidError::Decode)?;
    Ok(image.into_rgba8())
}

/// A finished polaroid: the encoded card plus its pixels for texture upload.
#[derive(Clone, Debug)]
pub struct Polaroid {
    /// `data:image/jpeg;base64,…` URI of the encoded card.
    pub data_uri: String,
    pub pixels: RgbaImage,
}

/// Decode, compose and encode, keeping the composed pixels.
pub fn render_polaroid(bytes: &[u8], layout: &PolaroidLayout) -> Result<Polaroid, PolaroidError> {
    let source = image::load_from_memory(bytes).map_err(PolaroidError::Decode)?;
    let card = compose(&source, layout)?;
    let jpeg = encode_jpeg(&card, layout.quality)?;
    Ok(Polaroid {
        data_uri: jpeg_data_uri(&jpeg),
        pixels: DynamicImage::ImageRgb8(card).into_rgba8(),
    })
}

/// Full upload pipeline with a custom layout: decode, compose, encode.
pub fn process_upload_with(bytes: &[u8], layout: &PolaroidLayout) -> Result<String, PolaroidError> {
    render_polaroid(bytes, layout).map(|polaroid| polaroid.data_uri)
}

/// Full upload pipeline with the default layout.
pub fn process_upload(bytes: &[u8]) -> Result<String, PolaroidError> {
    process_upload_with(bytes, &PolaroidLayout::default())
}

/// Read an image file and run it through [`process_upload`].
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<String, PolaroidError> {
    let bytes = std::fs::read(path.as_ref())?;
    process_upload(&bytes)
}
