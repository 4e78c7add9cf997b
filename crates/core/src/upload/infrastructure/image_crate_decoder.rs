/// Decodes JPEG, PNG and WebP uploads with the pure-Rust `image` crate.
///
/// The format is taken from the declared content type, never sniffed from
/// the bytes. EXIF orientation is applied so detectors see upright faces.
use std::io::Cursor;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder as _, ImageFormat, ImageReader, Limits};
use zeroize::Zeroize;

use crate::shared::constants::MAX_IMAGE_DIMENSION;
use crate::shared::pixel_array::PixelArray;
use crate::upload::domain::content_type::ImageContentType;
use crate::upload::domain::image_decoder::{DecodeError, ImageDecoder};
use crate::upload::domain::raw_upload::RawUpload;

pub struct ImageCrateDecoder {
    max_dimension: u32,
}

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self {
            max_dimension: MAX_IMAGE_DIMENSION,
        }
    }

    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl Default for ImageCrateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(
        &self,
        upload: &RawUpload,
        content_type: ImageContentType,
    ) -> Result<PixelArray, DecodeError> {
        let image = read_image(upload.bytes(), image_format(content_type), self.max_dimension)
            .map_err(|e| {
                log::debug!("{} decode failed: {}", content_type.as_str(), error_class(&e));
                DecodeError::CorruptedImage
            })?;

        let pixels = into_rgb_pixels(image);
        if pixels.is_empty() {
            return Err(DecodeError::CorruptedImage);
        }
        Ok(pixels)
    }
}

fn image_format(content_type: ImageContentType) -> ImageFormat {
    match content_type {
        ImageContentType::Jpeg => ImageFormat::Jpeg,
        ImageContentType::Png => ImageFormat::Png,
        ImageContentType::Webp => ImageFormat::WebP,
    }
}

fn read_image(
    bytes: &[u8],
    format: ImageFormat,
    max_dimension: u32,
) -> image::ImageResult<DynamicImage> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(limits);

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let image = DynamicImage::from_decoder(decoder)?;
    Ok(reorient(image, orientation))
}

/// Apply an EXIF orientation. Flips and half turns happen in place; quarter
/// turns need a new buffer, and the unrotated one is zeroed before release.
fn reorient(mut image: DynamicImage, orientation: Orientation) -> DynamicImage {
    let (mut rotated, mirror) = match orientation {
        Orientation::NoTransforms => return image,
        Orientation::FlipHorizontal => {
            image.apply_orientation(Orientation::FlipHorizontal);
            return image;
        }
        Orientation::FlipVertical => {
            image.apply_orientation(Orientation::FlipVertical);
            return image;
        }
        Orientation::Rotate180 => {
            image.apply_orientation(Orientation::Rotate180);
            return image;
        }
        Orientation::Rotate90 => (image.rotate90(), false),
        Orientation::Rotate270 => (image.rotate270(), false),
        Orientation::Rotate90FlipH => (image.rotate90(), true),
        Orientation::Rotate270FlipH => (image.rotate270(), true),
    };
    image.into_bytes().zeroize();
    if mirror {
        rotated.apply_orientation(Orientation::FlipHorizontal);
    }
    rotated
}

/// Convert to 8-bit RGB, zeroing the source buffer when a conversion copy
/// was needed.
fn into_rgb_pixels(image: DynamicImage) -> PixelArray {
    let rgb = match image {
        DynamicImage::ImageRgb8(buffer) => buffer,
        other => {
            let converted = other.to_rgb8();
            other.into_bytes().zeroize();
            converted
        }
    };
    let (width, height) = rgb.dimensions();
    PixelArray::new(rgb.into_raw(), width, height, 3)
}

/// Coarse failure class for debug logs; the decoder's own message may
/// quote header fields of the upload.
fn error_class(e: &image::ImageError) -> &'static str {
    match e {
        image::ImageError::Decoding(_) => "malformed stream",
        image::ImageError::Limits(_) => "limits exceeded",
        image::ImageError::Unsupported(_) => "unsupported sub-format",
        image::ImageError::IoError(_) => "truncated stream",
        _ => "other",
    }
}
