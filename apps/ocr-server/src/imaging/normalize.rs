//! Bounded decoding and downscaling of page images

use std::io::Cursor;
use std::str::FromStr;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Limits};

/// Color representation handed to the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Single-channel intensity. Faster and lighter, loses color cues.
    #[default]
    Grayscale,
    /// Three-channel color
    Rgb,
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" | "l" => Ok(Self::Grayscale),
            "rgb" | "color" | "colour" => Ok(Self::Rgb),
            other => Err(format!("unknown color mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Neither side may exceed this after normalization; `None` keeps the size
    pub max_dimension: Option<u32>,
    pub color_mode: ColorMode,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: Some(1500),
            color_mode: ColorMode::Grayscale,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Image exceeds the {max}px decode limit")]
    TooLarge { max: u32 },

    #[error("Cannot decode image: {0}")]
    Decode(String),
}

/// Decode an encoded image, refusing anything wider or taller than `max_side`
///
/// The format is guessed from the content, not from any declared name.
pub fn decode(data: &[u8], max_side: u32) -> Result<DynamicImage, ImagingError> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_side);
    limits.max_image_height = Some(max_side);
    reader.limits(limits);

    reader.decode().map_err(|e| match e {
        image::ImageError::Limits(_) => ImagingError::TooLarge { max: max_side },
        other => ImagingError::Decode(other.to_string()),
    })
}

/// Shrink oversized images and reduce them to the configured color mode
pub fn normalize(image: DynamicImage, options: &NormalizeOptions) -> DynamicImage {
    let image = match options.max_dimension {
        Some(max) if image.width() > max || image.height() > max => {
            // resize() keeps the aspect ratio and fits inside max x max
            image.resize(max, max, FilterType::Lanczos3)
        }
        _ => image,
    };

    match options.color_mode {
        ColorMode::Grayscale => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorMode::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}
