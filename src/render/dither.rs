//! # Floyd-Steinberg Dithering
//!
//! This module converts decoded images into the 1-bit bitmaps the printer
//! takes.
//!
//! ## What is Dithering?
//!
//! The print head can only burn a dot or leave it blank. Dithering
//! simulates gray by varying the density of black dots:
//!
//! ```text
//! Grayscale:    White    Light    Medium    Dark    Black
//!               ░░░░░░   ░░▒░░░   ░▒░▒░▒   ▒▓▒▓▒▓   ██████
//! ```
//!
//! ## Error Diffusion
//!
//! Each pixel is thresholded at mid-gray and the rounding error is pushed
//! onto neighbours that have not been visited yet:
//!
//! ```text
//!              ┌───────┬───────┐
//!              │   *   │ 7/16  │
//!      ┌───────┼───────┼───────┤
//!      │ 3/16  │ 5/16  │ 1/16  │
//!      └───────┴───────┴───────┘
//! ```
//!
//! Photos keep far more tonal detail this way than with a plain threshold,
//! which matters on a 384-dot head.
//!
//! ## Conversion Steps
//!
//! 1. Flatten alpha onto white paper
//! 2. Convert to 8-bit luminance
//! 3. Crop to the 384-dot head width (no scaling)
//! 4. Dither
//! 5. Pack MSB-first, 1 = black
//!
//! ## Usage Example
//!
//! ```
//! use image::{DynamicImage, GrayImage, Luma};
//! use thermald::render::dither::Bitmap;
//!
//! let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 2, Luma([0])));
//! let bitmap = Bitmap::from_image(&img)?;
//! assert_eq!(bitmap.data, vec![0xFF; 4]);
//! # Ok::<(), thermald::ThermalError>(())
//! ```

use image::DynamicImage;

use crate::error::{Result, ThermalError};
use crate::protocol::graphics::MAX_WIDTH_DOTS;

/// Luminance at or above this prints white.
const WHITE_THRESHOLD: f32 = 128.0;

/// A packed 1-bit bitmap ready for `print_bitmap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u16,
    pub height: u16,
    /// `ceil(width / 8) × height` bytes, row-major, MSB = leftmost dot
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Dither a decoded image, cropping it to the head width.
    ///
    /// ## Errors
    ///
    /// `ThermalError::Image` if the image is taller than 65535 rows.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let width = image.width().min(u32::from(MAX_WIDTH_DOTS));
        let height = u16::try_from(image.height()).map_err(|_| {
            ThermalError::Image(format!("image is {} rows tall, max is 65535", image.height()))
        })?;

        let rgba = image.to_luma_alpha8();
        let mut luma = Vec::with_capacity(width as usize * height as usize);
        for y in 0..u32::from(height) {
            for x in 0..width {
                let [l, a] = rgba.get_pixel(x, y).0;
                luma.push(flatten_on_white(l, a));
            }
        }

        Ok(Self::from_luma(width as u16, height, &luma))
    }

    /// Dither a row-major 8-bit luminance buffer of `width × height` pixels.
    pub fn from_luma(width: u16, height: u16, luma: &[u8]) -> Self {
        let dots = floyd_steinberg(width as usize, height as usize, luma);
        let data = dots
            .chunks(width.max(1) as usize)
            .take(height as usize)
            .flat_map(pack_row)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Bytes per row: `ceil(width / 8)`.
    pub fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }
}

/// Composite a luminance/alpha pair over white paper.
#[inline]
fn flatten_on_white(luma: u8, alpha: u8) -> u8 {
    let (l, a) = (u32::from(luma), u32::from(alpha));
    ((l * a + 255 * (255 - a)) / 255) as u8
}

/// Floyd-Steinberg error diffusion.
///
/// Returns one `bool` per pixel, `true` = black. Missing input pixels read
/// as white.
pub fn floyd_steinberg(width: usize, height: usize, luma: &[u8]) -> Vec<bool> {
    let mut buf: Vec<f32> = (0..width * height)
        .map(|i| luma.get(i).copied().unwrap_or(255) as f32)
        .collect();
    let mut out = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let old = buf[i];
            let black = old < WHITE_THRESHOLD;
            out[i] = black;
            let err = old - if black { 0.0 } else { 255.0 };

            if x + 1 < width {
                buf[i + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < height {
                let below = i + width;
                if x > 0 {
                    buf[below - 1] += err * 3.0 / 16.0;
                }
                buf[below] += err * 5.0 / 16.0;
                if x + 1 < width {
                    buf[below + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }

    out
}

/// Pack a row of boolean pixel values into bytes.
///
/// - Bit 7 (MSB) = leftmost pixel
/// - 1 = black (print dot), 0 = white
///
/// The last byte is padded with white on the right.
///
/// ```
/// use thermald::render::dither::pack_row;
///
/// let row = vec![true, true, false, false, true, false, true, false];
/// assert_eq!(pack_row(&row), vec![0b11001010]);
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}
