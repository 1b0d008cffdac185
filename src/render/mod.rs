//! # Rendering Module
//!
//! Turns decoded images into packed 1-bit bitmaps for the print head.
//!
//! ## Modules
//!
//! - [`dither`]: Floyd-Steinberg error diffusion and bit packing

pub mod dither;

pub use dither::Bitmap;
