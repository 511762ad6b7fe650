//! Fitting text line crops to the model input size

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Primitive};
use serde::{Deserialize, Serialize};

/// Interpolation used for every resize
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// How a crop is mapped onto the target size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale to the target height keeping aspect ratio, pad right with white,
    /// crop anything wider than the target
    #[default]
    Letterbox,
    /// Resize straight to the target size
    Stretch,
}

/// Resize `image` to exactly `width` x `height`
///
/// The caller guarantees a non-empty source image.
pub fn fit<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    mode: ResizeMode,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    match mode {
        ResizeMode::Stretch => imageops::resize(image, width, height, RESIZE_FILTER),
        ResizeMode::Letterbox => letterbox(image, width, height),
    }
}

fn letterbox<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (src_width, src_height) = image.dimensions();
    let scale = height as f32 / src_height as f32;
    let fit_width = ((src_width as f32 * scale) as u32).max(1);

    let scaled = imageops::resize(image, fit_width, height, RESIZE_FILTER);

    let white = vec![<P::Subpixel as Primitive>::DEFAULT_MAX_VALUE; P::CHANNEL_COUNT as usize];
    let mut canvas = ImageBuffer::from_pixel(width, height, *P::from_slice(&white));
    // Anything past the canvas edge is clipped
    imageops::replace(&mut canvas, &scaled, 0, 0);
    canvas
}
