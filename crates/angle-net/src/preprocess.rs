//! Image to tensor preprocessing

use crate::config::ClassifierConfig;
use crate::resize::{self, ResizeMode};
use crate::AngleError;
use image::{DynamicImage, ImageBuffer, Pixel};
use ndarray::Array4;

/// Turns a text line crop into a normalized `[1, C, H, W]` tensor
#[derive(Debug, Clone)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    mean: Vec<f32>,
    norm: Vec<f32>,
    resize_mode: ResizeMode,
}

impl Preprocessor {
    pub fn new(
        width: u32,
        height: u32,
        mean: Vec<f32>,
        norm: Vec<f32>,
        resize_mode: ResizeMode,
    ) -> Self {
        Self {
            width,
            height,
            mean,
            norm,
            resize_mode,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            config.target_width,
            config.target_height,
            config.mean_values.clone(),
            config.norm_values.clone(),
            config.resize_mode,
        )
    }

    /// Preprocess a decoded image of any supported sample depth
    ///
    /// Samples keep their native range: 8-bit data stays in 0..=255, 16-bit in
    /// 0..=65535, float data as stored.
    pub fn run(&self, image: &DynamicImage) -> Result<Array4<f32>, AngleError> {
        match image {
            DynamicImage::ImageLuma8(buf) => self.run_buffer(buf),
            DynamicImage::ImageLumaA8(buf) => self.run_buffer(buf),
            DynamicImage::ImageRgb8(buf) => self.run_buffer(buf),
            DynamicImage::ImageRgba8(buf) => self.run_buffer(buf),
            DynamicImage::ImageLuma16(buf) => self.run_buffer(buf),
            DynamicImage::ImageLumaA16(buf) => self.run_buffer(buf),
            DynamicImage::ImageRgb16(buf) => self.run_buffer(buf),
            DynamicImage::ImageRgba16(buf) => self.run_buffer(buf),
            DynamicImage::ImageRgb32F(buf) => self.run_buffer(buf),
            DynamicImage::ImageRgba32F(buf) => self.run_buffer(buf),
            other => self.run_buffer(&other.to_rgb8()),
        }
    }

    /// Preprocess a typed pixel buffer
    pub fn run_buffer<P>(
        &self,
        image: &ImageBuffer<P, Vec<P::Subpixel>>,
    ) -> Result<Array4<f32>, AngleError>
    where
        P: Pixel + 'static,
        P::Subpixel: Into<f32> + 'static,
    {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AngleError::EmptyImage { width, height });
        }

        let channels = P::CHANNEL_COUNT as usize;
        if channels != self.mean.len() || channels != self.norm.len() {
            return Err(AngleError::ChannelMismatch {
                expected: self.mean.len(),
                actual: channels,
            });
        }

        let fitted = resize::fit(image, self.width, self.height, self.resize_mode);
        Ok(self.normalize(&fitted))
    }

    fn normalize<P>(&self, image: &ImageBuffer<P, Vec<P::Subpixel>>) -> Array4<f32>
    where
        P: Pixel,
        P::Subpixel: Into<f32>,
    {
        let channels = P::CHANNEL_COUNT as usize;
        let mut tensor =
            Array4::<f32>::zeros((1, channels, self.height as usize, self.width as usize));

        for (x, y, pixel) in image.enumerate_pixels() {
            for (c, &sample) in pixel.channels().iter().enumerate() {
                let value: f32 = sample.into();
                tensor[[0, c, y as usize, x as usize]] = (value - self.mean[c]) * self.norm[c];
            }
        }

        tensor
    }
}
