//! Display / Frame Composition
//!
//! `Display` owns the presented color `Image` (RGBA, 8 bits per channel)
//! and the floating-point `RenderTarget` the rasterizer draws into. It
//! clears the target between frames and materializes the shaded frame into
//! bytes. The presentation layer consumes the image through the narrow
//! `data()` / `width()` / `height()` / `num_channels()` surface; nothing
//! here opens a window.

use std::thread;

use log::trace;

use crate::config::PipelineConfig;
use crate::image::Image;
use crate::rasterizer::RenderTarget;

/// Owns the final color image and its floating-point working buffer.
/// Invariant: both always have the same pixel count.
pub struct Display {
    image: Image,
    target: RenderTarget,
    clear_color: [f32; 4],
}

impl Display {
    /// Display with a depth-tested target of the given size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            image: Image::new(width, height, 4),
            target: RenderTarget::new(width, height, true),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Display configured from a `PipelineConfig`
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut display = Self {
            image: Image::new(config.width, config.height, 4),
            target: RenderTarget::new(config.width, config.height, config.depth_enabled),
            clear_color: config.clear_color,
        };
        if let Some(viewport) = config.viewport {
            display.target.set_viewport(viewport);
        }
        display
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn num_channels(&self) -> u32 {
        self.image.num_channels()
    }

    /// Raw bytes of the presented image (the presentation handoff surface)
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.image.data()
    }

    #[inline]
    pub fn image(&self) -> &Image {
        &self.image
    }

    #[inline]
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    #[inline]
    pub fn target_mut(&mut self) -> &mut RenderTarget {
        &mut self.target
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    /// Replace image and target with a new size. Both buffers are resized
    /// together so their pixel counts never diverge.
    pub fn resize(&mut self, width: u32, height: u32) {
        let with_depth = self.target.has_depth();
        self.image.reinit(width, height, 4);
        self.target = RenderTarget::new(width, height, with_depth);
    }

    /// Reset the working buffer for a new frame: color to the configured
    /// clear color, depth (when present) to far
    pub fn clear_render_target(&mut self) {
        self.target.clear(self.clear_color);
    }

    /// Convert the floating-point frame into the owned image: every
    /// 4-component pixel in [0, 1] becomes 4 bytes by truncating
    /// multiplication. Each output pixel depends only on its own input, so
    /// the rows are fanned out across worker threads with nothing to
    /// synchronize but the final join.
    pub fn update_color_buffer(&mut self) {
        let width = self.image.width() as usize;
        let height = self.image.height() as usize;
        if width == 0 || height == 0 {
            return;
        }

        let workers = thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
            .min(height);
        let band_rows = height.div_ceil(workers);

        let frame = self.target.color();
        let bytes = self.image.data_mut();

        trace!(
            "color conversion: {}x{} pixels across {} workers",
            width,
            height,
            workers
        );

        thread::scope(|scope| {
            let band_pixels = band_rows * width;
            for (band_out, band_in) in bytes
                .chunks_mut(band_pixels * 4)
                .zip(frame.chunks(band_pixels))
            {
                scope.spawn(move || convert_band(band_in, band_out));
            }
        });
    }
}

/// Truncating [0,1] -> [0,255] conversion for one disjoint band of pixels
fn convert_band(pixels: &[[f32; 4]], bytes: &mut [u8]) {
    for (pixel, out) in pixels.iter().zip(bytes.chunks_exact_mut(4)) {
        out[0] = (pixel[0] * 255.0) as u8;
        out[1] = (pixel[1] * 255.0) as u8;
        out[2] = (pixel[2] * 255.0) as u8;
        out[3] = (pixel[3] * 255.0) as u8;
    }
}
