//! Raw Pixel Buffer
//!
//! `Image` is the storage unit for both textures and the presented render
//! target: a contiguous byte buffer with width, height, and channel count.
//! The buffer length always equals `width * height * num_channels` (or all
//! three are zero for an empty image).

/// A raw interleaved pixel buffer (8 bits per channel)
#[derive(Clone, Default)]
pub struct Image {
    width: u32,
    height: u32,
    num_channels: u32,
    data: Vec<u8>,
}

impl Image {
    /// Create an image of the given shape, zero-initialized.
    pub fn new(width: u32, height: u32, num_channels: u32) -> Self {
        Self {
            width,
            height,
            num_channels,
            data: vec![0; (width * height * num_channels) as usize],
        }
    }

    /// Create an image from raw interleaved bytes.
    /// Returns `None` when `data.len()` does not match the dimensions.
    pub fn from_data(data: Vec<u8>, width: u32, height: u32, num_channels: u32) -> Option<Self> {
        if data.len() == (width * height * num_channels) as usize {
            Some(Self {
                width,
                height,
                num_channels,
                data,
            })
        } else {
            None
        }
    }

    /// Replace the buffer with a new shape. The old contents are discarded
    /// atomically; there is no implicit resize anywhere else.
    pub fn reinit(&mut self, width: u32, height: u32, num_channels: u32) {
        self.width = width;
        self.height = height;
        self.num_channels = num_channels;
        self.data = vec![0; (width * height * num_channels) as usize];
    }

    /// Set every byte of the buffer to `value` (frame-buffer clears)
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_channels(&self) -> u32 {
        self.num_channels
    }

    /// Raw bytes, row-major, channels interleaved
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to raw bytes for direct pixel writes
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of pixel (x, y). Caller guarantees in-range coordinates.
    #[inline]
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * self.num_channels) as usize
    }

    /// Read one pixel's channels (bounds checked). Returns None out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x < self.width && y < self.height {
            let idx = self.pixel_index(x, y);
            Some(&self.data[idx..idx + self.num_channels as usize])
        } else {
            None
        }
    }

    /// Write one pixel's channels (bounds checked, silently ignores
    /// out-of-range coordinates). `channels.len()` must equal the image's
    /// channel count.
    pub fn set_pixel(&mut self, x: u32, y: u32, channels: &[u8]) {
        debug_assert_eq!(channels.len(), self.num_channels as usize);
        if x < self.width && y < self.height {
            let idx = self.pixel_index(x, y);
            self.data[idx..idx + channels.len()].copy_from_slice(channels);
        }
    }
}
