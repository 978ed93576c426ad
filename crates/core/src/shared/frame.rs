use ndarray::{ArrayView3, ArrayViewMut3};
use serde::{Deserialize, Serialize};

pub const RGB_CHANNELS: usize = 3;

/// Pixel dimensions of a frame or track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * RGB_CHANNELS
    }
}

/// A decoded frame: tightly packed RGB24 bytes in row-major order.
///
/// `index` is the frame's position in its source stream. Compositing derives
/// timestamps from it, so readers must number frames consecutively from 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    size: FrameSize,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        let size = FrameSize::new(width, height);
        debug_assert_eq!(
            data.len(),
            size.byte_len(),
            "data length must equal width * height * 3"
        );
        Self { data, size, index }
    }

    /// A frame filled with a single RGB colour.
    pub fn solid(size: FrameSize, rgb: [u8; 3], index: usize) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(size.byte_len())
            .collect();
        Self { data, size, index }
    }

    pub fn from_rgb_image(image: image::RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    /// Copies the pixels into an `image` buffer for resampling.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.size.width, self.size.height, self.data.clone())
            .expect("Frame data length must match dimensions")
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.size.height as usize,
            self.size.width as usize,
            RGB_CHANNELS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_fills_every_pixel() {
        let frame = Frame::solid(FrameSize::new(3, 2), [10, 20, 30], 4);
        assert_eq!(frame.data().len(), 18);
        assert!(frame.data().chunks(3).all(|px| px == [10, 20, 30]));
        assert_eq!(frame.index(), 4);
    }

    #[test]
    fn test_frame_size_byte_len_and_empty() {
        assert_eq!(FrameSize::new(4, 2).byte_len(), 24);
        assert!(FrameSize::new(0, 10).is_empty());
        assert!(!FrameSize::new(1, 1).is_empty());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_rgb_image_roundtrip_keeps_pixels() {
        let mut frame = Frame::solid(FrameSize::new(2, 2), [0, 0, 0], 7);
        frame.data_mut()[3] = 200;
        let image = frame.to_rgb_image();
        assert_eq!(image.get_pixel(1, 0).0, [200, 0, 0]);

        let back = Frame::from_rgb_image(image, 7);
        assert_eq!(back.data(), frame.data());
        assert_eq!(back.size(), FrameSize::new(2, 2));
    }

    #[test]
    fn test_as_ndarray_is_height_width_channel() {
        let mut frame = Frame::solid(FrameSize::new(4, 2), [0, 0, 0], 0);
        frame.as_ndarray_mut()[[1, 3, 2]] = 99;
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
        assert_eq!(frame.data()[(4 + 3) * 3 + 2], 99);
    }

    #[test]
    fn test_set_index() {
        let mut frame = Frame::solid(FrameSize::new(1, 1), [1, 2, 3], 0);
        frame.set_index(12);
        assert_eq!(frame.index(), 12);
    }
}
