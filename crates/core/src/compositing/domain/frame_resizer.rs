use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::shared::frame::{Frame, FrameSize};
use crate::shared::policy::ResizeMode;

/// Scales frames to the output resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameResizer {
    mode: ResizeMode,
}

impl FrameResizer {
    pub fn new(mode: ResizeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ResizeMode {
        self.mode
    }

    /// Returns a copy of `frame` at `target`, keeping its index.
    pub fn resize(&self, frame: &Frame, target: FrameSize) -> Frame {
        if frame.size() == target || frame.size().is_empty() || target.is_empty() {
            return frame.clone();
        }

        let source = frame.to_rgb_image();
        let output = match self.mode {
            ResizeMode::Stretch => {
                imageops::resize(&source, target.width, target.height, FilterType::Triangle)
            }
            ResizeMode::Fit => letterbox(&source, target),
        };
        Frame::from_rgb_image(output, frame.index())
    }
}

fn letterbox(source: &RgbImage, target: FrameSize) -> RgbImage {
    let scale = f64::min(
        target.width as f64 / source.width() as f64,
        target.height as f64 / source.height() as f64,
    );
    let width = ((source.width() as f64 * scale).round() as u32).clamp(1, target.width);
    let height = ((source.height() as f64 * scale).round() as u32).clamp(1, target.height);

    let scaled = imageops::resize(source, width, height, FilterType::Triangle);
    let mut canvas = RgbImage::new(target.width, target.height);
    let x = (target.width - width) / 2;
    let y = (target.height - height) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}
