//! Still-image capture from video frames

use super::{CaptureError, EncodedImage, StillCapture};
use crate::detector::VideoFrame;
use image::{imageops, DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encodes frames as PNG, optionally mirrored
///
/// The live preview is shown mirrored, so the saved selfie is flipped to
/// match what the user saw.
#[derive(Debug, Clone, Copy)]
pub struct MirroredPngCapture {
    mirror: bool,
}

impl MirroredPngCapture {
    pub fn new(mirror: bool) -> Self {
        Self { mirror }
    }
}

impl Default for MirroredPngCapture {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StillCapture for MirroredPngCapture {
    fn grab_still_image(&self, frame: &VideoFrame) -> Result<EncodedImage, CaptureError> {
        let pixels = frame.image.as_ref().ok_or(CaptureError::VideoNotReady)?;
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CaptureError::VideoNotReady);
        }

        let oriented = if self.mirror {
            imageops::flip_horizontal(&**pixels)
        } else {
            (**pixels).clone()
        };

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(oriented).write_to(&mut buffer, ImageFormat::Png)?;

        tracing::debug!(
            "Grabbed frame {} ({}x{}, {} bytes)",
            frame.index,
            pixels.width(),
            pixels.height(),
            buffer.get_ref().len()
        );

        Ok(EncodedImage::new("image/png", buffer.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::Timestamp;
    use image::{Rgba, RgbaImage};
    use std::sync::Arc;

    fn two_pixel_frame() -> VideoFrame {
        let mut pixels = RgbaImage::new(2, 1);
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        pixels.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        VideoFrame::new(7, Timestamp::ZERO).with_image(Arc::new(pixels))
    }

    #[test]
    fn test_frame_without_pixels_is_not_ready() {
        let frame = VideoFrame::new(0, Timestamp::ZERO);
        let result = MirroredPngCapture::default().grab_still_image(&frame);
        assert!(matches!(result, Err(CaptureError::VideoNotReady)));
    }

    #[test]
    fn test_mirrored_capture_flips_horizontally() {
        let image = MirroredPngCapture::new(true)
            .grab_still_image(&two_pixel_frame())
            .unwrap();
        assert_eq!(image.mime_type, "image/png");

        let decoded = image::load_from_memory(&image.data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(decoded.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_unmirrored_capture_keeps_orientation() {
        let image = MirroredPngCapture::new(false)
            .grab_still_image(&two_pixel_frame())
            .unwrap();

        let decoded = image::load_from_memory(&image.data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }
}
