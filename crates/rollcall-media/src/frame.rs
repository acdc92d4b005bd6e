//! Pixel layout conversions between decoders and the core RGB [`Frame`].

use image::RgbImage;
use rollcall_core::Frame;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid {layout} length: expected {expected}, got {actual}")]
    InvalidLength {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Convert packed BGR (OpenCV-style) pixels to an RGB frame.
pub fn bgr_to_rgb(bgr: &[u8], width: u32, height: u32) -> Result<Frame, FrameError> {
    let expected = (width * height * 3) as usize;
    if bgr.len() < expected {
        return Err(FrameError::InvalidLength {
            layout: "BGR",
            expected,
            actual: bgr.len(),
        });
    }
    let data = bgr[..expected]
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    Ok(Frame { data, width, height })
}

pub fn from_rgb_image(img: RgbImage) -> Frame {
    let (width, height) = img.dimensions();
    Frame {
        data: img.into_raw(),
        width,
        height,
    }
}

/// View a frame as an `image` buffer. `None` if the data length is inconsistent.
pub fn to_rgb_image(frame: &Frame) -> Option<RgbImage> {
    RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
}
