//! Frame type and the video source abstraction.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("video source not found: {0}")]
    NotFound(String),
    #[error("video source has no frames: {0}")]
    Empty(String),
    #[error("failed to open video source {path}: {reason}")]
    OpenFailed { path: String, reason: String },
    #[error("failed to read frame {position}: {reason}")]
    ReadFailed { position: usize, reason: String },
}

/// A decoded RGB8 frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Packed RGB pixel data (width * height * 3 bytes, row-major).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// All-black frame of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width * height * 3) as usize],
            width,
            height,
        }
    }

    /// RGB triple at (x, y), or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.data.get(idx..idx + 3).map(|p| [p[0], p[1], p[2]])
    }
}

/// A pull-based, finite sequence of frames.
///
/// `Ok(None)` marks the normal end of the stream. Errors while reading are
/// reported to the caller, which decides how to treat them.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).read_frame()
    }
}
