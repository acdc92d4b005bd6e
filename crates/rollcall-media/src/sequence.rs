//! Directory-of-images frame source.
//!
//! Stands in for a decoded video: each image file in the directory is one
//! frame, played back in lexical filename order (e.g. the output of
//! `ffmpeg -i lecture.mp4 frames/%06d.png`).

use crate::frame::from_rgb_image;
use rollcall_core::{Frame, FrameSource, SourceError};
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub struct ImageSequence {
    frames: Vec<PathBuf>,
    position: usize,
}

impl ImageSequence {
    /// Open a frame directory. Fails if it is missing, unreadable or has no frames.
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        if !dir.is_dir() {
            return Err(SourceError::NotFound(dir.display().to_string()));
        }

        let entries = std::fs::read_dir(dir).map_err(|e| SourceError::OpenFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(SourceError::Empty(dir.display().to_string()));
        }

        tracing::info!(dir = %dir.display(), frames = frames.len(), "opened frame sequence");
        Ok(Self {
            frames,
            position: 0,
        })
    }

    /// Total number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            FRAME_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequence {
    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.frames.get(self.position) else {
            return Ok(None);
        };
        let position = self.position;
        self.position += 1;

        let img = image::open(path).map_err(|e| SourceError::ReadFailed {
            position,
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(Some(from_rgb_image(img.to_rgb8())))
    }
}
