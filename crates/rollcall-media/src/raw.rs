//! Raw BGR24 video frame source.
//!
//! Reads back-to-back packed BGR frames of a fixed size, the layout OpenCV
//! and `ffmpeg -f rawvideo -pix_fmt bgr24` produce, converting each one to
//! RGB on the way in.

use crate::frame::bgr_to_rgb;
use rollcall_core::{Frame, FrameSource, SourceError};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

pub struct RawBgrVideo<R> {
    reader: R,
    width: u32,
    height: u32,
    buf: Vec<u8>,
    position: usize,
}

impl RawBgrVideo<BufReader<File>> {
    /// Open a raw BGR24 file of `width`×`height` frames.
    pub fn open(path: &Path, width: u32, height: u32) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }
        let open_failed = |reason: String| SourceError::OpenFailed {
            path: path.display().to_string(),
            reason,
        };
        let file = File::open(path).map_err(|e| open_failed(e.to_string()))?;
        let len = file.metadata().map_err(|e| open_failed(e.to_string()))?.len();
        if len == 0 {
            return Err(SourceError::Empty(path.display().to_string()));
        }

        let video = Self::new(BufReader::new(file), width, height).map_err(open_failed)?;
        tracing::info!(
            path = %path.display(),
            width,
            height,
            frames = len / video.buf.len() as u64,
            "opened raw BGR video"
        );
        Ok(video)
    }
}

impl<R: Read> RawBgrVideo<R> {
    pub fn new(reader: R, width: u32, height: u32) -> Result<Self, String> {
        let frame_len = width as usize * height as usize * 3;
        if frame_len == 0 {
            return Err(format!("invalid frame size {width}x{height}"));
        }
        Ok(Self {
            reader,
            width,
            height,
            buf: vec![0u8; frame_len],
            position: 0,
        })
    }

    /// Fill the frame buffer; returns the number of bytes read before EOF.
    fn fill(&mut self) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> FrameSource for RawBgrVideo<R> {
    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let position = self.position;
        let read_failed = |reason: String| SourceError::ReadFailed { position, reason };

        let filled = self.fill().map_err(|e| read_failed(e.to_string()))?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < self.buf.len() {
            return Err(read_failed(format!(
                "truncated frame: {filled} of {} bytes",
                self.buf.len()
            )));
        }

        self.position += 1;
        let frame = bgr_to_rgb(&self.buf, self.width, self.height)
            .map_err(|e| read_failed(e.to_string()))?;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frames_are_converted_to_rgb() {
        // Two 2x1 frames: (blue, red) then (green, white), BGR order.
        let bytes = vec![
            255, 0, 0, 0, 0, 255, //
            0, 255, 0, 255, 255, 255,
        ];
        let mut video = RawBgrVideo::new(Cursor::new(bytes), 2, 1).unwrap();

        let first = video.read_frame().unwrap().unwrap();
        assert_eq!(first.pixel(0, 0), Some([0, 0, 255]));
        assert_eq!(first.pixel(1, 0), Some([255, 0, 0]));

        let second = video.read_frame().unwrap().unwrap();
        assert_eq!(second.pixel(0, 0), Some([0, 255, 0]));

        assert!(video.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_truncated_tail_is_read_error() {
        let mut video = RawBgrVideo::new(Cursor::new(vec![0u8; 6 + 4]), 2, 1).unwrap();
        assert!(video.read_frame().unwrap().is_some());
        assert!(matches!(
            video.read_frame(),
            Err(SourceError::ReadFailed { position: 1, .. })
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(RawBgrVideo::new(Cursor::new(Vec::<u8>::new()), 0, 480).is_err());
    }

    #[test]
    fn test_open_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RawBgrVideo::open(&dir.path().join("lecture.bgr"), 4, 4);
        assert!(matches!(missing, Err(SourceError::NotFound(_))));

        let empty = dir.path().join("empty.bgr");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(RawBgrVideo::open(&empty, 4, 4), Err(SourceError::Empty(_))));
    }

    #[test]
    fn test_open_file_reads_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.bgr");
        std::fs::write(&path, vec![7u8; 4 * 4 * 3 * 3]).unwrap();

        let mut video = RawBgrVideo::open(&path, 4, 4).unwrap();
        let mut count = 0;
        while video.read_frame().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
