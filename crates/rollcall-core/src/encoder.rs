//! Face detection + feature extraction capability.
//!
//! The core never looks at pixels itself; it asks a [`FaceEncoder`] for the
//! faces in a frame and their feature vectors.

use crate::source::Frame;
use crate::types::DetectedFace;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("face detection failed: {0}")]
    Detection(#[source] BoxError),
    #[error("feature extraction failed: {0}")]
    Extraction(#[source] BoxError),
}

/// Detects faces in an RGB frame and produces one feature vector per face.
pub trait FaceEncoder {
    /// Length of the vectors this encoder produces, when fixed and known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }

    fn encode(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, EncoderError>;
}

impl<E: FaceEncoder + ?Sized> FaceEncoder for Box<E> {
    fn dimension(&self) -> Option<usize> {
        (**self).dimension()
    }

    fn encode(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, EncoderError> {
        (**self).encode(frame)
    }
}
