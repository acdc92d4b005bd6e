//! rollcall-vision — ONNX-backed face encoder.
//!
//! Uses SCRFD for face detection and ArcFace for feature extraction, both
//! running on CPU via ONNX Runtime.

pub mod alignment;
pub mod detector;
pub mod recognizer;

pub use detector::{DetectorError, FaceDetector};
pub use recognizer::{FaceRecognizer, RecognizerError, EMBEDDING_DIM};

use rollcall_core::{DetectedFace, EncoderError, FaceEncoder, Frame};
use std::path::Path;
use thiserror::Error;

pub const DETECTOR_MODEL: &str = "det_10g.onnx";
pub const RECOGNIZER_MODEL: &str = "w600k_r50.onnx";

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// Detector + recognizer pair implementing the core [`FaceEncoder`].
pub struct OnnxFaceEncoder {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxFaceEncoder {
    /// Load both models from `model_dir`. Fails fast if either is missing.
    pub fn load(model_dir: &Path) -> Result<Self, VisionError> {
        let detector = FaceDetector::load(&model_dir.join(DETECTOR_MODEL))?;
        let recognizer = FaceRecognizer::load(&model_dir.join(RECOGNIZER_MODEL))?;
        Ok(Self {
            detector,
            recognizer,
        })
    }
}

impl FaceEncoder for OnnxFaceEncoder {
    fn dimension(&self) -> Option<usize> {
        Some(EMBEDDING_DIM)
    }

    fn encode(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, EncoderError> {
        let boxes = self
            .detector
            .detect(frame)
            .map_err(|e| EncoderError::Detection(e.to_string().into()))?;

        let mut faces = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            if bbox.landmarks.is_none() {
                tracing::debug!(confidence = bbox.confidence, "face without landmarks skipped");
                continue;
            }
            let embedding = self
                .recognizer
                .extract(frame, &bbox)
                .map_err(|e| EncoderError::Extraction(e.to_string().into()))?;
            faces.push(DetectedFace { bbox, embedding });
        }
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_fail_fast() {
        let dir = std::env::temp_dir().join("rollcall-vision-no-models");
        let err = OnnxFaceEncoder::load(&dir).err().expect("load should fail");
        assert!(matches!(
            err,
            VisionError::Detector(DetectorError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_arcface_dimension() {
        assert_eq!(EMBEDDING_DIM, 512);
    }
}
