//! Nearest-neighbour classification of face feature vectors.

use crate::encoder::{EncoderError, FaceEncoder};
use crate::gallery::Gallery;
use crate::source::Frame;
use crate::types::{Embedding, FaceMatch, MatchResult};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Encoder(#[from] EncoderError),
    #[error("encoder produced {actual}-dim vectors but the gallery holds {expected}-dim vectors")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Strategy for comparing a candidate embedding against the gallery.
pub trait Matcher {
    fn compare(&self, candidate: &Embedding, gallery: &Gallery, threshold: f32) -> MatchResult;
}

/// Euclidean nearest-neighbour matcher.
///
/// A candidate is known only when its nearest distance is strictly below the
/// threshold. Equidistant entries resolve to the first one in gallery order.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn compare(&self, candidate: &Embedding, gallery: &Gallery, threshold: f32) -> MatchResult {
        let mut best_dist = f32::INFINITY;
        let mut best_idx: Option<usize> = None;

        for (i, entry) in gallery.entries().iter().enumerate() {
            let dist = candidate.euclidean_distance(&entry.embedding);
            if dist < best_dist {
                best_dist = dist;
                best_idx = Some(i);
            }
        }

        match best_idx {
            Some(idx) if best_dist < threshold => {
                MatchResult::known(gallery.entries()[idx].name.clone(), best_dist)
            }
            _ => MatchResult::unknown(best_dist),
        }
    }
}

/// Runs the encoder on a frame and classifies every face it finds.
pub struct FaceMatcher<E> {
    encoder: E,
    gallery: Gallery,
    threshold: f32,
}

impl<E: FaceEncoder> FaceMatcher<E> {
    pub fn new(encoder: E, gallery: Gallery, threshold: f32) -> Self {
        Self {
            encoder,
            gallery,
            threshold,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Detect, embed and classify every face in the frame.
    pub fn match_frame(&mut self, frame: &Frame) -> Result<Vec<FaceMatch>, MatchError> {
        let faces = self.encoder.encode(frame)?;
        let mut matches = Vec::with_capacity(faces.len());

        for face in faces {
            if face.embedding.len() != self.gallery.dimension() {
                return Err(MatchError::DimensionMismatch {
                    expected: self.gallery.dimension(),
                    actual: face.embedding.len(),
                });
            }
            let result = EuclideanMatcher.compare(&face.embedding, &self.gallery, self.threshold);
            tracing::debug!(
                identity = %result.identity,
                distance = result.distance,
                "face classified"
            );
            matches.push(FaceMatch {
                bbox: face.bbox,
                result,
            });
        }

        Ok(matches)
    }
}
