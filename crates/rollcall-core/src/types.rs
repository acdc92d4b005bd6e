use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for faces that match no gallery entry.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Bounding box for a detected face, in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    /// Build a box from (top, right, bottom, left) edges.
    pub fn from_edges(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            confidence: 1.0,
            landmarks: None,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }
}

/// Face feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compute Euclidean distance between two embeddings.
    ///
    /// Both vectors must have the same dimension; extra trailing values
    /// on the longer one are ignored.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

/// A known identity in the reference gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub name: String,
    pub embedding: Embedding,
}

/// A face found in a single frame. Never persisted.
#[derive(Debug, Clone)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub embedding: Embedding,
}

/// Classification of a single detected face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    Known(String),
    Unknown,
}

impl Identity {
    pub fn is_known(&self) -> bool {
        matches!(self, Identity::Known(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Identity::Known(name) => name,
            Identity::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of matching a candidate embedding against the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub identity: Identity,
    /// Euclidean distance to the nearest gallery entry (infinite for an empty gallery).
    pub distance: f32,
    /// Display-only percentage, `round((1 - distance) * 100)`. Set for known matches only.
    pub confidence: Option<i32>,
}

impl MatchResult {
    pub fn known(name: String, distance: f32) -> Self {
        Self {
            identity: Identity::Known(name),
            distance,
            confidence: Some(display_confidence(distance)),
        }
    }

    pub fn unknown(distance: f32) -> Self {
        Self {
            identity: Identity::Unknown,
            distance,
            confidence: None,
        }
    }

    /// Overlay label, e.g. `"Alice 90%"` or `"Unknown"`.
    pub fn label(&self) -> String {
        match self.confidence {
            Some(pct) => format!("{} {pct}%", self.identity),
            None => self.identity.to_string(),
        }
    }
}

/// Distance-to-percentage heuristic for display. Not a calibrated probability.
pub fn display_confidence(distance: f32) -> i32 {
    ((1.0 - distance) * 100.0).round() as i32
}

/// A detected face paired with its classification.
#[derive(Debug, Clone)]
pub struct FaceMatch {
    pub bbox: BoundingBox,
    pub result: MatchResult,
}
