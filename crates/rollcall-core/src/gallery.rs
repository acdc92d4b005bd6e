//! Reference gallery of known identities.
//!
//! Loaded once per run from a JSON file holding index-aligned `names` and
//! `encodings` arrays. Any problem with the file is fatal to the run.

use crate::types::{Embedding, GalleryEntry};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("gallery file not found: {0}")]
    NotFound(String),
    #[error("failed to read gallery {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed gallery: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("gallery has {names} names but {encodings} encodings")]
    LengthMismatch { names: usize, encodings: usize },
    #[error("gallery is empty")]
    Empty,
    #[error("gallery entry {0} has an empty name")]
    EmptyName(usize),
    #[error("gallery entry {index} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// On-disk layout of the gallery file.
#[derive(Deserialize)]
struct GalleryFile {
    names: Vec<String>,
    encodings: Vec<Vec<f32>>,
}

/// Immutable set of known identities and their feature vectors.
#[derive(Debug, Clone)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
    dimension: usize,
}

impl Gallery {
    /// Load and validate a gallery file.
    pub fn load(path: &Path) -> Result<Self, GalleryError> {
        if !path.exists() {
            return Err(GalleryError::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| GalleryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let gallery = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            entries = gallery.len(),
            dimension = gallery.dimension(),
            "gallery loaded"
        );
        Ok(gallery)
    }

    /// Parse a gallery from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, GalleryError> {
        let file: GalleryFile = serde_json::from_str(raw)?;
        if file.names.len() != file.encodings.len() {
            return Err(GalleryError::LengthMismatch {
                names: file.names.len(),
                encodings: file.encodings.len(),
            });
        }
        let entries = file
            .names
            .into_iter()
            .zip(file.encodings)
            .map(|(name, values)| GalleryEntry {
                name,
                embedding: Embedding::new(values),
            })
            .collect();
        Self::from_entries(entries)
    }

    /// Build a gallery from already-decoded entries, applying the same checks as [`load`](Self::load).
    pub fn from_entries(entries: Vec<GalleryEntry>) -> Result<Self, GalleryError> {
        let first = entries.first().ok_or(GalleryError::Empty)?;
        let dimension = first.embedding.len();

        for (index, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(GalleryError::EmptyName(index));
            }
            if entry.embedding.len() != dimension || dimension == 0 {
                return Err(GalleryError::DimensionMismatch {
                    index,
                    expected: dimension,
                    actual: entry.embedding.len(),
                });
            }
        }

        Ok(Self { entries, dimension })
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feature vector length shared by every entry.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Distinct names in gallery order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !names.contains(&entry.name.as_str()) {
                names.push(&entry.name);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_json_index_aligned() {
        let gallery = Gallery::from_json(
            r#"{"names": ["Alice", "Bob"], "encodings": [[0.0, 1.0], [1.0, 0.0]]}"#,
        )
        .unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.dimension(), 2);
        assert_eq!(gallery.entries()[1].name, "Bob");
        assert_eq!(gallery.entries()[1].embedding.values, vec![1.0, 0.0]);
    }

    #[test]
    fn test_names_deduplicated_in_order() {
        // Several encodings per person are allowed.
        let gallery = Gallery::from_json(
            r#"{"names": ["Bob", "Alice", "Bob"], "encodings": [[0.0], [1.0], [0.1]]}"#,
        )
        .unwrap();
        assert_eq!(gallery.names(), vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = Gallery::from_json(r#"{"names": ["Alice"], "encodings": []}"#).unwrap_err();
        assert!(matches!(
            err,
            GalleryError::LengthMismatch { names: 1, encodings: 0 }
        ));
    }

    #[test]
    fn test_empty_gallery_rejected() {
        let err = Gallery::from_json(r#"{"names": [], "encodings": []}"#).unwrap_err();
        assert!(matches!(err, GalleryError::Empty));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Gallery::from_json(r#"{"names": [" "], "encodings": [[0.5]]}"#).unwrap_err();
        assert!(matches!(err, GalleryError::EmptyName(0)));
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let err = Gallery::from_json(r#"{"names": ["A", "B"], "encodings": [[0.5, 0.1], [0.5]]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::DimensionMismatch { index: 1, expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = Gallery::from_json("not json").unwrap_err();
        assert!(matches!(err, GalleryError::Malformed(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Gallery::load(&dir.path().join("encodings.json")).unwrap_err();
        assert!(matches!(err, GalleryError::NotFound(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"names": ["Alice"], "encodings": [[0.25, 0.5, 0.75]]}}"#).unwrap();
        let gallery = Gallery::load(file.path()).unwrap();
        assert_eq!(gallery.names(), vec!["Alice"]);
        assert_eq!(gallery.dimension(), 3);
    }
}
