//! Bounding-box overlays for classified frames.
//!
//! Known faces get a green box, unknown faces a red one, each labelled with
//! `MatchResult::label()` above the box when a label font is loaded.
//! Annotated frames are written as PNG files so a headless run can still be
//! reviewed.

use crate::frame::to_rgb_image;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rollcall_core::{BoundingBox, FaceMatch, FrameObserver, SampledFrame};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const KNOWN_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const UNKNOWN_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: u32 = 2;
const LABEL_SCALE: f32 = 18.0;
const LABEL_GAP: i32 = 4;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("failed to read font {path}: {source}")]
    FontIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font {0}")]
    InvalidFont(String),
}

/// TrueType/OpenType font used for the overlay labels.
pub struct LabelFont {
    font: FontVec,
    scale: PxScale,
}

impl LabelFont {
    pub fn load(path: &Path) -> Result<Self, OverlayError> {
        let bytes = std::fs::read(path).map_err(|source| OverlayError::FontIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(bytes).map_err(|_| OverlayError::InvalidFont(path.display().to_string()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ab_glyph::InvalidFont> {
        Ok(Self {
            font: FontVec::try_from_vec(bytes)?,
            scale: PxScale::from(LABEL_SCALE),
        })
    }
}

/// Box outline as an `imageproc` rect; `None` for boxes under one pixel.
fn outline(bbox: &BoundingBox, inset: u32) -> Option<Rect> {
    let width = bbox.width.round() as i64 - 2 * inset as i64;
    let height = bbox.height.round() as i64 - 2 * inset as i64;
    if width < 1 || height < 1 {
        return None;
    }
    Some(
        Rect::at(bbox.x.round() as i32 + inset as i32, bbox.y.round() as i32 + inset as i32)
            .of_size(width as u32, height as u32),
    )
}

/// Draw a rectangle outline `thickness` pixels wide. Parts outside the image are clipped.
pub fn draw_box(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    for inset in 0..thickness {
        if let Some(rect) = outline(bbox, inset) {
            draw_hollow_rect_mut(img, rect, color);
        }
    }
}

/// Draw `text` just above the box, or inside its top edge when there is no room.
pub fn draw_label(img: &mut RgbImage, bbox: &BoundingBox, text: &str, color: Rgb<u8>, font: &LabelFont) {
    let (_, text_h) = text_size(font.scale, &font.font, text);
    let top = bbox.y.round() as i32;
    let y = (top - text_h as i32 - LABEL_GAP).max(0);
    draw_text_mut(img, color, bbox.x.round() as i32, y, font.scale, &font.font, text);
}

/// Draw every match onto an image.
pub fn annotate(img: &mut RgbImage, matches: &[FaceMatch], font: Option<&LabelFont>) {
    for m in matches {
        let color = if m.result.identity.is_known() {
            KNOWN_COLOR
        } else {
            UNKNOWN_COLOR
        };
        draw_box(img, &m.bbox, color, BOX_THICKNESS);
        if let Some(font) = font {
            draw_label(img, &m.bbox, &m.result.label(), color, font);
        }
    }
}

/// Saves each sampled frame with its overlays into a directory.
pub struct AnnotationWriter {
    dir: PathBuf,
    font: Option<LabelFont>,
    written: usize,
}

impl AnnotationWriter {
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            font: None,
            written: 0,
        })
    }

    /// Render labels with `font`. Without one only the boxes are drawn.
    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameObserver for AnnotationWriter {
    fn on_frame(&mut self, frame: &SampledFrame, matches: &[FaceMatch]) {
        let Some(mut img) = to_rgb_image(&frame.frame) else {
            tracing::warn!(frame = frame.index, "frame buffer size mismatch; not annotated");
            return;
        };
        annotate(&mut img, matches, self.font.as_ref());
        if self.font.is_none() {
            for m in matches {
                tracing::debug!(frame = frame.index, label = %m.result.label(), "overlay");
            }
        }

        let path = self.dir.join(format!("{:06}.png", frame.index));
        match img.save(&path) {
            Ok(()) => self.written += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to write annotated frame")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{Frame, MatchResult};

    const SYSTEM_FONTS: [&str; 4] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
    ];

    fn system_font() -> Option<LabelFont> {
        SYSTEM_FONTS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .and_then(|p| LabelFont::load(p).ok())
    }

    fn face(bbox: BoundingBox, result: MatchResult) -> FaceMatch {
        FaceMatch { bbox, result }
    }

    #[test]
    fn test_box_colors() {
        let mut img = RgbImage::new(40, 40);
        let matches = vec![
            face(BoundingBox::from_edges(2.0, 12.0, 12.0, 2.0), MatchResult::known("Alice".into(), 0.1)),
            face(BoundingBox::from_edges(20.0, 35.0, 35.0, 20.0), MatchResult::unknown(0.9)),
        ];
        annotate(&mut img, &matches, None);

        assert_eq!(*img.get_pixel(2, 2), KNOWN_COLOR);
        assert_eq!(*img.get_pixel(11, 11), KNOWN_COLOR);
        // Second ring of the 2px outline.
        assert_eq!(*img.get_pixel(3, 7), KNOWN_COLOR);
        assert_eq!(*img.get_pixel(20, 30), UNKNOWN_COLOR);
        // Interior untouched.
        assert_eq!(*img.get_pixel(7, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_box_partly_outside_is_clipped() {
        let mut img = RgbImage::new(10, 10);
        let bbox = BoundingBox::from_edges(-5.0, 6.0, 6.0, -5.0);
        draw_box(&mut img, &bbox, KNOWN_COLOR, 1);
        assert_eq!(*img.get_pixel(5, 0), KNOWN_COLOR);
        assert_eq!(*img.get_pixel(0, 5), KNOWN_COLOR);
        assert_eq!(*img.get_pixel(2, 2), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(8, 8), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_degenerate_box_is_skipped() {
        let mut img = RgbImage::new(10, 10);
        draw_box(&mut img, &BoundingBox::from_edges(4.0, 4.0, 4.0, 4.0), KNOWN_COLOR, 2);
        assert!(img.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_invalid_font_rejected() {
        assert!(LabelFont::from_bytes(b"not a font".to_vec()).is_err());
        let dir = tempfile::tempdir().unwrap();
        let err = LabelFont::load(&dir.path().join("missing.ttf")).err().unwrap();
        assert!(matches!(err, OverlayError::FontIo { .. }));
    }

    #[test]
    fn test_label_drawn_above_box() {
        // Needs a font on the host; boxes are covered above.
        let Some(font) = system_font() else {
            return;
        };
        let mut img = RgbImage::new(200, 120);
        let matches = vec![face(
            BoundingBox::from_edges(60.0, 120.0, 110.0, 20.0),
            MatchResult::known("Alice".into(), 0.1),
        )];
        annotate(&mut img, &matches, Some(&font));

        let painted_above = (0..60u32)
            .flat_map(|y| (0..200u32).map(move |x| (x, y)))
            .any(|(x, y)| *img.get_pixel(x, y) != Rgb([0, 0, 0]));
        assert!(painted_above);
    }

    #[test]
    fn test_writer_saves_one_png_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = AnnotationWriter::create(&dir.path().join("out")).unwrap();
        let sampled = SampledFrame { index: 6, frame: Frame::blank(16, 16) };
        let matches = vec![face(
            BoundingBox::from_edges(1.0, 8.0, 8.0, 1.0),
            MatchResult::unknown(0.7),
        )];

        writer.on_frame(&sampled, &matches);

        assert_eq!(writer.written(), 1);
        let saved = image::open(dir.path().join("out/000006.png")).unwrap().to_rgb8();
        assert_eq!(*saved.get_pixel(1, 1), UNKNOWN_COLOR);
    }
}
