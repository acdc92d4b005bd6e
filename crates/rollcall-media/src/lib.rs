//! rollcall-media — Frame sources and overlays.
//!
//! Provides image-sequence and raw BGR24 frame sources, pixel layout
//! conversion into the core RGB frame and bounding-box annotation of
//! classified frames.

pub mod frame;
pub mod overlay;
pub mod raw;
pub mod sequence;

pub use frame::FrameError;
pub use overlay::{AnnotationWriter, LabelFont, OverlayError};
pub use raw::RawBgrVideo;
pub use sequence::ImageSequence;
