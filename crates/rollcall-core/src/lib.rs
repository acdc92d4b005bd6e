//! rollcall-core — Classroom attendance and intruder confirmation engine.
//!
//! Samples frames from a video source, matches detected faces against a
//! fixed gallery by Euclidean distance, records first sightings and
//! confirms an intrusion when unknown faces persist across enough frames.

pub mod attendance;
pub mod config;
pub mod encoder;
pub mod gallery;
pub mod intruder;
pub mod matcher;
pub mod notify;
pub mod report;
pub mod sampler;
pub mod schedule;
pub mod session;
pub mod source;
pub mod types;

pub use attendance::{AttendanceError, AttendanceRecord, AttendanceRecorder, AttendanceSink};
pub use config::{ConfigError, NotificationConfig, SessionConfig};
pub use encoder::{BoxError, EncoderError, FaceEncoder};
pub use gallery::{Gallery, GalleryError};
pub use intruder::{IntruderMonitor, IntruderState};
pub use matcher::{EuclideanMatcher, FaceMatcher, MatchError, Matcher};
pub use notify::{Notifier, NotifyOutcome};
pub use report::SessionReport;
pub use sampler::{FrameSampler, SampledFrame};
pub use schedule::{ClassSlot, ScheduleResolver, ScheduleSlot};
pub use session::{FrameObserver, Interrupt, NoInterrupt, Session, SessionError};
pub use source::{Frame, FrameSource, SourceError};
pub use types::{BoundingBox, DetectedFace, Embedding, FaceMatch, GalleryEntry, Identity, MatchResult};
