//! The per-frame classification loop.
//!
//! One [`Session`] owns all mutable state for a run: the recognized-name
//! set and the unknown-frame counter. Frames are pulled, classified and
//! recorded one at a time; the intruder decision is taken after the loop.

use crate::attendance::{AttendanceError, AttendanceRecorder, AttendanceSink};
use crate::config::{ConfigError, SessionConfig};
use crate::encoder::FaceEncoder;
use crate::gallery::Gallery;
use crate::intruder::IntruderMonitor;
use crate::matcher::{FaceMatcher, MatchError};
use crate::report::SessionReport;
use crate::sampler::{FrameSampler, SampledFrame};
use crate::schedule::ClassSlot;
use crate::source::FrameSource;
use crate::types::{FaceMatch, Identity};
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Attendance(#[from] AttendanceError),
    #[error("encoder produced {actual}-dim vectors but the gallery holds {expected}-dim vectors")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Manual stop signal, polled once per processed frame.
pub trait Interrupt {
    fn requested(&self) -> bool;
}

impl Interrupt for AtomicBool {
    fn requested(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: Interrupt + ?Sized> Interrupt for Arc<T> {
    fn requested(&self) -> bool {
        (**self).requested()
    }
}

/// An interrupt that never fires.
pub struct NoInterrupt;

impl Interrupt for NoInterrupt {
    fn requested(&self) -> bool {
        false
    }
}

/// Receives every sampled frame with its classifications (e.g. for overlays).
pub trait FrameObserver {
    fn on_frame(&mut self, frame: &SampledFrame, matches: &[FaceMatch]);
}

impl FrameObserver for () {
    fn on_frame(&mut self, _frame: &SampledFrame, _matches: &[FaceMatch]) {}
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send>;

pub struct Session<E, S> {
    config: SessionConfig,
    slot: ClassSlot,
    matcher: FaceMatcher<E>,
    recorder: AttendanceRecorder<S>,
    monitor: IntruderMonitor,
    sampled_frames: usize,
    clock: Clock,
}

impl<E: FaceEncoder, S: AttendanceSink> Session<E, S> {
    /// Build a session. The config is validated before anything else happens,
    /// then the encoder's declared vector length is checked against the gallery.
    pub fn new(
        config: SessionConfig,
        gallery: Gallery,
        slot: ClassSlot,
        encoder: E,
        sink: S,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        if let Some(actual) = encoder.dimension() {
            let expected = gallery.dimension();
            if actual != expected {
                return Err(SessionError::DimensionMismatch { expected, actual });
            }
        }
        let matcher = FaceMatcher::new(encoder, gallery, config.match_threshold);
        let monitor = IntruderMonitor::new(config.intruder_frame_threshold);

        Ok(Self {
            config,
            slot,
            matcher,
            recorder: AttendanceRecorder::new(sink),
            monitor,
            sampled_frames: 0,
            clock: Box::new(|| chrono::Local::now().naive_local()),
        })
    }

    /// Replace the wall clock used for record timestamps and the report date.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn slot(&self) -> &ClassSlot {
        &self.slot
    }

    pub fn unknown_frames(&self) -> u32 {
        self.monitor.unknown_frames()
    }

    pub fn present(&self) -> usize {
        self.recorder.present()
    }

    /// Classify one sampled frame and update session state.
    ///
    /// An encoder failure is logged and the frame counts as having no faces.
    pub fn process_frame(&mut self, sampled: &SampledFrame) -> Result<Vec<FaceMatch>, SessionError> {
        self.sampled_frames += 1;

        let matches = match self.matcher.match_frame(&sampled.frame) {
            Ok(matches) => matches,
            Err(MatchError::Encoder(e)) => {
                tracing::warn!(frame = sampled.index, error = %e, "face encoding failed; skipping frame");
                Vec::new()
            }
            Err(MatchError::DimensionMismatch { expected, actual }) => {
                return Err(SessionError::DimensionMismatch { expected, actual });
            }
        };

        let now = (self.clock)();
        let mut unknown_seen = false;
        for m in &matches {
            match &m.result.identity {
                Identity::Unknown => unknown_seen = true,
                known => {
                    self.recorder.record_if_new(known, &self.slot, now)?;
                }
            }
        }
        self.monitor.observe(unknown_seen);

        tracing::debug!(
            frame = sampled.index,
            faces = matches.len(),
            unknown = unknown_seen,
            "frame processed"
        );
        Ok(matches)
    }

    /// Run the loop until the source ends or `interrupt` fires, then report.
    ///
    /// The attendance sink is dropped on every exit path, including errors.
    pub fn run<F: FrameSource>(
        mut self,
        source: F,
        interrupt: &dyn Interrupt,
        observer: &mut dyn FrameObserver,
    ) -> Result<SessionReport, SessionError> {
        tracing::info!(
            subject = %self.slot.subject,
            timing = %self.slot.timing,
            stride = self.config.frame_sample_stride,
            "starting analysis"
        );

        let mut interrupted = false;
        for sampled in FrameSampler::new(source, self.config.frame_sample_stride) {
            let matches = self.process_frame(&sampled)?;
            observer.on_frame(&sampled, &matches);

            if interrupt.requested() {
                tracing::info!(frame = sampled.index, "interrupt received; stopping early");
                interrupted = true;
                break;
            }
        }

        Ok(self.finish(interrupted))
    }

    /// Evaluate intruder confirmation and build the final report.
    pub fn finish(self, interrupted: bool) -> SessionReport {
        let intrusion = self.monitor.evaluate();
        let report = SessionReport {
            subject: self.slot.subject,
            timing: self.slot.timing,
            date: (self.clock)().date(),
            present: self.recorder.present(),
            recognized: self.recorder.recognized().iter().cloned().collect(),
            sampled_frames: self.sampled_frames,
            unknown_frames: self.monitor.unknown_frames(),
            intrusion,
            interrupted,
        };

        tracing::info!(
            present = report.present,
            sampled_frames = report.sampled_frames,
            unknown_frames = report.unknown_frames,
            intrusion = ?report.intrusion,
            interrupted,
            "session finished"
        );
        report
    }
}
