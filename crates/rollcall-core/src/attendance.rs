//! First-sighting attendance recording.

use crate::encoder::BoxError;
use crate::schedule::ClassSlot;
use crate::types::Identity;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("failed to persist attendance for {name}: {source}")]
pub struct AttendanceError {
    pub name: String,
    #[source]
    pub source: BoxError,
}

/// One row of the attendance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub name: String,
    pub subject: String,
    pub timing: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub timestamp: String,
}

impl AttendanceRecord {
    pub fn new(name: &str, slot: &ClassSlot, at: NaiveDateTime) -> Self {
        Self {
            name: name.to_string(),
            subject: slot.subject.clone(),
            timing: slot.timing.clone(),
            date: at.format("%Y-%m-%d").to_string(),
            timestamp: at.format("%H:%M:%S").to_string(),
        }
    }
}

/// Persistence target for attendance records.
pub trait AttendanceSink {
    fn append(&mut self, record: &AttendanceRecord) -> Result<(), BoxError>;
}

impl AttendanceSink for Vec<AttendanceRecord> {
    fn append(&mut self, record: &AttendanceRecord) -> Result<(), BoxError> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: AttendanceSink + ?Sized> AttendanceSink for &mut S {
    fn append(&mut self, record: &AttendanceRecord) -> Result<(), BoxError> {
        (**self).append(record)
    }
}

/// Writes one record per identity per session.
pub struct AttendanceRecorder<S> {
    sink: S,
    recognized: BTreeSet<String>,
}

impl<S: AttendanceSink> AttendanceRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            recognized: BTreeSet::new(),
        }
    }

    /// Persist a record if this is the identity's first sighting.
    ///
    /// Returns `Ok(true)` when a record was written. Unknown faces are never
    /// recorded. The name joins the recognized set only after the write
    /// succeeds, so a failed write can be retried.
    pub fn record_if_new(
        &mut self,
        identity: &Identity,
        slot: &ClassSlot,
        at: NaiveDateTime,
    ) -> Result<bool, AttendanceError> {
        let Identity::Known(name) = identity else {
            return Ok(false);
        };
        if self.recognized.contains(name) {
            return Ok(false);
        }

        let record = AttendanceRecord::new(name, slot, at);
        self.sink.append(&record).map_err(|source| AttendanceError {
            name: name.clone(),
            source,
        })?;
        self.recognized.insert(name.clone());

        tracing::info!(name = %name, time = %record.timestamp, "attendance recorded");
        Ok(true)
    }

    /// Names recorded so far, sorted.
    pub fn recognized(&self) -> &BTreeSet<String> {
        &self.recognized
    }

    pub fn present(&self) -> usize {
        self.recognized.len()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
