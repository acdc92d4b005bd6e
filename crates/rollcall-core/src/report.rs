//! End-of-session summary and the alert gate.

use crate::intruder::IntruderState;
use crate::notify::{Notifier, NotifyOutcome};
use chrono::NaiveDate;
use serde::Serialize;

/// Final figures of a session, produced once the frame loop ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub subject: String,
    pub timing: String,
    pub date: NaiveDate,
    /// Number of distinct identities recorded.
    pub present: usize,
    /// Recorded names, sorted.
    pub recognized: Vec<String>,
    pub sampled_frames: usize,
    pub unknown_frames: u32,
    pub intrusion: IntruderState,
    /// The loop was stopped by an interrupt before the source ran out.
    pub interrupted: bool,
}

impl SessionReport {
    /// Human-readable end-of-run summary.
    pub fn summary(&self) -> String {
        format!(
            "Classified {} students.\nReport processed for {}.",
            self.present, self.subject
        )
    }

    /// Send the intrusion alert if, and only if, the intrusion was confirmed.
    ///
    /// Delivery failures are logged and returned, never raised.
    pub fn notify(&self, notifier: &dyn Notifier) -> NotifyOutcome {
        if !self.intrusion.is_confirmed() {
            tracing::info!(
                unknown_frames = self.unknown_frames,
                "analysis complete: no unauthorized individuals confirmed"
            );
            return NotifyOutcome::Skipped;
        }

        tracing::info!(
            subject = %self.subject,
            unknown_frames = self.unknown_frames,
            "intruder confirmed; sending notification"
        );
        let outcome = notifier.send(self);
        match &outcome {
            NotifyOutcome::Sent => tracing::info!("intrusion notification sent"),
            NotifyOutcome::Skipped => tracing::info!("intrusion notification skipped by notifier"),
            NotifyOutcome::Failed(reason) => {
                tracing::error!(reason = %reason, "intrusion notification failed")
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingNotifier {
        calls: Cell<usize>,
        outcome: NotifyOutcome,
    }

    impl Notifier for CountingNotifier {
        fn send(&self, _report: &SessionReport) -> NotifyOutcome {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    fn report(intrusion: IntruderState) -> SessionReport {
        SessionReport {
            subject: "Physics".into(),
            timing: "10:00 - 11:00".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            present: 2,
            recognized: vec!["Alice".into(), "Bob".into()],
            sampled_frames: 40,
            unknown_frames: 12,
            intrusion,
            interrupted: false,
        }
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            report(IntruderState::Monitoring).summary(),
            "Classified 2 students.\nReport processed for Physics."
        );
    }

    #[test]
    fn test_unconfirmed_skips_notifier() {
        let notifier = CountingNotifier { calls: Cell::new(0), outcome: NotifyOutcome::Sent };
        let outcome = report(IntruderState::Monitoring).notify(&notifier);
        assert_eq!(outcome, NotifyOutcome::Skipped);
        assert_eq!(notifier.calls.get(), 0);
    }

    #[test]
    fn test_confirmed_sends_once() {
        let notifier = CountingNotifier { calls: Cell::new(0), outcome: NotifyOutcome::Sent };
        let outcome = report(IntruderState::Confirmed).notify(&notifier);
        assert_eq!(outcome, NotifyOutcome::Sent);
        assert_eq!(notifier.calls.get(), 1);
    }

    #[test]
    fn test_failure_is_returned_not_raised() {
        let notifier = CountingNotifier {
            calls: Cell::new(0),
            outcome: NotifyOutcome::Failed("535 authentication failed".into()),
        };
        let outcome = report(IntruderState::Confirmed).notify(&notifier);
        assert_eq!(outcome, NotifyOutcome::Failed("535 authentication failed".into()));
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(report(IntruderState::Confirmed)).unwrap();
        assert_eq!(json["intrusion"], "Confirmed");
        assert_eq!(json["date"], "2024-03-04");
        assert_eq!(json["present"], 2);
    }
}
