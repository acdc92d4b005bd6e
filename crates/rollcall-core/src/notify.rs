//! Outbound intrusion notification capability.

use crate::report::SessionReport;

/// What happened to the end-of-session notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// No intrusion confirmed, or notification is disabled.
    Skipped,
    /// Delivery failed. Never fatal to the session.
    Failed(String),
}

/// Sends the intrusion alert for a session report.
///
/// Implementations must not panic on delivery problems; they report them
/// as [`NotifyOutcome::Failed`].
pub trait Notifier {
    fn send(&self, report: &SessionReport) -> NotifyOutcome;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn send(&self, report: &SessionReport) -> NotifyOutcome {
        (**self).send(report)
    }
}
