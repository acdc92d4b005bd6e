//! rollcall-notify — Intrusion alert delivery.
//!
//! [`SmtpNotifier`] sends one plain-text message per confirmed intrusion
//! over an implicit-TLS relay. [`LogNotifier`] stands in when mail is not
//! configured. Neither ever propagates a delivery failure.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use rollcall_core::{NotificationConfig, Notifier, NotifyOutcome, SessionReport};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("no recipients configured")]
    NoRecipients,
}

pub fn alert_subject(report: &SessionReport) -> String {
    format!("SECURITY BREACH CONFIRMED: {}", report.subject)
}

pub fn alert_body(report: &SessionReport, organization: &str) -> String {
    format!(
        "Dear Administrator,

The AI Facial Recognition System has completed the final classification of the video feed.

--- SESSION SUMMARY ---
Subject: {subject}
Timing: {timing}
Date: {date}
Students Present: {present}
Security Status: INTRUDER CONFIRMED

An unauthorized individual was detected during this session. The logs have been updated with the classification data.

Regards,
{organization}
",
        subject = report.subject,
        timing = report.timing,
        date = report.date.format("%B %d, %Y"),
        present = report.present,
    )
}

pub struct SmtpNotifier {
    config: NotificationConfig,
}

impl SmtpNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    /// Build the alert message without sending it.
    pub fn compose(&self, report: &SessionReport) -> Result<Message, NotifyError> {
        if self.config.recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.config.sender.parse::<Mailbox>()?)
            .subject(alert_subject(report))
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.config.recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        Ok(builder.body(alert_body(report, &self.config.organization))?)
    }

    fn deliver(&self, report: &SessionReport) -> Result<(), NotifyError> {
        let message = self.compose(report)?;
        let transport = SmtpTransport::relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.sender.clone(),
                self.config.password.clone(),
            ))
            .build();
        transport.send(&message)?;
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, report: &SessionReport) -> NotifyOutcome {
        tracing::info!(
            host = %self.config.smtp_host,
            port = self.config.smtp_port,
            recipients = self.config.recipients.len(),
            "sending security confirmation email"
        );
        match self.deliver(report) {
            Ok(()) => NotifyOutcome::Sent,
            Err(e) => {
                tracing::error!(error = %e, "email notification failed");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Logs the alert instead of sending it.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, report: &SessionReport) -> NotifyOutcome {
        tracing::warn!(
            subject = %report.subject,
            timing = %report.timing,
            present = report.present,
            unknown_frames = report.unknown_frames,
            "intruder confirmed; mail notification not configured"
        );
        NotifyOutcome::Skipped
    }
}

/// Pick the notifier the configuration allows.
pub fn from_config(config: &NotificationConfig) -> Box<dyn Notifier> {
    if config.is_deliverable() {
        Box::new(SmtpNotifier::new(config.clone()))
    } else {
        Box::new(LogNotifier)
    }
}
