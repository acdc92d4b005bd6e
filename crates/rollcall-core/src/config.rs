//! Session tunables and mail relay settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("match_threshold must be a positive finite number, got {0}")]
    InvalidMatchThreshold(f32),
    #[error("frame_sample_stride must be at least 1")]
    ZeroStride,
}

/// Tunables for one classification session.
///
/// Mail settings are not part of this; they live in [`NotificationConfig`]
/// and are only read by whoever sends the alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Euclidean distance below which a face is a known identity.
    pub match_threshold: f32,
    /// A session with more than this many unknown-face frames is a confirmed intrusion.
    pub intruder_frame_threshold: u32,
    /// Only every Nth frame is classified.
    pub frame_sample_stride: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.44,
            intruder_frame_threshold: 10,
            frame_sample_stride: 3,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.match_threshold.is_finite() || self.match_threshold <= 0.0 {
            return Err(ConfigError::InvalidMatchThreshold(self.match_threshold));
        }
        if self.frame_sample_stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        Ok(())
    }
}

/// Mail relay settings for the intrusion alert.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub smtp_host: String,
    /// Implicit-TLS port.
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
    /// Sign-off line of the alert body.
    pub organization: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            sender: String::new(),
            password: String::new(),
            recipients: Vec::new(),
            organization: "AI Security Division".to_string(),
        }
    }
}

impl NotificationConfig {
    /// Whether there is enough here to attempt delivery.
    pub fn is_deliverable(&self) -> bool {
        self.enabled && !self.sender.is_empty() && !self.recipients.is_empty()
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("enabled", &self.enabled)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .field("organization", &self.organization)
            .finish()
    }
}
