use anyhow::{Context, Result};
use rollcall_core::{NotificationConfig, SessionConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "rollcall.toml";

/// CLI configuration: `rollcall.toml` with `ROLLCALL_*` environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub session: SessionConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Reference gallery (`{"names": [...], "encodings": [[...]]}`).
    pub gallery: PathBuf,
    /// Weekly timetable JSON.
    pub schedule: PathBuf,
    /// SQLite attendance database, reset on every run.
    pub database: PathBuf,
    /// Directory containing the ONNX model files.
    pub models: PathBuf,
    /// TTF/OTF font for overlay labels. Boxes are drawn unlabelled without one.
    pub font: Option<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            gallery: PathBuf::from("encodings.json"),
            schedule: PathBuf::from("timetable.json"),
            database: PathBuf::from("attendance_db.sqlite"),
            models: PathBuf::from("models"),
            font: None,
        }
    }
}

impl Config {
    /// Load from `path` (defaults if the file does not exist), then apply
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Self::from_toml(&raw).with_context(|| format!("malformed config {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply `ROLLCALL_*` overrides. Unparseable values keep the current one.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let session = &mut self.session;
        session.match_threshold =
            parsed(&var, "ROLLCALL_MATCH_THRESHOLD").unwrap_or(session.match_threshold);
        session.intruder_frame_threshold =
            parsed(&var, "ROLLCALL_INTRUDER_FRAMES").unwrap_or(session.intruder_frame_threshold);
        session.frame_sample_stride =
            parsed(&var, "ROLLCALL_FRAME_STRIDE").unwrap_or(session.frame_sample_stride);

        if let Some(p) = var("ROLLCALL_GALLERY_PATH") {
            self.paths.gallery = PathBuf::from(p);
        }
        if let Some(p) = var("ROLLCALL_SCHEDULE_PATH") {
            self.paths.schedule = PathBuf::from(p);
        }
        if let Some(p) = var("ROLLCALL_DB_PATH") {
            self.paths.database = PathBuf::from(p);
        }
        if let Some(p) = var("ROLLCALL_MODEL_DIR") {
            self.paths.models = PathBuf::from(p);
        }
        if let Some(p) = var("ROLLCALL_FONT_PATH") {
            self.paths.font = Some(PathBuf::from(p));
        }
        if let Some(password) = var("ROLLCALL_SMTP_PASSWORD") {
            self.notification.password = password;
        }
    }
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.trim().parse().ok())
}
