//! Client settings: defaults, overlaid by a TOML file, then by environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use chrono::{FixedOffset, Offset, Utc};
use serde::{de::DeserializeOwned, Deserialize};

use crate::workflow::{DeleteFailurePolicy, NonImageUploadPolicy, WorkflowPolicy};

pub const LOCAL_SETTINGS_FILE: &str = "dreamink.toml";
const APP_DIR_NAME: &str = "dreamink";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub display_utc_offset_minutes: i32,
    pub non_image_uploads: NonImageUploadPolicy,
    pub delete_failures: DeleteFailurePolicy,
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:3001".into(),
            request_timeout_secs: 120,
            display_utc_offset_minutes: 330,
            non_image_uploads: NonImageUploadPolicy::Ignore,
            delete_failures: DeleteFailurePolicy::LogOnly,
            log_filter: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
    display_utc_offset_minutes: Option<i32>,
    non_image_uploads: Option<NonImageUploadPolicy>,
    delete_failures: Option<DeleteFailurePolicy>,
    log_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
    /// Values that were present but unusable; reported once logging is up.
    pub warnings: Vec<String>,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            non_image_uploads: self.non_image_uploads,
            delete_failures: self.delete_failures,
        }
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.backend_url {
            self.backend_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.display_utc_offset_minutes {
            self.display_utc_offset_minutes = v;
        }
        if let Some(v) = file.non_image_uploads {
            self.non_image_uploads = v;
        }
        if let Some(v) = file.delete_failures {
            self.delete_failures = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = Some(v);
        }
    }

    /// Applies environment overrides. `APP__*` names win over their `DREAMINK_*` forms.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();
        let var = |name: &str| {
            lookup(&format!("APP__{name}")).or_else(|| lookup(&format!("DREAMINK_{name}")))
        };

        if let Some(v) = var("BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = var("REQUEST_TIMEOUT_SECS") {
            match v.parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(_) => warnings.push(format!("ignoring invalid REQUEST_TIMEOUT_SECS '{v}'")),
            }
        }
        if let Some(v) = var("DISPLAY_UTC_OFFSET_MINUTES") {
            match v.parse::<i32>() {
                Ok(parsed) => self.display_utc_offset_minutes = parsed,
                Err(_) => {
                    warnings.push(format!("ignoring invalid DISPLAY_UTC_OFFSET_MINUTES '{v}'"))
                }
            }
        }
        if let Some(v) = var("NON_IMAGE_UPLOADS") {
            match parse_enum(&v) {
                Some(parsed) => self.non_image_uploads = parsed,
                None => warnings.push(format!("ignoring invalid NON_IMAGE_UPLOADS '{v}'")),
            }
        }
        if let Some(v) = var("DELETE_FAILURES") {
            match parse_enum(&v) {
                Some(parsed) => self.delete_failures = parsed,
                None => warnings.push(format!("ignoring invalid DELETE_FAILURES '{v}'")),
            }
        }
        if let Some(v) = var("LOG_FILTER") {
            self.log_filter = Some(v);
        }
        warnings
    }
}

fn parse_enum<T: DeserializeOwned>(raw: &str) -> Option<T> {
    toml::Value::String(raw.trim().to_ascii_lowercase())
        .try_into()
        .ok()
}

fn default_settings_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_SETTINGS_FILE);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join(APP_DIR_NAME).join("config.toml");
    user.is_file().then_some(user)
}

pub fn parse_settings_file(raw: &str) -> anyhow::Result<Settings> {
    let file: FileSettings = toml::from_str(raw).context("invalid settings file")?;
    let mut settings = Settings::default();
    settings.apply_file(file);
    Ok(settings)
}

/// Loads settings from `explicit` (which must exist) or the default locations, then the
/// process environment.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<LoadedSettings> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_settings_path(),
    };

    let mut settings = match &source {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            parse_settings_file(&raw)
                .with_context(|| format!("failed to load settings from '{}'", path.display()))?
        }
        None => Settings::default(),
    };
    let warnings = settings.apply_env(|name| std::env::var(name).ok());

    Ok(LoadedSettings {
        settings,
        source,
        warnings,
    })
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
