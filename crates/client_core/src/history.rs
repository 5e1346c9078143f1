//! Read-only snapshot of the user's transformation history.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use shared::{domain::HistoryId, protocol::HistoryRecord};

use crate::media::{history_file_name, normalize_image_payload};

const SQLITE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
const DISPLAY_FORMAT: &str = "%d %b %Y, %I:%M %P";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub style: String,
    pub original_image: String,
    pub transformed_image: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_at_raw: String,
}

impl HistoryEntry {
    pub fn download_file_name(&self) -> String {
        history_file_name(&self.style, self.id)
    }

    pub fn style_badge(&self) -> String {
        self.style.to_uppercase()
    }

    /// Creation time rendered in `offset`; falls back to the backend's raw value when it
    /// could not be parsed.
    pub fn display_time(&self, offset: FixedOffset) -> String {
        match self.created_at {
            Some(at) => format_created_at(at, offset),
            None => self.created_at_raw.clone(),
        }
    }
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(value: HistoryRecord) -> Self {
        Self {
            id: value.id,
            original_image: normalize_image_payload(&value.original_image),
            transformed_image: normalize_image_payload(&value.transformed_image),
            created_at: parse_created_at(&value.created_at),
            created_at_raw: value.created_at,
            style: value.style,
        }
    }
}

/// Accepts SQLite `CURRENT_TIMESTAMP` text (UTC), RFC 3339 and RFC 2822.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    for format in SQLITE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

pub fn format_created_at(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format(DISPLAY_FORMAT).to_string()
}

/// Builds the client snapshot: normalized images, newest first. Entries whose time cannot be
/// parsed keep their backend order after the dated ones.
pub fn snapshot(records: Vec<HistoryRecord>) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = records.into_iter().map(HistoryEntry::from).collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    Loading,
    Empty,
    Loaded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    loading: bool,
    entries: Vec<HistoryEntry>,
    notice: Option<String>,
}

impl HistoryView {
    pub(crate) fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn status(&self) -> HistoryStatus {
        if self.loading {
            HistoryStatus::Loading
        } else if self.entries.is_empty() {
            HistoryStatus::Empty
        } else {
            HistoryStatus::Loaded
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn entry(&self, id: HistoryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Set only when delete failures are configured to surface.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub(crate) fn set_loading(&mut self) {
        self.loading = true;
    }

    pub(crate) fn finish(&mut self, entries: Option<Vec<HistoryEntry>>) {
        self.loading = false;
        if let Some(entries) = entries {
            self.entries = entries;
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
