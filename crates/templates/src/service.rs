use crate::files::{ensure_list_file, read_list, write_list};
use crate::models::{DAILY_DATA_FILE, DailyEntry, DateRange, NewTemplate, TemplateKind, entry_date, is_truthy};
use chrono::{SecondsFormat, Utc};
use rollup::entry::parse_date;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("{} name is required", .0.label())]
    NameRequired(TemplateKind),
    #[error("{} already exists", .0.label())]
    AlreadyExists(TemplateKind),
    #[error("{} not found", .0.label())]
    NotFound(TemplateKind),
    #[error("Failed to save {}", .0.label().to_lowercase())]
    SaveFailed(TemplateKind),
    #[error("Failed to remove {}", .0.label().to_lowercase())]
    RemoveFailed(TemplateKind),
    #[error("Date is required")]
    DateRequired,
    #[error("Failed to save daily data")]
    DailySaveFailed,
    #[error("Start date and end date are required")]
    RangeRequired,
    #[error("No data found for this date")]
    NoDataForDate,
    #[error("Data directory unavailable: {0}")]
    Storage(#[from] std::io::Error),
}

/// The template lists and daily log of one data directory.
///
/// Every read-modify-write runs under `write_lock`, so concurrent additions
/// never drop each other's entries.
#[derive(Debug)]
pub struct TemplateStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl TemplateStore {
    /// Creates the directory and any missing list file as `[]`.
    #[instrument]
    pub async fn open(data_dir: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, TemplateError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;

        for kind in TemplateKind::ALL {
            ensure_list_file(&data_dir.join(kind.file_name())).await?;
        }
        ensure_list_file(&data_dir.join(DAILY_DATA_FILE)).await?;

        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn list_path(&self, kind: TemplateKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    fn daily_path(&self) -> PathBuf {
        self.data_dir.join(DAILY_DATA_FILE)
    }

    pub async fn list(&self, kind: TemplateKind) -> Vec<String> {
        read_list(&self.list_path(kind)).await
    }

    #[instrument(skip(self))]
    pub async fn add(&self, kind: TemplateKind, body: &NewTemplate) -> Result<Vec<String>, TemplateError> {
        let name = body.trimmed_name().ok_or(TemplateError::NameRequired(kind))?;

        let _guard = self.write_lock.lock().await;
        let path = self.list_path(kind);
        let mut names: Vec<String> = read_list(&path).await;

        if names.iter().any(|n| n == name) {
            return Err(TemplateError::AlreadyExists(kind));
        }
        names.push(name.to_string());

        write_list(&path, &names)
            .await
            .map_err(|_| TemplateError::SaveFailed(kind))?;

        tracing::info!(kind = kind.label(), name, "template added");
        Ok(names)
    }

    /// Removes the first entry equal to `name` exactly.
    #[instrument(skip(self))]
    pub async fn remove(&self, kind: TemplateKind, name: &str) -> Result<Vec<String>, TemplateError> {
        let _guard = self.write_lock.lock().await;
        let path = self.list_path(kind);
        let mut names: Vec<String> = read_list(&path).await;

        let index = names
            .iter()
            .position(|n| n == name)
            .ok_or(TemplateError::NotFound(kind))?;
        names.remove(index);

        write_list(&path, &names)
            .await
            .map_err(|_| TemplateError::RemoveFailed(kind))?;

        tracing::info!(kind = kind.label(), name, "template removed");
        Ok(names)
    }

    /// Appends a snapshot stamped with the current UTC time and returns it.
    #[instrument(skip(self, body))]
    pub async fn add_daily(&self, body: Value) -> Result<DailyEntry, TemplateError> {
        let mut entry = match body {
            Value::Object(map) if map.get("date").is_some_and(is_truthy) => map,
            _ => return Err(TemplateError::DateRequired),
        };
        entry.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let _guard = self.write_lock.lock().await;
        let path = self.daily_path();
        let mut entries: Vec<DailyEntry> = read_list(&path).await;
        entries.push(entry.clone());

        write_list(&path, &entries)
            .await
            .map_err(|_| TemplateError::DailySaveFailed)?;

        tracing::info!(count = entries.len(), "daily data saved");
        Ok(entry)
    }

    pub async fn daily_all(&self) -> Vec<DailyEntry> {
        read_list(&self.daily_path()).await
    }

    /// Entries dated within `[startDate, endDate]`. Entries whose date cannot
    /// be read are left out.
    pub async fn daily_range(&self, range: &DateRange) -> Result<Vec<DailyEntry>, TemplateError> {
        let (Some(start), Some(end)) = (
            range.start_date.as_deref().filter(|s| !s.is_empty()),
            range.end_date.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(TemplateError::RangeRequired);
        };

        let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
            return Ok(Vec::new());
        };

        let entries = self.daily_all().await;
        Ok(entries
            .into_iter()
            .filter(|e| entry_date(e).is_some_and(|d| d >= start && d <= end))
            .collect())
    }

    /// Entries whose `date` is exactly the string `date`.
    pub async fn daily_for_date(&self, date: &str) -> Result<Vec<DailyEntry>, TemplateError> {
        let matching: Vec<DailyEntry> = self
            .daily_all()
            .await
            .into_iter()
            .filter(|e| e.get("date").and_then(Value::as_str) == Some(date))
            .collect();

        if matching.is_empty() {
            return Err(TemplateError::NoDataForDate);
        }
        Ok(matching)
    }
}
