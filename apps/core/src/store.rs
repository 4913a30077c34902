use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

use crate::config::Config;
use crate::logging;
use crate::model::Prompt;

pub const CACHE_FILE_NAME: &str = "cache_prompt.txt";
const BACKUP_DIR_NAME: &str = "backup";

#[derive(Debug)]
pub enum StoreError {
    Corrupt { id: String, reason: String },
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupt { id, reason } => write!(f, "corrupt record {id}: {reason}"),
            Self::Io { path, source } => {
                write!(f, "io error at {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatistics {
    pub total_prompts: usize,
    pub total_groups: usize,
    pub prompts_by_group: BTreeMap<String, usize>,
}

/// Directory-backed record store: one JSON file per prompt, identified by
/// its path relative to the data directory.
///
/// Failure policy: targeted single-record operations return a typed
/// `StoreError`; bulk scans swallow per-record failures, log them, and
/// always complete with whatever was readable.
pub struct PromptStore {
    data_dir: PathBuf,
    record_extension: String,
    include_subdirs: bool,
}

impl PromptStore {
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.data_dir).map_err(|e| io_error(&config.data_dir, e))?;
        Ok(Self {
            data_dir: config.data_dir.clone(),
            record_extension: config.record_extension.clone(),
            include_subdirs: config.include_subdirs,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(id)
    }

    /// Every record file in the data directory. Ordering follows the
    /// directory walk; callers that need a stable order must sort.
    pub fn list_records(&self) -> Vec<String> {
        let max_depth = if self.include_subdirs { usize::MAX } else { 1 };
        let walker = WalkDir::new(&self.data_dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || entry.file_name().to_str() != Some(BACKUP_DIR_NAME)
            });

        let mut ids = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    logging::warn(&format!("skipping unreadable directory entry: {error}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let is_record = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(&self.record_extension));
            if !is_record {
                continue;
            }

            if let Ok(relative) = entry.path().strip_prefix(&self.data_dir) {
                ids.push(relative.to_string_lossy().into_owned());
            }
        }
        ids
    }

    pub fn read(&self, id: &str) -> Result<Prompt, StoreError> {
        let path = self.record_path(id);
        let raw = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Full overwrite; there is no partial update.
    pub fn write(&self, id: &str, prompt: &Prompt) -> Result<(), StoreError> {
        let path = self.record_path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let encoded = serde_json::to_string_pretty(prompt).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, encoded).map_err(|e| io_error(&path, e))
    }

    /// Derives a filesystem-safe identifier from `proposed_name` and writes
    /// the record under it. Name collisions are resolved by appending a
    /// zero-padded counter, so two prompts may share a display name.
    pub fn create(&self, proposed_name: &str, prompt: &Prompt) -> Result<String, StoreError> {
        let id = self.derive_unique_id(proposed_name);
        self.write(&id, prompt)?;
        Ok(id)
    }

    fn derive_unique_id(&self, proposed_name: &str) -> String {
        let base = sanitize_name(proposed_name);
        let mut candidate = format!("{base}{}", self.record_extension);
        let mut counter = 1;
        while self.record_path(&candidate).exists() {
            candidate = format!("{base}_{counter:04}{}", self.record_extension);
            counter += 1;
        }
        candidate
    }

    /// Deleting a record that does not exist is not an error.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&path, error)),
        }
    }

    /// Reads every record, skipping unreadable ones with a logged warning.
    pub fn load_all(&self) -> Vec<(String, Prompt)> {
        let mut records = Vec::new();
        for id in self.list_records() {
            match self.read(&id) {
                Ok(prompt) => records.push((id, prompt)),
                Err(error) => {
                    logging::warn(&format!("skipping record {id}: {error}"));
                }
            }
        }
        records
    }

    /// Distinct, sorted, non-empty group names across all records.
    pub fn groups(&self) -> Vec<String> {
        let mut groups = BTreeSet::new();
        for (_, prompt) in self.load_all() {
            let group = prompt.group_name();
            if !group.is_empty() {
                groups.insert(group.to_string());
            }
        }
        groups.into_iter().collect()
    }

    pub fn records_in_group(&self, group: &str) -> Vec<String> {
        self.load_all()
            .into_iter()
            .filter(|(_, prompt)| prompt.group_name() == group)
            .map(|(id, _)| id)
            .collect()
    }

    /// Records whose `shortcut` field is set and not the unset sentinel.
    pub fn prompts_with_shortcut(&self) -> Vec<(String, Prompt)> {
        self.load_all()
            .into_iter()
            .filter(|(_, prompt)| prompt.has_shortcut())
            .collect()
    }

    fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE_NAME)
    }

    /// Overwrites the single-slot last-viewed cache. Last writer wins.
    pub fn cache_content(&self, text: &str) -> Result<(), StoreError> {
        let path = self.cache_path();
        fs::write(&path, text).map_err(|e| io_error(&path, e))
    }

    /// Empty string when the cache file is absent or unreadable.
    pub fn read_cached_content(&self) -> String {
        fs::read_to_string(self.cache_path()).unwrap_or_default()
    }

    /// Serializes every readable record into one aggregate JSON file.
    pub fn export(&self, path: &Path) -> Result<usize, StoreError> {
        let records = self.load_all();
        let prompts: Vec<&Prompt> = records.iter().map(|(_, prompt)| prompt).collect();
        let encoded = serde_json::to_string_pretty(&prompts).map_err(|e| StoreError::Corrupt {
            id: path.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;
        fs::write(path, encoded).map_err(|e| io_error(path, e))?;
        Ok(prompts.len())
    }

    /// Imports records from an aggregate file, re-deriving each filename from
    /// the record's `name` with the same collision rule as `create`. Entries
    /// with an empty name are skipped.
    pub fn import(&self, path: &Path) -> Result<usize, StoreError> {
        let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let prompts: Vec<Prompt> = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            id: path.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;

        let mut imported = 0;
        for prompt in &prompts {
            if prompt.name.trim().is_empty() {
                continue;
            }
            self.create(&prompt.name, prompt)?;
            imported += 1;
        }
        Ok(imported)
    }

    /// Resets every record's `shortcut` field to empty; returns how many
    /// records were updated. Per-record failures are logged and skipped.
    pub fn clear_all_shortcuts(&self) -> usize {
        let mut cleared = 0;
        for (id, mut prompt) in self.load_all() {
            if prompt.shortcut.is_empty() {
                continue;
            }
            prompt.shortcut.clear();
            match self.write(&id, &prompt) {
                Ok(()) => cleared += 1,
                Err(error) => {
                    logging::warn(&format!("failed to clear shortcut on {id}: {error}"));
                }
            }
        }
        cleared
    }

    pub fn statistics(&self) -> StoreStatistics {
        let records = self.load_all();
        let mut prompts_by_group = BTreeMap::new();
        for (_, prompt) in &records {
            let group = prompt.group_name();
            if !group.is_empty() {
                *prompts_by_group.entry(group.to_string()).or_insert(0) += 1;
            }
        }
        StoreStatistics {
            total_prompts: records.len(),
            total_groups: prompts_by_group.len(),
            prompts_by_group,
        }
    }

    /// Copies every record file into a timestamped directory under
    /// `<data_dir>/backup/`. Per-record copy failures are logged.
    pub fn backup(&self) -> Result<PathBuf, StoreError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let backup_dir = self
            .data_dir
            .join(BACKUP_DIR_NAME)
            .join(format!("backup_{stamp}"));
        fs::create_dir_all(&backup_dir).map_err(|e| io_error(&backup_dir, e))?;

        for id in self.list_records() {
            let destination = backup_dir.join(&id);
            if let Some(parent) = destination.parent() {
                if let Err(error) = fs::create_dir_all(parent) {
                    logging::warn(&format!("backup skipped {id}: {error}"));
                    continue;
                }
            }
            if let Err(error) = fs::copy(self.record_path(&id), &destination) {
                logging::warn(&format!("backup skipped {id}: {error}"));
            }
        }
        Ok(backup_dir)
    }
}

/// Collapses runs of non-alphanumeric characters into a single `_`, keeping
/// the result usable as a file stem on every platform.
fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_separator = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            out.push(ch);
            last_was_separator = false;
        } else if !last_was_separator {
            out.push('_');
            last_was_separator = true;
        }
    }

    if out.is_empty() {
        out.push_str("prompt");
    }
    out
}
