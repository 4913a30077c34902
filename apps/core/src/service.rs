use std::path::Path;

use crate::config::{validate, Config};
use crate::logging;
use crate::model::Prompt;
use crate::search::{self, SearchScope};
use crate::store::{PromptStore, StoreError, StoreStatistics};

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    Store(StoreError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Store(error) => write!(f, "store error: {error}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Facade over the store and search engine. Every operation that surfaces a
/// record's content also refreshes the last-viewed cache, which is what the
/// global chord copies.
pub struct PromptService {
    config: Config,
    store: PromptStore,
}

impl PromptService {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let store = PromptStore::open(&config)?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &PromptStore {
        &self.store
    }

    pub fn search(&self, scope: &SearchScope, keyword: &str) -> Vec<(String, Prompt)> {
        search::search(&self.store.load_all(), scope, keyword)
    }

    pub fn load_prompt(&self, id: &str) -> Result<Prompt, ServiceError> {
        let prompt = self.store.read(id)?;
        self.refresh_cache(&prompt.content);
        Ok(prompt)
    }

    pub fn save_prompt(&self, id: &str, prompt: &Prompt) -> Result<(), ServiceError> {
        self.store.write(id, prompt)?;
        self.refresh_cache(&prompt.content);
        Ok(())
    }

    pub fn create_prompt(&self, prompt: &Prompt) -> Result<String, ServiceError> {
        let id = self.store.create(&prompt.name, prompt)?;
        self.refresh_cache(&prompt.content);
        Ok(id)
    }

    pub fn delete_prompt(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete(id)?;
        Ok(())
    }

    pub fn groups(&self) -> Vec<String> {
        self.store.groups()
    }

    pub fn records_in_group(&self, group: &str) -> Vec<String> {
        self.store.records_in_group(group)
    }

    pub fn export(&self, path: &Path) -> Result<usize, ServiceError> {
        Ok(self.store.export(path)?)
    }

    pub fn import(&self, path: &Path) -> Result<usize, ServiceError> {
        Ok(self.store.import(path)?)
    }

    pub fn statistics(&self) -> StoreStatistics {
        self.store.statistics()
    }

    pub fn clear_all_shortcuts(&self) -> usize {
        self.store.clear_all_shortcuts()
    }

    pub fn backup(&self) -> Result<std::path::PathBuf, ServiceError> {
        Ok(self.store.backup()?)
    }

    // Cache refresh is best effort: a failed cache write only degrades the
    // global chord until the next successful one.
    fn refresh_cache(&self, content: &str) {
        if let Err(error) = self.store.cache_content(content) {
            logging::warn(&format!("failed to refresh content cache: {error}"));
        }
    }
}
