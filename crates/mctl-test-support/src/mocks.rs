//! In-memory project store that records every write.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mctl_config::{ConfigError, ConfigResult, ProjectStore, StaticConfig, StructuredConfig};
use serde_json::Value;

#[derive(Debug, Default)]
struct State {
    projects: BTreeMap<String, StructuredConfig>,
    static_config: Option<StaticConfig<Value>>,
    writes: usize,
}

/// Project store backed by a map; counts writes so tests can assert that
/// rejected saves never reach persistence.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    state: Mutex<State>,
}

impl MemoryProjectStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `projects`. Seeding does not count as a write.
    #[must_use]
    pub fn with_projects(projects: impl IntoIterator<Item = StructuredConfig>) -> Self {
        let store = Self::new();
        store.lock().projects = projects
            .into_iter()
            .map(|project| (project.id().to_string(), project))
            .collect();
        store
    }

    /// Number of project or static writes performed.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Snapshot of a stored project.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<StructuredConfig> {
        self.lock().projects.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn list_projects(&self) -> ConfigResult<Vec<StructuredConfig>> {
        Ok(self.lock().projects.values().cloned().collect())
    }

    async fn load_project(&self, id: &str) -> ConfigResult<StructuredConfig> {
        self.project(id)
            .ok_or_else(|| ConfigError::ProjectNotFound { id: id.to_string() })
    }

    async fn save_project(&self, config: &StructuredConfig) -> ConfigResult<()> {
        let mut state = self.lock();
        state.projects.insert(config.id().to_string(), config.clone());
        state.writes += 1;
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> ConfigResult<()> {
        self.lock()
            .projects
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ConfigError::ProjectNotFound { id: id.to_string() })
    }

    async fn load_static(&self) -> ConfigResult<Option<StaticConfig<Value>>> {
        Ok(self.lock().static_config.clone())
    }

    async fn save_static(&self, config: &StaticConfig<Value>) -> ConfigResult<()> {
        let mut state = self.lock();
        state.static_config = Some(config.clone());
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_is_not_a_write() {
        let project = crate::fixtures::sample_project();
        let store = MemoryProjectStore::with_projects([project]);
        assert_eq!(store.writes(), 0);
        assert!(store.project("todo-app").is_some());
    }
}
