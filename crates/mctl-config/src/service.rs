//! Project persistence seam and save orchestration.
//!
//! # Design
//! - `ProjectStore` abstracts the remote configuration service; the console
//!   only ever hands it fully structured documents.
//! - A save converts the editable document first and calls the store only
//!   when every rule parsed.
//! - `FileProjectStore` keeps one pretty-printed JSON file per project.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::defaults::{DatabaseKind, new_project};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    EditableConfig, RuleSite, StaticConfig, StructuredConfig, TransformErrors,
};
use crate::report::{Notice, notices, static_notice};
use crate::transform::{static_to_structured, to_editable, to_structured};
use crate::validate::{ensure_persistable, validate_project_id, validate_project_name};

const PROJECTS_DIR: &str = "projects";
const CLUSTER_DIR: &str = "cluster";
const STATIC_FILE: &str = "static.json";

/// Abstraction over the service that persists project configuration.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// List every stored project, ordered by identifier.
    async fn list_projects(&self) -> ConfigResult<Vec<StructuredConfig>>;
    /// Load a single project.
    async fn load_project(&self, id: &str) -> ConfigResult<StructuredConfig>;
    /// Insert or replace a project.
    async fn save_project(&self, config: &StructuredConfig) -> ConfigResult<()>;
    /// Remove a project.
    async fn delete_project(&self, id: &str) -> ConfigResult<()>;
    /// Load the cluster-level static routing document, if one was saved.
    async fn load_static(&self) -> ConfigResult<Option<StaticConfig<Value>>>;
    /// Replace the cluster-level static routing document.
    async fn save_static(&self, config: &StaticConfig<Value>) -> ConfigResult<()>;
}

/// Result of a save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Every rule parsed and the document was persisted.
    Saved,
    /// At least one rule failed to parse; nothing was persisted.
    Rejected {
        /// Labels of every rejected rule.
        errors: TransformErrors,
        /// Notices to show the user, one per category.
        notices: Vec<Notice>,
    },
}

impl SaveOutcome {
    /// Whether the document reached the store.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Validate an editable project and persist it when every rule parses.
///
/// # Errors
///
/// Returns an error only when the store itself fails or the project metadata
/// is invalid; rejected rules are reported through [`SaveOutcome::Rejected`].
#[instrument(name = "config.save_project", skip_all, fields(project = %config.id()))]
pub async fn save_project<S>(store: &S, config: &EditableConfig) -> ConfigResult<SaveOutcome>
where
    S: ProjectStore + ?Sized,
{
    let result = to_structured(config);
    if !result.acknowledged {
        warn!(
            rejected = result.errors.len(),
            "save aborted: project has invalid rules"
        );
        let notices = notices(&result.errors);
        return Ok(SaveOutcome::Rejected {
            errors: result.errors,
            notices,
        });
    }
    store.save_project(&result.config).await?;
    info!("project saved");
    Ok(SaveOutcome::Saved)
}

/// Validate an editable static document and persist it when every route parses.
///
/// # Errors
///
/// Returns an error when the store fails.
#[instrument(name = "config.save_static", skip_all)]
pub async fn save_static<S>(store: &S, config: &StaticConfig<String>) -> ConfigResult<SaveOutcome>
where
    S: ProjectStore + ?Sized,
{
    let result = static_to_structured(config);
    if !result.acknowledged {
        warn!(
            rejected = result.errors.len(),
            "save aborted: static config has invalid routes"
        );
        let notice = static_notice(&result.errors);
        return Ok(SaveOutcome::Rejected {
            errors: TransformErrors {
                static_routes: result.errors,
                ..TransformErrors::default()
            },
            notices: vec![notice],
        });
    }
    store.save_static(&result.config).await?;
    info!(routes = result.config.routes.len(), "static config saved");
    Ok(SaveOutcome::Saved)
}

/// Create a project from the default template and persist it.
///
/// # Errors
///
/// Returns an error when the name is blank or the store fails.
#[instrument(name = "config.create_project", skip(store))]
pub async fn create_project<S>(
    store: &S,
    name: &str,
    kind: DatabaseKind,
) -> ConfigResult<StructuredConfig>
where
    S: ProjectStore + ?Sized,
{
    validate_project_name(name)?;
    let project = new_project(name.trim(), kind);
    ensure_persistable(&project)?;
    store.save_project(&project).await?;
    info!(project = %project.id(), "project created");
    Ok(project)
}

/// Working copy of a project being edited, plus the last saved snapshot.
#[derive(Debug, Clone)]
pub struct ProjectEditor {
    config: EditableConfig,
    saved: EditableConfig,
}

impl ProjectEditor {
    /// Start editing a structured project.
    #[must_use]
    pub fn new(config: &StructuredConfig) -> Self {
        let editable = to_editable(config);
        Self {
            saved: editable.clone(),
            config: editable,
        }
    }

    /// Load a project from the store and start editing it.
    ///
    /// # Errors
    ///
    /// Returns an error when the project cannot be loaded.
    pub async fn open<S>(store: &S, id: &str) -> ConfigResult<Self>
    where
        S: ProjectStore + ?Sized,
    {
        let config = store.load_project(id).await?;
        Ok(Self::new(&config))
    }

    /// Current working copy.
    #[must_use]
    pub const fn config(&self) -> &EditableConfig {
        &self.config
    }

    /// Mutable access to the working copy.
    pub const fn config_mut(&mut self) -> &mut EditableConfig {
        &mut self.config
    }

    /// Replace the text of the rule at `site`. Returns `false` when the
    /// working copy has no rule there.
    pub fn set_rule(&mut self, site: &RuleSite, text: impl Into<String>) -> bool {
        match self.config.rule_mut(site) {
            Some(rule) => {
                *rule = text.into();
                true
            }
            None => {
                debug!(site = %site.path(), "no rule at site");
                false
            }
        }
    }

    /// Whether the working copy differs from the last saved snapshot.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.config != self.saved
    }

    /// Drop edits and return to the last saved snapshot.
    pub fn discard_changes(&mut self) {
        self.config = self.saved.clone();
    }

    /// Save the working copy. The store is only called when every rule parses.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fails.
    pub async fn save<S>(&mut self, store: &S) -> ConfigResult<SaveOutcome>
    where
        S: ProjectStore + ?Sized,
    {
        let outcome = save_project(store, &self.config).await?;
        if outcome.is_saved() {
            self.saved = self.config.clone();
        }
        Ok(outcome)
    }
}

/// Store keeping projects as JSON files under a root directory.
///
/// Layout: `projects/<id>.json` and `cluster/static.json`.
#[derive(Debug, Clone)]
pub struct FileProjectStore {
    root: PathBuf,
}

impl FileProjectStore {
    /// Create a store rooted at `root`. Directories are created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn project_path(&self, id: &str) -> ConfigResult<PathBuf> {
        validate_project_id(id)?;
        Ok(self.root.join(PROJECTS_DIR).join(format!("{id}.json")))
    }

    fn static_path(&self) -> PathBuf {
        self.root.join(CLUSTER_DIR).join(STATIC_FILE)
    }
}

#[async_trait]
impl ProjectStore for FileProjectStore {
    #[instrument(name = "file_store.list_projects", skip(self))]
    async fn list_projects(&self) -> ConfigResult<Vec<StructuredConfig>> {
        let dir = self.root.join(PROJECTS_DIR);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "file_store.list_projects.read_dir",
                    path: dir,
                    source,
                });
            }
        };

        let mut projects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| ConfigError::Io {
                operation: "file_store.list_projects.next_entry",
                path: dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let project: StructuredConfig =
                read_json(&path, "file_store.list_projects.read").await?;
            projects.push(project);
        }
        projects.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(projects)
    }

    #[instrument(name = "file_store.load_project", skip(self))]
    async fn load_project(&self, id: &str) -> ConfigResult<StructuredConfig> {
        let path = self.project_path(id)?;
        match fs::try_exists(&path).await {
            Ok(true) => read_json(&path, "file_store.load_project.read").await,
            Ok(false) => Err(ConfigError::ProjectNotFound { id: id.to_string() }),
            Err(source) => Err(ConfigError::Io {
                operation: "file_store.load_project.exists",
                path,
                source,
            }),
        }
    }

    #[instrument(name = "file_store.save_project", skip_all, fields(project = %config.id()))]
    async fn save_project(&self, config: &StructuredConfig) -> ConfigResult<()> {
        ensure_persistable(config)?;
        let path = self.project_path(config.id())?;
        write_json(&path, config, "file_store.save_project").await
    }

    #[instrument(name = "file_store.delete_project", skip(self))]
    async fn delete_project(&self, id: &str) -> ConfigResult<()> {
        let path = self.project_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(ConfigError::ProjectNotFound { id: id.to_string() })
            }
            Err(source) => Err(ConfigError::Io {
                operation: "file_store.delete_project.remove",
                path,
                source,
            }),
        }
    }

    #[instrument(name = "file_store.load_static", skip(self))]
    async fn load_static(&self) -> ConfigResult<Option<StaticConfig<Value>>> {
        let path = self.static_path();
        match fs::try_exists(&path).await {
            Ok(true) => read_json(&path, "file_store.load_static.read")
                .await
                .map(Some),
            Ok(false) => Ok(None),
            Err(source) => Err(ConfigError::Io {
                operation: "file_store.load_static.exists",
                path,
                source,
            }),
        }
    }

    #[instrument(name = "file_store.save_static", skip_all)]
    async fn save_static(&self, config: &StaticConfig<Value>) -> ConfigResult<()> {
        write_json(&self.static_path(), config, "file_store.save_static").await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path, operation: &'static str) -> ConfigResult<T> {
    let bytes = fs::read(path).await.map_err(|source| ConfigError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
        operation,
        path: path.to_path_buf(),
        source,
    })
}

async fn write_json<T: Serialize + Sync>(
    path: &Path,
    value: &T,
    operation: &'static str,
) -> ConfigResult<()> {
    let payload = serde_json::to_vec_pretty(value).map_err(|source| ConfigError::Json {
        operation,
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::Io {
                operation,
                path: parent.to_path_buf(),
                source,
            })?;
    }
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload)
        .await
        .map_err(|source| ConfigError::Io {
            operation,
            path: staging.clone(),
            source,
        })?;
    fs::rename(&staging, path)
        .await
        .map_err(|source| ConfigError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        })
}
