//! Typed project configuration documents.
//!
//! # Design
//! - One document type, generic over the rule representation, so the
//!   structured (persisted) and textual (editable) phases are distinct types.
//! - Keys outside the rule-bearing sections are carried through verbatim so
//!   the persisted shape survives a round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Project configuration whose rules are native JSON values, as persisted.
pub type StructuredConfig = ProjectConfig<Value>;
/// Project configuration whose rules are pretty-printed JSON text, as edited.
pub type EditableConfig = ProjectConfig<String>;

/// Root project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig<R> {
    /// Unique project identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Project secret used to sign tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Per-module configuration; absent when the project has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Modules<R>>,
    /// Top-level keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<R> ProjectConfig<R> {
    /// Project identifier, empty when the document has none.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Project name, empty when the document has none.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Rule stored at `site`, if the document has one there.
    #[must_use]
    pub fn rule(&self, site: &RuleSite) -> Option<&R> {
        let modules = self.modules.as_ref()?;
        match site {
            RuleSite::Collection { db, name } => modules
                .crud
                .as_ref()?
                .get(db)?
                .collections
                .as_ref()?
                .get(name),
            RuleSite::Service { name } => modules.functions.as_ref()?.services.as_ref()?.get(name),
            RuleSite::FileRule { index } => modules.file_store.as_ref()?.rules.as_ref()?.get(*index),
            RuleSite::StaticRoute { index } => modules
                .static_routes
                .as_ref()?
                .routes
                .as_ref()?
                .get(*index),
        }
    }

    /// Mutable access to the rule stored at `site`.
    pub fn rule_mut(&mut self, site: &RuleSite) -> Option<&mut R> {
        let modules = self.modules.as_mut()?;
        match site {
            RuleSite::Collection { db, name } => modules
                .crud
                .as_mut()?
                .get_mut(db)?
                .collections
                .as_mut()?
                .get_mut(name),
            RuleSite::Service { name } => modules
                .functions
                .as_mut()?
                .services
                .as_mut()?
                .get_mut(name),
            RuleSite::FileRule { index } => modules
                .file_store
                .as_mut()?
                .rules
                .as_mut()?
                .get_mut(*index),
            RuleSite::StaticRoute { index } => modules
                .static_routes
                .as_mut()?
                .routes
                .as_mut()?
                .get_mut(*index),
        }
    }
}

/// Module sections of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modules<R> {
    /// Database access rules keyed by database identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crud: Option<BTreeMap<String, CrudDatabase<R>>>,
    /// Function routing rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<FunctionsModule<R>>,
    /// File storage rules.
    #[serde(
        rename = "fileStore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub file_store: Option<FileStoreModule<R>>,
    /// Static hosting and proxy routes.
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub static_routes: Option<StaticModule<R>>,
    /// Modules without rule-bearing fields (`auth`, `realtime`, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Database-level configuration within the `crud` module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudDatabase<R> {
    /// Whether the database is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Connection string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn: Option<String>,
    /// Collection rules keyed by collection name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<BTreeMap<String, R>>,
    /// Additional database keys (`isPrimary`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Functions module configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionsModule<R> {
    /// Whether the module is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Broker implementation (`nats`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    /// Broker connection string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn: Option<String>,
    /// Service rules keyed by service name. Older documents call this `rules`.
    #[serde(default, alias = "rules", skip_serializing_if = "Option::is_none")]
    pub services: Option<BTreeMap<String, R>>,
    /// Additional module keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// File storage module configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStoreModule<R> {
    /// Whether the module is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Storage backend (`local`, `amazon-s3`, ...).
    #[serde(
        rename = "storeType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub store_type: Option<String>,
    /// Backend connection string or root path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn: Option<String>,
    /// Ordered storage rules; positions are addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<R>>,
    /// Additional module keys (`endpoint`, `bucket`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Static module configuration embedded in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticModule<R> {
    /// Whether the module is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Ordered routes; positions are addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<R>>,
    /// Additional module keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cluster-level static routing document, stored apart from projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticConfig<R> {
    /// Ordered routes; positions are addresses.
    #[serde(default)]
    pub routes: Vec<R>,
    /// Additional keys (`internalRoutes`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<R> Default for StaticConfig<R> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Location of a single rule inside a project document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleSite {
    /// Collection rule under `modules.crud.<db>.collections.<name>`.
    Collection {
        /// Database identifier.
        db: String,
        /// Collection name.
        name: String,
    },
    /// Service rule under `modules.functions.services.<name>`.
    Service {
        /// Service name.
        name: String,
    },
    /// Rule at `modules.fileStore.rules[index]`.
    FileRule {
        /// Zero-based position.
        index: usize,
    },
    /// Route at `modules.static.routes[index]`.
    StaticRoute {
        /// Zero-based position.
        index: usize,
    },
}

impl RuleSite {
    /// Label shown to users when the rule at this site is rejected.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Collection { name, .. } | Self::Service { name } => name.clone(),
            Self::FileRule { index } | Self::StaticRoute { index } => sequence_label(*index),
        }
    }

    /// Dotted document path of the site, for logs.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Collection { db, name } => format!("modules.crud.{db}.collections.{name}"),
            Self::Service { name } => format!("modules.functions.services.{name}"),
            Self::FileRule { index } => format!("modules.fileStore.rules[{index}]"),
            Self::StaticRoute { index } => format!("modules.static.routes[{index}]"),
        }
    }
}

/// Label for the rule at a zero-based sequence position (`Rule 1`, `Rule 2`, ...).
#[must_use]
pub fn sequence_label(index: usize) -> String {
    format!("Rule {}", index + 1)
}

/// Per-category labels of rules whose text failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformErrors {
    /// Rejected collection names grouped by database identifier.
    pub crud: BTreeMap<String, Vec<String>>,
    /// Rejected service names.
    pub functions: Vec<String>,
    /// Rejected file storage rules, labelled `Rule N`.
    #[serde(rename = "fileStore")]
    pub file_store: Vec<String>,
    /// Rejected static routes, labelled `Rule N`.
    #[serde(rename = "static")]
    pub static_routes: Vec<String>,
}

impl TransformErrors {
    /// Whether no rule was rejected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crud.values().all(Vec::is_empty)
            && self.functions.is_empty()
            && self.file_store.is_empty()
            && self.static_routes.is_empty()
    }

    /// Total number of rejected rules across every category.
    #[must_use]
    pub fn len(&self) -> usize {
        self.crud.values().map(Vec::len).sum::<usize>()
            + self.functions.len()
            + self.file_store.len()
            + self.static_routes.len()
    }

    /// Record a rejected rule under the bucket matching its site.
    pub fn record(&mut self, site: &RuleSite) {
        let label = site.label();
        match site {
            RuleSite::Collection { db, .. } => {
                self.crud.entry(db.clone()).or_default().push(label);
            }
            RuleSite::Service { .. } => self.functions.push(label),
            RuleSite::FileRule { .. } => self.file_store.push(label),
            RuleSite::StaticRoute { .. } => self.static_routes.push(label),
        }
    }
}

/// Outcome of converting an editable project back to its structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    /// `true` when every rule parsed and `config` is safe to persist.
    pub acknowledged: bool,
    /// Converted document; rejected rules keep their text as a JSON string.
    pub config: StructuredConfig,
    /// Labels of every rejected rule.
    pub errors: TransformErrors,
}

/// Outcome of converting an editable static document back to structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTransformResult {
    /// `true` when every route parsed.
    pub acknowledged: bool,
    /// Converted document; rejected routes keep their text as a JSON string.
    pub config: StaticConfig<Value>,
    /// Labels (`Rule N`) of rejected routes.
    pub errors: Vec<String>,
}
