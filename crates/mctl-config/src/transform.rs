//! Conversion between structured (persisted) and textual (editable) rules.
//!
//! # Design
//! - A single walk over the four rule-bearing sites drives both directions;
//!   each call builds a fresh document from its borrowed input.
//! - Parse failures are data: the walk folds rejected sites into
//!   [`TransformErrors`] and never aborts early.
//! - A rejected rule keeps its text, as a JSON string, at its original key or
//!   position so sequence indices never shift.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::model::{
    CrudDatabase, EditableConfig, FileStoreModule, FunctionsModule, Modules, ProjectConfig,
    RuleSite, StaticConfig, StaticModule, StaticTransformResult, StructuredConfig,
    TransformErrors, TransformResult,
};

/// Pretty-print a rule with two-space indentation.
#[must_use]
pub fn print_rule(rule: &Value) -> String {
    serde_json::to_string_pretty(rule).unwrap_or_else(|_| rule.to_string())
}

/// Parse rule text back into a JSON value.
///
/// # Errors
///
/// Returns the underlying `serde_json` error when `text` is not valid JSON.
pub fn parse_rule(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Replace every rule in a structured project with its pretty-printed text.
#[must_use]
pub fn to_editable(config: &StructuredConfig) -> EditableConfig {
    let (editable, rejected) = walk(config, &|_: &RuleSite, rule: &Value| {
        Converted::Accepted(print_rule(rule))
    });
    debug_assert!(rejected.is_empty());
    editable
}

/// Parse every rule of an editable project back into structured form.
///
/// Every site is visited; the result lists all rejected rules at once.
#[must_use]
#[instrument(name = "transform.to_structured", skip_all, fields(project = %config.id()))]
pub fn to_structured(config: &EditableConfig) -> TransformResult {
    let (structured, rejected) = walk(config, &parse_at_site);
    let errors = rejected
        .iter()
        .fold(TransformErrors::default(), |mut errors, site| {
            errors.record(site);
            errors
        });
    if !errors.is_empty() {
        debug!(rejected = errors.len(), "editable project has invalid rules");
    }
    TransformResult {
        acknowledged: errors.is_empty(),
        config: structured,
        errors,
    }
}

/// Convert a cluster-level static document to editable form.
///
/// A missing document yields an empty route list.
#[must_use]
pub fn static_to_editable(config: Option<&StaticConfig<Value>>) -> StaticConfig<String> {
    config.map_or_else(StaticConfig::default, |config| StaticConfig {
        routes: config.routes.iter().map(print_rule).collect(),
        extra: config.extra.clone(),
    })
}

/// Parse every route of an editable cluster-level static document.
#[must_use]
pub fn static_to_structured(config: &StaticConfig<String>) -> StaticTransformResult {
    let (routes, rejected) = indexed(
        Some(config.routes.as_slice()),
        |index| RuleSite::StaticRoute { index },
        &parse_at_site,
    );
    let errors: Vec<String> = rejected.iter().map(RuleSite::label).collect();
    StaticTransformResult {
        acknowledged: errors.is_empty(),
        config: StaticConfig {
            routes: routes.unwrap_or_default(),
            extra: config.extra.clone(),
        },
        errors,
    }
}

/// Every rule site present in `config`, in document order.
#[must_use]
pub fn rule_sites<R>(config: &ProjectConfig<R>) -> Vec<RuleSite> {
    let Some(modules) = &config.modules else {
        return Vec::new();
    };
    let mut sites = Vec::new();
    if let Some(crud) = &modules.crud {
        for (db, database) in crud {
            for name in database.collections.iter().flat_map(BTreeMap::keys) {
                sites.push(RuleSite::Collection {
                    db: db.clone(),
                    name: name.clone(),
                });
            }
        }
    }
    if let Some(services) = modules.functions.as_ref().and_then(|f| f.services.as_ref()) {
        sites.extend(
            services
                .keys()
                .map(|name| RuleSite::Service { name: name.clone() }),
        );
    }
    if let Some(rules) = modules.file_store.as_ref().and_then(|f| f.rules.as_ref()) {
        sites.extend((0..rules.len()).map(|index| RuleSite::FileRule { index }));
    }
    if let Some(routes) = modules.static_routes.as_ref().and_then(|s| s.routes.as_ref()) {
        sites.extend((0..routes.len()).map(|index| RuleSite::StaticRoute { index }));
    }
    sites
}

/// Value produced for one rule, tagged with whether conversion succeeded.
enum Converted<B> {
    Accepted(B),
    Rejected(B),
}

impl<B> Converted<B> {
    fn into_parts(self) -> (B, bool) {
        match self {
            Self::Accepted(value) => (value, true),
            Self::Rejected(value) => (value, false),
        }
    }
}

type Walked<T> = (T, Vec<RuleSite>);

#[allow(clippy::ptr_arg)]
fn parse_at_site(site: &RuleSite, text: &String) -> Converted<Value> {
    match parse_rule(text) {
        Ok(value) => Converted::Accepted(value),
        Err(err) => {
            debug!(site = %site.path(), error = %err, "rule text is not valid JSON");
            Converted::Rejected(Value::String(text.clone()))
        }
    }
}

fn walk<A, B>(
    config: &ProjectConfig<A>,
    convert: &impl Fn(&RuleSite, &A) -> Converted<B>,
) -> Walked<ProjectConfig<B>> {
    let (modules, rejected) = match &config.modules {
        Some(modules) => {
            let (modules, rejected) = walk_modules(modules, convert);
            (Some(modules), rejected)
        }
        None => (None, Vec::new()),
    };
    let project = ProjectConfig {
        id: config.id.clone(),
        name: config.name.clone(),
        secret: config.secret.clone(),
        modules,
        extra: config.extra.clone(),
    };
    (project, rejected)
}

fn walk_modules<A, B>(
    modules: &Modules<A>,
    convert: &impl Fn(&RuleSite, &A) -> Converted<B>,
) -> Walked<Modules<B>> {
    let (crud, crud_rejected) = match &modules.crud {
        Some(databases) => {
            let (databases, rejected) = walk_crud(databases, convert);
            (Some(databases), rejected)
        }
        None => (None, Vec::new()),
    };

    let (functions, functions_rejected) = match &modules.functions {
        Some(functions) => {
            let (services, rejected) = keyed(
                functions.services.as_ref(),
                |name| RuleSite::Service {
                    name: name.to_string(),
                },
                convert,
            );
            let module = FunctionsModule {
                enabled: functions.enabled,
                broker: functions.broker.clone(),
                conn: functions.conn.clone(),
                services,
                extra: functions.extra.clone(),
            };
            (Some(module), rejected)
        }
        None => (None, Vec::new()),
    };

    let (file_store, file_rejected) = match &modules.file_store {
        Some(store) => {
            let (rules, rejected) = indexed(
                store.rules.as_deref(),
                |index| RuleSite::FileRule { index },
                convert,
            );
            let module = FileStoreModule {
                enabled: store.enabled,
                store_type: store.store_type.clone(),
                conn: store.conn.clone(),
                rules,
                extra: store.extra.clone(),
            };
            (Some(module), rejected)
        }
        None => (None, Vec::new()),
    };

    let (static_routes, static_rejected) = match &modules.static_routes {
        Some(hosting) => {
            let (routes, rejected) = indexed(
                hosting.routes.as_deref(),
                |index| RuleSite::StaticRoute { index },
                convert,
            );
            let module = StaticModule {
                enabled: hosting.enabled,
                routes,
                extra: hosting.extra.clone(),
            };
            (Some(module), rejected)
        }
        None => (None, Vec::new()),
    };

    let rejected = [
        crud_rejected,
        functions_rejected,
        file_rejected,
        static_rejected,
    ]
    .concat();
    let modules = Modules {
        crud,
        functions,
        file_store,
        static_routes,
        other: modules.other.clone(),
    };
    (modules, rejected)
}

fn walk_crud<A, B>(
    databases: &BTreeMap<String, CrudDatabase<A>>,
    convert: &impl Fn(&RuleSite, &A) -> Converted<B>,
) -> Walked<BTreeMap<String, CrudDatabase<B>>> {
    databases.iter().fold(
        (BTreeMap::new(), Vec::new()),
        |(mut out, mut rejected), (db, database)| {
            let (collections, failed) = keyed(
                database.collections.as_ref(),
                |name| RuleSite::Collection {
                    db: db.clone(),
                    name: name.to_string(),
                },
                convert,
            );
            rejected.extend(failed);
            out.insert(
                db.clone(),
                CrudDatabase {
                    enabled: database.enabled,
                    conn: database.conn.clone(),
                    collections,
                    extra: database.extra.clone(),
                },
            );
            (out, rejected)
        },
    )
}

fn keyed<A, B>(
    rules: Option<&BTreeMap<String, A>>,
    site_for: impl Fn(&str) -> RuleSite,
    convert: &impl Fn(&RuleSite, &A) -> Converted<B>,
) -> Walked<Option<BTreeMap<String, B>>> {
    let Some(rules) = rules else {
        return (None, Vec::new());
    };
    let (out, rejected) = rules.iter().fold(
        (BTreeMap::new(), Vec::new()),
        |(mut out, mut rejected), (key, rule)| {
            let site = site_for(key.as_str());
            let (value, accepted) = convert(&site, rule).into_parts();
            if !accepted {
                rejected.push(site);
            }
            out.insert(key.clone(), value);
            (out, rejected)
        },
    );
    (Some(out), rejected)
}

fn indexed<A, B>(
    rules: Option<&[A]>,
    site_for: impl Fn(usize) -> RuleSite,
    convert: &impl Fn(&RuleSite, &A) -> Converted<B>,
) -> Walked<Option<Vec<B>>> {
    let Some(rules) = rules else {
        return (None, Vec::new());
    };
    let (out, rejected) = rules.iter().enumerate().fold(
        (Vec::with_capacity(rules.len()), Vec::new()),
        |(mut out, mut rejected), (index, rule)| {
            let site = site_for(index);
            let (value, accepted) = convert(&site, rule).into_parts();
            if !accepted {
                rejected.push(site);
            }
            out.push(value);
            (out, rejected)
        },
    );
    (Some(out), rejected)
}
