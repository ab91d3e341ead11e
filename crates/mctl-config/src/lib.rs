#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Project configuration model and the transform between its persisted
//! (structured) and editable (textual) forms.
//!
//! Layout: `model.rs` (typed documents, rule sites, transform results),
//! `transform.rs` (structured <-> textual conversion), `report.rs`
//! (user-facing notices), `defaults.rs` (new project template),
//! `validate.rs` (metadata checks), `service.rs` (`ProjectStore`, save
//! orchestration, `ProjectEditor`).

pub mod defaults;
pub mod error;
pub mod model;
pub mod report;
pub mod service;
pub mod transform;
pub mod validate;

pub use defaults::{DatabaseKind, new_project, new_project_with_id, project_id_from_name};
pub use error::{ConfigError, ConfigResult};
pub use model::{
    CrudDatabase, EditableConfig, FileStoreModule, FunctionsModule, Modules, ProjectConfig,
    RuleSite, StaticConfig, StaticModule, StaticTransformResult, StructuredConfig,
    TransformErrors, TransformResult,
};
pub use report::{Notice, NoticeCategory, notices};
pub use service::{
    FileProjectStore, ProjectEditor, ProjectStore, SaveOutcome, create_project, save_project,
    save_static,
};
pub use transform::{
    parse_rule, print_rule, rule_sites, static_to_editable, static_to_structured, to_editable,
    to_structured,
};
