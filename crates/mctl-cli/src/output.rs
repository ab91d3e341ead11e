//! Output renderers and formatting helpers for CLI commands.

use mctl_config::{ProjectConfig, StaticConfig, TransformResult, rule_sites};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::context::{CliResult, to_pretty_json};

pub(crate) fn render_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", to_pretty_json(value)?);
    Ok(())
}

pub(crate) fn render_project_list<R: Serialize>(
    projects: &[ProjectConfig<R>],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(&projects)?,
        OutputFormat::Table => {
            println!("{:<32} {:>6} NAME", "ID", "RULES");
            for project in projects {
                println!(
                    "{:<32} {:>6} {}",
                    project.id(),
                    rule_sites(project).len(),
                    project.name()
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_project<R: Serialize>(
    project: &ProjectConfig<R>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(project)?,
        OutputFormat::Table => {
            for line in project_summary(project) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_check(result: &TransformResult, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(&result.errors)?,
        OutputFormat::Table => {
            println!(
                "{}: {} rules parsed",
                result.config.id(),
                rule_sites(&result.config).len()
            );
        }
    }
    Ok(())
}

pub(crate) fn render_static<R: Serialize>(
    config: &StaticConfig<R>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(config)?,
        OutputFormat::Table => println!("routes: {}", config.routes.len()),
    }
    Ok(())
}

#[must_use]
pub(crate) fn project_summary<R>(project: &ProjectConfig<R>) -> Vec<String> {
    let mut lines = vec![
        format!("id: {}", project.id()),
        format!("name: {}", project.name()),
    ];
    let Some(modules) = &project.modules else {
        lines.push("modules: none".to_string());
        return lines;
    };
    if let Some(crud) = &modules.crud {
        for (db, database) in crud {
            let collections = database.collections.as_ref().map_or(0, |c| c.len());
            lines.push(format!(
                "crud {db}: {} ({collections} collections)",
                enabled_label(database.enabled)
            ));
        }
    }
    if let Some(functions) = &modules.functions {
        let services = functions.services.as_ref().map_or(0, |s| s.len());
        lines.push(format!(
            "functions: {} via {} ({services} services)",
            enabled_label(functions.enabled),
            functions.broker.as_deref().unwrap_or(UNSET)
        ));
    }
    if let Some(store) = &modules.file_store {
        let rules = store.rules.as_ref().map_or(0, Vec::len);
        lines.push(format!(
            "fileStore: {} {} ({rules} rules)",
            enabled_label(store.enabled),
            store.store_type.as_deref().unwrap_or(UNSET)
        ));
    }
    if let Some(hosting) = &modules.static_routes {
        let routes = hosting.routes.as_ref().map_or(0, Vec::len);
        lines.push(format!(
            "static: {} ({routes} routes)",
            enabled_label(hosting.enabled)
        ));
    }
    if !modules.other.is_empty() {
        let names: Vec<&str> = modules.other.keys().map(String::as_str).collect();
        lines.push(format!("other modules: {}", names.join(", ")));
    }
    lines
}

const UNSET: &str = "-";

const fn enabled_label(enabled: Option<bool>) -> &'static str {
    match enabled {
        Some(true) => "enabled",
        Some(false) => "disabled",
        None => UNSET,
    }
}
