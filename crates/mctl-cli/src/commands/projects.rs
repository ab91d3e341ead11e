use mctl_config::{ConfigError, DatabaseKind, ProjectStore, create_project, to_editable};

use crate::cli::{IdArgs, NewArgs, ShowArgs};
use crate::context::{AppContext, CliError, CliResult};
use crate::output::{render_project, render_project_list};

pub(crate) async fn handle_project_new(ctx: &AppContext, args: &NewArgs) -> CliResult<()> {
    let kind: DatabaseKind = args.db.parse().map_err(|_| {
        CliError::validation(format!(
            "unknown database '{}' (expected mongo, postgres, or mysql)",
            args.db
        ))
    })?;
    let project = create_project(&ctx.store, &args.name, kind)
        .await
        .map_err(map_config_error)?;
    println!("Created project {} ({}).", project.id(), project.name());
    Ok(())
}

pub(crate) async fn handle_project_list(ctx: &AppContext) -> CliResult<()> {
    let projects = ctx
        .store
        .list_projects()
        .await
        .map_err(map_config_error)?;
    render_project_list(&projects, ctx.output)
}

pub(crate) async fn handle_project_show(ctx: &AppContext, args: &ShowArgs) -> CliResult<()> {
    let project = ctx
        .store
        .load_project(&args.id)
        .await
        .map_err(map_config_error)?;
    if args.editable {
        render_project(&to_editable(&project), ctx.output)
    } else {
        render_project(&project, ctx.output)
    }
}

pub(crate) async fn handle_project_remove(ctx: &AppContext, args: &IdArgs) -> CliResult<()> {
    ctx.store
        .delete_project(&args.id)
        .await
        .map_err(map_config_error)?;
    println!("Deleted project {}.", args.id);
    Ok(())
}

/// Caller mistakes become validation errors; everything else is a failure.
pub(crate) fn map_config_error(err: ConfigError) -> CliError {
    match err {
        ConfigError::ProjectNotFound { id } => {
            CliError::validation(format!("project '{id}' does not exist"))
        }
        ConfigError::InvalidField {
            field,
            value,
            reason,
            ..
        } => CliError::validation(format!(
            "invalid {field} '{}': {reason}",
            value.unwrap_or_default()
        )),
        ConfigError::InvalidDatabaseKind { value } => {
            CliError::validation(format!("unknown database '{value}'"))
        }
        other => CliError::failure(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_config::FileProjectStore;
    use tempfile::TempDir;

    use crate::cli::OutputFormat;

    fn context(temp: &TempDir) -> AppContext {
        AppContext {
            store: FileProjectStore::new(temp.path()),
            output: OutputFormat::Json,
        }
    }

    #[tokio::test]
    async fn new_list_show_and_remove() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let ctx = context(&temp);
        handle_project_new(
            &ctx,
            &NewArgs {
                name: "Todo App".into(),
                db: "postgres".into(),
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        let projects = ctx.store.list_projects().await?;
        assert_eq!(projects.len(), 1);
        let id = projects[0].id().to_string();
        assert!(id.starts_with("todo-app-"));

        handle_project_list(&ctx)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        handle_project_show(
            &ctx,
            &ShowArgs {
                id: id.clone(),
                editable: true,
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        handle_project_remove(&ctx, &IdArgs { id: id.clone() })
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        let err = handle_project_show(
            &ctx,
            &ShowArgs {
                id: id.clone(),
                editable: false,
            },
        )
        .await
        .expect_err("deleted project should be gone");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), format!("project '{id}' does not exist"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_database_is_a_validation_error() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let err = handle_project_new(
            &context(&temp),
            &NewArgs {
                name: "Todo".into(),
                db: "oracle".into(),
            },
        )
        .await
        .expect_err("oracle is not supported");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[test]
    fn io_errors_map_to_failures() {
        let err = map_config_error(ConfigError::Io {
            operation: "test",
            path: "x".into(),
            source: std::io::Error::other("disk"),
        });
        assert_eq!(err.exit_code(), 3);
    }
}
