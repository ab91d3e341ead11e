use mctl_config::{
    EditableConfig, SaveOutcome, StructuredConfig, notices, save_project, to_editable,
    to_structured,
};
use tracing::info;

use crate::cli::{EditArgs, FileArgs};
use crate::commands::projects::map_config_error;
use crate::context::{AppContext, CliError, CliResult, read_document, write_document};
use crate::output::{render_check, render_json};

pub(crate) fn handle_edit(args: &EditArgs) -> CliResult<()> {
    let project: StructuredConfig = read_document(&args.input)?;
    let editable = to_editable(&project);
    match &args.destination {
        Some(path) => {
            write_document(path, &editable)?;
            info!(path = %path.display(), "editable project written");
            Ok(())
        }
        None => render_json(&editable),
    }
}

pub(crate) fn handle_check(ctx: &AppContext, args: &FileArgs) -> CliResult<()> {
    let editable: EditableConfig = read_document(&args.input)?;
    let result = to_structured(&editable);
    if !result.acknowledged {
        return Err(CliError::rejected(&notices(&result.errors)));
    }
    render_check(&result, ctx.output)
}

pub(crate) async fn handle_save(ctx: &AppContext, args: &FileArgs) -> CliResult<()> {
    let editable: EditableConfig = read_document(&args.input)?;
    match save_project(&ctx.store, &editable)
        .await
        .map_err(map_config_error)?
    {
        SaveOutcome::Saved => {
            println!("Project {} saved.", editable.id());
            Ok(())
        }
        SaveOutcome::Rejected { notices, .. } => Err(CliError::rejected(&notices)),
    }
}
