use mctl_config::{ProjectStore, SaveOutcome, StaticConfig, save_static, static_to_editable};

use crate::cli::{FileArgs, StaticShowArgs};
use crate::commands::projects::map_config_error;
use crate::context::{AppContext, CliError, CliResult, read_document};
use crate::output::render_static;

pub(crate) async fn handle_static_show(ctx: &AppContext, args: &StaticShowArgs) -> CliResult<()> {
    let stored = ctx.store.load_static().await.map_err(map_config_error)?;
    if args.editable {
        render_static(&static_to_editable(stored.as_ref()), ctx.output)
    } else {
        render_static(&stored.unwrap_or_default(), ctx.output)
    }
}

pub(crate) async fn handle_static_save(ctx: &AppContext, args: &FileArgs) -> CliResult<()> {
    let editable: StaticConfig<String> = read_document(&args.input)?;
    match save_static(&ctx.store, &editable)
        .await
        .map_err(map_config_error)?
    {
        SaveOutcome::Saved => {
            println!("Static config saved ({} routes).", editable.routes.len());
            Ok(())
        }
        SaveOutcome::Rejected { notices, .. } => Err(CliError::rejected(&notices)),
    }
}
