//! Locate and status commands - read-only export queries.

use console::style;
use imodel_tiles::export::{locate_export, LocateOutcome};
use imodel_tiles::http::AsyncReqwestClient;

use super::common::{
    export_client, print_record, print_target, until_cancelled, ApiArgs, TargetArgs,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the locate command. Never creates an export.
pub fn run_locate(target: TargetArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("locate");

    let settings = target.resolve(runner.config())?;
    print_target(&settings);

    let cancel = runner.cancel_token();
    let outcome = runner.block_on(async {
        let client = export_client(&settings.api, AsyncReqwestClient::new()?).await?;
        let policy = settings.variant.locate_policy();
        Ok::<_, CliError>(locate_export(&client, &settings.export_request(), policy, &cancel).await)
    })?;

    match outcome {
        LocateOutcome::Found(record) => print_record(&record),
        LocateOutcome::NotFound => println!(
            "{} for {} ({})",
            style("No usable export").yellow(),
            settings.imodel_id,
            settings.variant.export_type()
        ),
        LocateOutcome::Failed(e) => return Err(e.into()),
    }
    Ok(())
}

/// Run the status command for one export id.
pub fn run_status(export_id: String, api: ApiArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("status");

    let api = api.resolve(runner.config())?;
    let cancel = runner.cancel_token();
    let record = runner.block_on(async {
        let client = export_client(&api, AsyncReqwestClient::new()?).await?;
        until_cancelled(&cancel, client.get_export(&export_id)).await
    })?;

    print_record(&record);
    Ok(())
}
