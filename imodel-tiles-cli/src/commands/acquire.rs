//! Acquire and view commands.
//!
//! `acquire` runs the full export acquisition and prints the tileset URL.
//! `view` then loads the tileset headlessly and prints the placement a
//! Y-up renderer applies to it.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use imodel_tiles::config::ViewerSettings;
use imodel_tiles::export::{Acquisition, ExportAcquisition, ExportStatus};
use imodel_tiles::http::AsyncReqwestClient;
use imodel_tiles::viewer::{show_tileset, HeadlessViewer, LoadedTileset, ViewFit};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use super::common::{export_client, print_target, until_cancelled, TargetArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the view command.
pub struct ViewArgs {
    pub target: TargetArgs,
    pub list_content: bool,
}

/// Run the acquire command.
pub fn run_acquire(target: TargetArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("acquire");

    let settings = target.resolve(runner.config())?;
    print_target(&settings);

    let http_client = AsyncReqwestClient::new()?;
    let acquisition = runner.block_on(acquire(&settings, http_client, runner.cancel_token()))?;
    print_acquisition(&acquisition);
    Ok(())
}

/// Run the view command.
pub fn run_view(args: ViewArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("view");

    let settings = args.target.resolve(runner.config())?;
    print_target(&settings);

    let http_client = AsyncReqwestClient::new()?;
    let cancel = runner.cancel_token();
    let (loaded, fit) = runner.block_on(async {
        let acquisition = acquire(&settings, http_client.clone(), cancel.clone()).await?;
        print_acquisition(&acquisition);

        let viewer = HeadlessViewer::new(http_client);
        until_cancelled(&cancel, show_tileset(&viewer, &acquisition.tileset_url)).await
    })?;

    print_view(&loaded, &fit);
    if args.list_content {
        println!();
        println!("{}", style("Content").bold());
        for url in loaded.content_urls().map_err(imodel_tiles::viewer::ViewerError::from)? {
            println!("  {}", url);
        }
    }
    Ok(())
}

async fn acquire(
    settings: &ViewerSettings,
    http_client: AsyncReqwestClient,
    cancel: CancellationToken,
) -> Result<Acquisition, CliError> {
    let client = export_client(&settings.api, http_client).await?;

    let spinner = spinner("Looking for an existing export...");
    let observer = spinner.clone();
    let acquisition = ExportAcquisition::new(client, settings.variant, settings.poll)
        .with_status_observer(Arc::new(move |status: &ExportStatus, elapsed: Duration| {
            observer.set_message(format!(
                "Export {} ({}s elapsed)",
                status,
                elapsed.as_secs()
            ));
        }));

    let result = acquisition
        .acquire(&settings.export_request(), &cancel)
        .await;
    spinner.finish_and_clear();
    Ok(result?)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_acquisition(acquisition: &Acquisition) {
    let source = if acquisition.created {
        "new export"
    } else {
        "existing export"
    };
    println!(
        "{} {} ({}, {})",
        style("Export:").bold(),
        acquisition.record.id,
        acquisition.record.status,
        source
    );
    println!(
        "{} {}",
        style("Tileset:").bold(),
        style(&acquisition.tileset_url).green()
    );
}

fn print_view(loaded: &LoadedTileset, fit: &ViewFit) {
    let q = fit.rotation;
    println!();
    println!("{}", style("Placement").bold());
    println!("  Tiles:     {}", loaded.manifest.root.tile_count());
    println!(
        "  Center:    ({:.3}, {:.3}, {:.3})",
        fit.center.x, fit.center.y, fit.center.z
    );
    println!("  Radius:    {:.3} m", fit.radius);
    println!("  Distance:  {:.3} m", fit.distance_to_ellipsoid_center);
    println!(
        "  Rotation:  ({:.6}, {:.6}, {:.6}, {:.6})",
        q.x, q.y, q.z, q.w
    );
    println!("  Offset:    (0, {:.3}, 0)", fit.offset.y);
}
