//! Common types and utilities shared across CLI commands.

use std::future::Future;
use std::time::Duration;

use clap::{Args, ValueEnum};
use console::style;
use imodel_tiles::auth::{StaticTokenSource, TokenSource};
use imodel_tiles::config::{ApiSettings, ConfigFile, SettingsOverrides, ViewerSettings};
use imodel_tiles::export::{resolve_tileset_url, ExportRecord, MeshExportClient, ViewerVariant};
use imodel_tiles::http::AsyncReqwestClient;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// Viewer variant selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum VariantArg {
    /// CesiumJS (CESIUM exports, completed exports only, requires an Ion token)
    Cesium,
    /// three.js 3DTilesRenderer (3DTILES exports)
    ThreeJs,
}

impl From<VariantArg> for ViewerVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Cesium => ViewerVariant::Cesium,
            VariantArg::ThreeJs => ViewerVariant::ThreeJs,
        }
    }
}

/// Connection options shared by every networked command.
#[derive(Debug, Clone, Default, Args)]
pub struct ApiArgs {
    /// API host prefix, e.g. "qa-" (overrides IMS_PREFIX and api.prefix)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Bearer access token (overrides ACCESS_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}

impl ApiArgs {
    fn apply(&self, overrides: &mut SettingsOverrides) {
        overrides.api_prefix = self.prefix.clone();
        overrides.access_token = self.token.clone();
    }

    /// Resolves connection settings against env and config.
    pub fn resolve(&self, config: &ConfigFile) -> Result<ApiSettings, CliError> {
        let mut overrides = SettingsOverrides::default();
        self.apply(&mut overrides);
        Ok(ApiSettings::resolve_from_env(&overrides, config)?)
    }
}

/// Which iModel to acquire a tileset for, and how.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Viewer the tileset is for
    #[arg(long, value_enum, default_value_t = VariantArg::ThreeJs)]
    pub variant: VariantArg,

    /// iModel id (overrides IMODEL_ID and imodel.id)
    #[arg(long)]
    pub imodel: Option<String>,

    /// Changeset id; latest when unset (overrides CHANGESET_ID)
    #[arg(long)]
    pub changeset: Option<String>,

    /// OAuth client id (overrides AUTH_CLIENT_ID and auth.client_id)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Cesium Ion token (overrides ION_TOKEN and auth.ion_token)
    #[arg(long)]
    pub ion_token: Option<String>,

    #[command(flatten)]
    pub api: ApiArgs,

    /// Seconds between status checks (default depends on the variant)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Seconds to wait for an export before giving up
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl TargetArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            imodel_id: self.imodel.clone(),
            changeset_id: self.changeset.clone(),
            client_id: self.client_id.clone(),
            ion_token: self.ion_token.clone(),
            poll_interval: self.interval.map(Duration::from_secs),
            timeout: self.timeout.map(Duration::from_secs),
            ..Default::default()
        };
        self.api.apply(&mut overrides);
        overrides
    }

    /// Resolves settings: CLI > environment > config file.
    pub fn resolve(&self, config: &ConfigFile) -> Result<ViewerSettings, CliError> {
        Ok(ViewerSettings::resolve_from_env(
            self.variant.into(),
            &self.overrides(),
            config,
        )?)
    }
}

/// Builds an API client authorized with the configured token.
pub async fn export_client(
    api: &ApiSettings,
    http_client: AsyncReqwestClient,
) -> Result<MeshExportClient<AsyncReqwestClient>, CliError> {
    let token = StaticTokenSource::new(api.access_token.clone())
        .access_token()
        .await?;
    Ok(MeshExportClient::new(http_client, &api.api_prefix, token))
}

/// Runs `future` unless the user cancels first.
pub async fn until_cancelled<T, E>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T, E>>,
) -> Result<T, CliError>
where
    CliError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CliError::Cancelled),
        result = future => result.map_err(CliError::from),
    }
}

/// Prints the resolved target before any network call.
pub fn print_target(settings: &ViewerSettings) {
    println!("{}", style(format!("imodel-tiles v{}", imodel_tiles::VERSION)).bold());
    println!();
    println!("Viewer:    {}", settings.variant);
    println!("iModel:    {}", settings.imodel_id);
    println!(
        "Changeset: {}",
        settings.changeset_id.as_deref().unwrap_or("(latest)")
    );
    println!("Identity:  {} ({})", settings.auth.authority, settings.auth.client_id);
    println!("Redirect:  {}", settings.auth.redirect_uri);
    println!(
        "Polling:   every {}s, timeout {}s",
        settings.poll.interval.as_secs(),
        settings.poll.timeout.as_secs()
    );
    println!();
}

/// Prints one export record.
pub fn print_record(record: &ExportRecord) {
    let status = if record.status.is_complete() {
        style(record.status.to_string()).green()
    } else if record.status.is_failure() {
        style(record.status.to_string()).red()
    } else {
        style(record.status.to_string()).yellow()
    };

    println!("Export:    {}", style(&record.id).bold());
    if let Some(name) = &record.display_name {
        println!("Name:      {}", name);
    }
    println!("Status:    {}", status);
    if let Some(export_type) = &record.export_type {
        println!("Type:      {}", export_type);
    }
    if let Some(changeset) = record.changeset_id.as_deref().filter(|c| !c.is_empty()) {
        println!("Changeset: {}", changeset);
    }
    if record.status.is_complete() {
        match record.mesh_link.as_deref().map(resolve_tileset_url) {
            Some(Ok(url)) => println!("Tileset:   {}", url),
            Some(Err(e)) => println!("Tileset:   {}", style(e).red()),
            None => println!("Tileset:   (no mesh link)"),
        }
    }
}
