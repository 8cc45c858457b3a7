//! Mesh export acquisition protocol.
//!
//! This module turns an [`ExportRequest`] into a [`TilesetUrl`]:
//!
//! 1. [`locate_export`] looks for an existing export of the iModel
//! 2. [`start_export`] requests one if none is usable
//! 3. [`ExportPoller`] waits for it to complete
//! 4. [`resolve_tileset_url`] derives the tileset URL from its mesh link
//!
//! [`ExportAcquisition`] runs these steps as a single state machine.
//!
//! # Example
//!
//! ```ignore
//! use imodel_tiles::export::{ExportAcquisition, ExportRequest, MeshExportClient, ViewerVariant};
//! use imodel_tiles::http::AsyncReqwestClient;
//!
//! let client = MeshExportClient::new(AsyncReqwestClient::new()?, "qa-", token);
//! let variant = ViewerVariant::ThreeJs;
//! let poll = PollConfig::new(variant.default_poll_interval());
//! let acquisition = ExportAcquisition::new(client, variant, poll);
//! let request = ExportRequest::new(imodel_id, variant.export_type());
//! let result = acquisition.acquire(&request, &CancellationToken::new()).await?;
//! println!("{}", result.tileset_url);
//! ```

mod acquisition;
mod client;
mod error;
mod initiator;
mod locator;
mod poller;
mod tileset;
mod types;
mod variant;

pub use acquisition::{AcquireError, Acquisition, AcquisitionState, ExportAcquisition};
pub use client::{MeshExportClient, API_ACCEPT};
pub use error::ExportError;
pub use initiator::start_export;
pub use locator::{locate_export, LocateOutcome, LocatePolicy};
pub use poller::{
    ExportPoller, PollConfig, StatusCallback, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};
pub use tileset::{resolve_tileset_url, TilesetUrl, TilesetUrlError, TILESET_FILE};
pub use types::{ExportRecord, ExportRequest, ExportStatus, ExportType};
pub use variant::ViewerVariant;
