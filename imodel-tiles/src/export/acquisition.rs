//! Acquisition Orchestrator: from an export request to a tileset URL.
//!
//! # State machine
//!
//! ```text
//! Start → Locating ─[found]──────────────────────────→ Resolving → Done
//!                  └[not found / lookup failed]→ Initiating → Polling ─┘
//!                                                              └[timeout]→ Failed
//! ```
//!
//! Each acquisition runs the machine once. The Initiator is called exactly
//! once when, and only when, the Locator found nothing usable. Running two
//! acquisitions back to back may create two server-side exports; nothing here
//! deduplicates beyond the single lookup.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::client::MeshExportClient;
use super::error::ExportError;
use super::initiator::start_export;
use super::locator::{locate_export, LocateOutcome, LocatePolicy};
use super::poller::{ExportPoller, PollConfig, StatusCallback};
use super::tileset::{resolve_tileset_url, TilesetUrl, TilesetUrlError};
use super::types::{ExportRecord, ExportRequest};
use super::variant::ViewerVariant;
use crate::http::AsyncHttpClient;

/// States of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Start,
    Locating,
    Initiating,
    Polling,
    Resolving,
    Done,
    Failed,
}

/// Fatal acquisition errors.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Creating or polling the export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The completed export carries no mesh link.
    #[error("export {export_id} has no mesh link")]
    MissingMeshLink { export_id: String },

    /// The mesh link could not be turned into a tileset URL.
    #[error("cannot resolve tileset URL: {0}")]
    Tileset(#[from] TilesetUrlError),
}

/// Result of a successful acquisition.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub tileset_url: TilesetUrl,
    /// The export the URL was resolved from.
    pub record: ExportRecord,
    /// True if this acquisition requested the export.
    pub created: bool,
    /// States visited, in order, ending with `Done`.
    pub states: Vec<AcquisitionState>,
}

/// Runs the acquisition state machine against one API client.
pub struct ExportAcquisition<C: AsyncHttpClient> {
    client: MeshExportClient<C>,
    policy: LocatePolicy,
    poller: ExportPoller,
}

impl<C: AsyncHttpClient> ExportAcquisition<C> {
    /// Creates an orchestrator configured for a viewer variant.
    pub fn new(client: MeshExportClient<C>, variant: ViewerVariant, poll: PollConfig) -> Self {
        Self {
            client,
            policy: variant.locate_policy(),
            poller: ExportPoller::new(poll),
        }
    }

    /// Reports pending statuses seen while polling.
    pub fn with_status_observer(mut self, observer: StatusCallback) -> Self {
        self.poller = self.poller.with_observer(observer);
        self
    }

    pub fn client(&self) -> &MeshExportClient<C> {
        &self.client
    }

    /// Acquires a tileset URL for the request.
    pub async fn acquire(
        &self,
        request: &ExportRequest,
        cancel: &CancellationToken,
    ) -> Result<Acquisition, AcquireError> {
        let mut states = vec![AcquisitionState::Start];
        let result = self.run(request, cancel, &mut states).await;

        if let Err(e) = &result {
            enter(&mut states, AcquisitionState::Failed);
            error!(imodel_id = %request.imodel_id, error = %e, "Acquisition failed");
        }
        result
    }

    async fn run(
        &self,
        request: &ExportRequest,
        cancel: &CancellationToken,
        states: &mut Vec<AcquisitionState>,
    ) -> Result<Acquisition, AcquireError> {
        enter(states, AcquisitionState::Locating);
        let located = match locate_export(&self.client, request, self.policy, cancel).await {
            LocateOutcome::Found(record) => {
                info!(export_id = %record.id, status = %record.status, "Found existing export");
                Some(record)
            }
            LocateOutcome::NotFound => {
                info!(imodel_id = %request.imodel_id, "No usable export found");
                None
            }
            LocateOutcome::Failed(ExportError::Cancelled) => {
                return Err(ExportError::Cancelled.into());
            }
            LocateOutcome::Failed(e) => {
                warn!(
                    imodel_id = %request.imodel_id,
                    error = %e,
                    "Export lookup failed, requesting a new export"
                );
                None
            }
        };

        let (record, created) = match located {
            Some(record) if record.status.is_complete() => (record, false),
            Some(record) => {
                // An unfinished export found under FirstMatch is waited on, not recreated.
                enter(states, AcquisitionState::Polling);
                (self.poller.poll(&self.client, &record.id, cancel).await?, false)
            }
            None => {
                enter(states, AcquisitionState::Initiating);
                let export_id = start_export(&self.client, request, cancel).await?;
                enter(states, AcquisitionState::Polling);
                (self.poller.poll(&self.client, &export_id, cancel).await?, true)
            }
        };

        enter(states, AcquisitionState::Resolving);
        let mesh_link = record
            .mesh_link
            .as_deref()
            .ok_or_else(|| AcquireError::MissingMeshLink {
                export_id: record.id.clone(),
            })?;
        let tileset_url = resolve_tileset_url(mesh_link)?;

        enter(states, AcquisitionState::Done);
        info!(export_id = %record.id, created, "Tileset URL resolved");

        Ok(Acquisition {
            tileset_url,
            record,
            created,
            states: states.clone(),
        })
    }
}

fn enter(states: &mut Vec<AcquisitionState>, state: AcquisitionState) {
    debug!(state = ?state, "Acquisition state");
    states.push(state);
}
