//! Export Initiator: requests a new export job.

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::client::{cancellable, MeshExportClient};
use super::error::ExportError;
use super::types::ExportRequest;
use crate::http::AsyncHttpClient;

/// Requests a new export and returns its id.
///
/// There is no duplicate check here; callers locate first.
pub async fn start_export<C: AsyncHttpClient>(
    client: &MeshExportClient<C>,
    request: &ExportRequest,
    cancel: &CancellationToken,
) -> Result<String, ExportError> {
    let record = cancellable(cancel, client.create_export(request)).await?;

    info!(
        export_id = %record.id,
        imodel_id = %request.imodel_id,
        changeset = request.changeset().unwrap_or("latest"),
        export_type = %request.export_type,
        "Requested new mesh export"
    );

    Ok(record.id)
}
