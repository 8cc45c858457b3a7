//! Export Locator: finds an existing export for a request.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{cancellable, MeshExportClient};
use super::error::ExportError;
use super::types::{ExportRecord, ExportRequest, ExportType};
use crate::http::AsyncHttpClient;

/// Which listed export counts as a usable match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatePolicy {
    /// First export of the right type, whatever its status.
    FirstMatch,
    /// First export of the right type whose status is `Complete`.
    CompleteOnly,
}

impl LocatePolicy {
    pub fn accepts(&self, record: &ExportRecord, export_type: ExportType) -> bool {
        if !record.is_type(export_type) {
            return false;
        }
        match self {
            LocatePolicy::FirstMatch => true,
            LocatePolicy::CompleteOnly => record.status.is_complete(),
        }
    }
}

/// Result of a lookup.
///
/// A failed lookup is reported separately from "nothing found" so the caller
/// can log it, even though both lead to a new export being requested.
#[derive(Debug)]
pub enum LocateOutcome {
    Found(ExportRecord),
    NotFound,
    Failed(ExportError),
}

impl LocateOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LocateOutcome::Found(_))
    }
}

/// Looks for an existing export matching the request under the policy.
pub async fn locate_export<C: AsyncHttpClient>(
    client: &MeshExportClient<C>,
    request: &ExportRequest,
    policy: LocatePolicy,
    cancel: &CancellationToken,
) -> LocateOutcome {
    let exports = match cancellable(cancel, client.list_exports(request)).await {
        Ok(exports) => exports,
        Err(e) => return LocateOutcome::Failed(e),
    };

    debug!(
        imodel_id = %request.imodel_id,
        listed = exports.len(),
        policy = ?policy,
        "Listed existing exports"
    );

    exports
        .into_iter()
        .find(|record| policy.accepts(record, request.export_type))
        .map_or(LocateOutcome::NotFound, LocateOutcome::Found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::export::types::ExportStatus;
    use crate::http::tests::MockAsyncHttpClient;
    use crate::http::{HttpError, Method};

    const LISTING: &str = r#"{"exports": [
        {"id": "1", "status": "InProgress", "request": {"exportType": "CESIUM"}},
        {"id": "2", "status": "Complete", "request": {"exportType": "IMODEL"}},
        {"id": "3", "status": "Complete", "request": {"exportType": "CESIUM"},
         "_links": {"mesh": {"href": "https://blob/3?sig=a"}}},
        {"id": "4", "status": "InProgress", "request": {"exportType": "3DTILES"}}
    ]}"#;

    fn client(mock: MockAsyncHttpClient) -> MeshExportClient<MockAsyncHttpClient> {
        MeshExportClient::with_base_url(mock, "https://api.test/mesh-export", AccessToken::new("t"))
    }

    #[tokio::test]
    async fn test_complete_only_skips_unfinished_exports() {
        let c = client(MockAsyncHttpClient::new().on_json(Method::Get, "?", &[LISTING]));
        let request = ExportRequest::new("abc", ExportType::Cesium);

        let cancel = CancellationToken::new();
        let outcome = locate_export(&c, &request, LocatePolicy::CompleteOnly, &cancel).await;
        match outcome {
            LocateOutcome::Found(record) => {
                assert_eq!(record.id, "3");
                assert_eq!(record.status, ExportStatus::Complete);
            }
            other => panic!("Expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_match_takes_any_status() {
        let c = client(MockAsyncHttpClient::new().on_json(Method::Get, "?", &[LISTING]));
        let request = ExportRequest::new("abc", ExportType::ThreeDTiles);

        let outcome =
            locate_export(&c, &request, LocatePolicy::FirstMatch, &CancellationToken::new()).await;
        match outcome {
            LocateOutcome::Found(record) => assert_eq!(record.id, "4"),
            other => panic!("Expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_matching_type_is_not_found() {
        let body = r#"{"exports": [{"id": "2", "status": "Complete", "request": {"exportType": "IMODEL"}}]}"#;
        let c = client(MockAsyncHttpClient::new().on_json(Method::Get, "?", &[body]));
        let request = ExportRequest::new("abc", ExportType::ThreeDTiles);

        let outcome =
            locate_export(&c, &request, LocatePolicy::FirstMatch, &CancellationToken::new()).await;
        assert!(matches!(outcome, LocateOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_as_failed() {
        let mock = MockAsyncHttpClient::new().on(
            Method::Get,
            "?",
            vec![Err(HttpError::Transport {
                url: "https://api.test".to_string(),
                reason: "connection refused".to_string(),
            })],
        );
        let c = client(mock);
        let request = ExportRequest::new("abc", ExportType::ThreeDTiles);

        let outcome =
            locate_export(&c, &request, LocatePolicy::FirstMatch, &CancellationToken::new()).await;
        assert!(matches!(outcome, LocateOutcome::Failed(ExportError::Http(_))));
        assert!(!outcome.is_found());
    }

    #[test]
    fn test_policy_requires_matching_type() {
        let record = ExportRecord {
            id: "1".to_string(),
            display_name: None,
            status: ExportStatus::Complete,
            export_type: Some("3DTILES".to_string()),
            imodel_id: None,
            changeset_id: None,
            mesh_link: None,
        };

        assert!(LocatePolicy::CompleteOnly.accepts(&record, ExportType::ThreeDTiles));
        assert!(!LocatePolicy::FirstMatch.accepts(&record, ExportType::Cesium));
    }
}
