//! Export Poller: waits for an export to complete.
//!
//! The poller fetches the export once immediately and then once per
//! interval. The deadline is measured from the first fetch; the poller never
//! sleeps past it, and once it is reached without a `Complete` status no
//! further fetch is made.
//!
//! ```text
//! t=0        t=i        t=2i              deadline
//!  │ fetch    │ fetch    │ fetch   ...  │ sleep ──┤ Timeout
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::client::{cancellable, MeshExportClient};
use super::error::ExportError;
use super::types::{ExportRecord, ExportStatus};
use crate::http::AsyncHttpClient;

/// Default interval between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default overall deadline (5 minutes).
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(300_000);

/// Stand-in deadline when `now + timeout` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Callback invoked with each non-terminal status and the elapsed time.
pub type StatusCallback = Arc<dyn Fn(&ExportStatus, Duration) + Send + Sync>;

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Polls a single export until it completes, fails, or times out.
#[derive(Clone, Default)]
pub struct ExportPoller {
    config: PollConfig,
    observer: Option<StatusCallback>,
}

impl ExportPoller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Reports every non-terminal status to `observer`.
    pub fn with_observer(mut self, observer: StatusCallback) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Polls until the export is `Complete` and returns that record.
    ///
    /// # Errors
    ///
    /// - [`ExportError::ExportFailed`] on a terminal failure status
    /// - [`ExportError::Timeout`] when the deadline passes first
    /// - [`ExportError::Cancelled`] when `cancel` fires
    /// - any request error, unretried
    pub async fn poll<C: AsyncHttpClient>(
        &self,
        client: &MeshExportClient<C>,
        export_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ExportRecord, ExportError> {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.config.timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let mut attempt: u32 = 0;

        loop {
            let record = cancellable(cancel, client.get_export(export_id)).await?;
            attempt += 1;
            let elapsed = started.elapsed();

            if record.status.is_complete() {
                info!(
                    export_id,
                    attempts = attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Export complete"
                );
                return Ok(record);
            }
            if record.status.is_failure() {
                return Err(ExportError::ExportFailed {
                    export_id: export_id.to_string(),
                    status: record.status,
                });
            }

            debug!(
                export_id,
                status = %record.status,
                attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                "Export not ready"
            );
            if let Some(observer) = &self.observer {
                observer(&record.status, elapsed);
            }

            let wake = Instant::now()
                .checked_add(self.config.interval)
                .map_or(deadline, |next| next.min(deadline));
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExportError::Cancelled),
                _ = sleep_until(wake) => {}
            }

            if Instant::now() >= deadline {
                return Err(ExportError::Timeout {
                    export_id: export_id.to_string(),
                    elapsed: started.elapsed(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::http::tests::MockAsyncHttpClient;
    use crate::http::Method;
    use std::sync::Mutex;

    fn status_body(status: &str) -> String {
        format!(
            r#"{{"export": {{"id": "42", "status": "{}", "_links": {{"mesh": {{"href": "https://x/y?sig=1"}}}}}}}}"#,
            status
        )
    }

    fn client_with_statuses(statuses: &[&str]) -> MeshExportClient<MockAsyncHttpClient> {
        let bodies: Vec<String> = statuses.iter().map(|s| status_body(s)).collect();
        let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
        let mock = MockAsyncHttpClient::new().on_json(Method::Get, "mesh-export/42", &refs);
        MeshExportClient::with_base_url(mock, "https://api.test/mesh-export", AccessToken::new("t"))
    }

    fn fetch_times(client: &MeshExportClient<MockAsyncHttpClient>) -> Vec<Instant> {
        client
            .http_client()
            .request_times(Method::Get, "mesh-export/42")
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_complete_at_fixed_interval() {
        let client = client_with_statuses(&["Queued", "InProgress", "InProgress", "Complete"]);
        let poller = ExportPoller::new(PollConfig::new(Duration::from_secs(3)));

        let record = poller
            .poll(&client, "42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(record.status, ExportStatus::Complete);
        let times = fetch_times(&client);
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(3));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_further_fetches() {
        let client = client_with_statuses(&["InProgress"]);
        let config = PollConfig::new(Duration::from_secs(3)).with_timeout(Duration::from_secs(10));
        let poller = ExportPoller::new(config);
        let started = Instant::now();

        let result = poller.poll(&client, "42", &CancellationToken::new()).await;

        match result {
            Err(ExportError::Timeout { export_id, elapsed }) => {
                assert_eq!(export_id, "42");
                assert_eq!(elapsed, Duration::from_secs(10));
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }

        // Fetches at 0, 3, 6 and 9 seconds; none at or after the deadline.
        let times = fetch_times(&client);
        assert_eq!(times.len(), 4);
        assert!(times
            .iter()
            .all(|t| *t - started < Duration::from_secs(10)));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(fetch_times(&client).len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_is_five_minutes() {
        let client = client_with_statuses(&["InProgress"]);
        let poller = ExportPoller::default();

        let result = poller.poll(&client, "42", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(ExportError::Timeout { elapsed, .. }) if elapsed == Duration::from_millis(300_000)
        ));
        assert_eq!(fetch_times(&client).len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_timeout_does_not_overflow() {
        let client = client_with_statuses(&["InProgress", "Complete"]);
        let config =
            PollConfig::new(Duration::from_secs(3)).with_timeout(Duration::from_secs(u64::MAX));
        let poller = ExportPoller::new(config);

        let record = poller
            .poll(&client, "42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(record.status, ExportStatus::Complete);
        assert_eq!(fetch_times(&client).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_interval_waits_for_deadline() {
        let client = client_with_statuses(&["InProgress"]);
        let config = PollConfig::new(Duration::from_secs(u64::MAX))
            .with_timeout(Duration::from_secs(10));
        let poller = ExportPoller::new(config);

        let result = poller.poll(&client, "42", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(ExportError::Timeout { elapsed, .. }) if elapsed == Duration::from_secs(10)
        ));
        assert_eq!(fetch_times(&client).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_status_stops_polling() {
        let client = client_with_statuses(&["InProgress", "Invalid", "Complete"]);
        let poller = ExportPoller::new(PollConfig::new(Duration::from_secs(5)));

        let result = poller.poll(&client, "42", &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(ExportError::ExportFailed {
                status: ExportStatus::Invalid,
                ..
            })
        ));
        assert_eq!(fetch_times(&client).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_each_pending_status() {
        let client = client_with_statuses(&["NotStarted", "InProgress", "Complete"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let poller = ExportPoller::new(PollConfig::new(Duration::from_secs(3))).with_observer(
            Arc::new(move |status: &ExportStatus, _elapsed: Duration| {
                sink.lock().unwrap().push(status.clone());
            }),
        );

        poller
            .poll(&client, "42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ExportStatus::NotStarted, ExportStatus::InProgress]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let client = client_with_statuses(&["InProgress"]);
        let poller = ExportPoller::new(PollConfig::new(Duration::from_secs(3)));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            canceller.cancel();
        });

        let result = poller.poll(&client, "42", &cancel).await;

        assert!(matches!(result, Err(ExportError::Cancelled)));
        assert_eq!(fetch_times(&client).len(), 2);
    }
}
