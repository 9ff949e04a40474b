//! Blocking-call offload with "ack now, notify later" progress.
//!
//! Synchronous work (document rendering, blocking store drivers) runs on
//! tokio's blocking pool behind a semaphore, so the request scheduler never
//! stalls and at most `blocking_workers` calls run at once. Long operations
//! acknowledge the user immediately and keep a chat action alive until they
//! finish.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vyapari_core_api::config::LedgerConfig;
use vyapari_core_api::domain::AccountId;
use vyapari_core_api::error::{ApiError, ApiResult};
use vyapari_core_api::service::{ChatAction, ChatTransport};

/// Periodic chat action that stops when dropped.
///
/// Every exit path of the guarded operation (success, error, timeout,
/// cancellation of the enclosing task) drops the guard and aborts the task.
pub struct LivenessGuard {
    handle: JoinHandle<()>,
}

impl LivenessGuard {
    pub fn start(
        transport: Arc<dyn ChatTransport>,
        account_id: AccountId,
        action: ChatAction,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = transport.send_chat_action(&account_id, action).await {
                    debug!(account_id = %account_id, error = %e, "liveness signal failed");
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for LivenessGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct BlockingCallOffload {
    permits: Arc<Semaphore>,
    timeout: Duration,
    liveness_interval: Duration,
}

impl BlockingCallOffload {
    pub fn new(workers: usize, timeout: Duration, liveness_interval: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
            timeout,
            liveness_interval,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            config.blocking_workers,
            config.operation_timeout(),
            config.liveness_interval(),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a synchronous call on the bounded blocking pool.
    pub async fn run_blocking<F, T>(&self, call: F) -> ApiResult<T>
    where
        F: FnOnce() -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ApiError::InternalError(format!("blocking pool closed: {e}")))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            call()
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("blocking call failed: {e}")))?
    }

    /// Acknowledge, keep a liveness signal running, and await `operation`
    /// under the overall timeout.
    pub async fn with_progress<Fut, T>(
        &self,
        transport: Arc<dyn ChatTransport>,
        account_id: &AccountId,
        ack: &str,
        action: ChatAction,
        operation: Fut,
    ) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        if let Err(e) = transport.send_message(account_id, ack, None).await {
            warn!(account_id = %account_id, error = %e, "acknowledgement not delivered");
        }

        let _liveness = LivenessGuard::start(transport, account_id.clone(), action, self.liveness_interval);

        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                warn!(account_id = %account_id, timeout_ms = self.timeout.as_millis() as u64, "operation timed out");
                Err(ApiError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn offload(timeout_ms: u64) -> BlockingCallOffload {
        BlockingCallOffload::new(2, Duration::from_millis(timeout_ms), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn liveness_stops_after_success() {
        let transport = RecordingTransport::new();
        let account = AccountId::from(42i64);

        let value = offload(1_000)
            .with_progress(transport.clone(), &account, "Working on it…", ChatAction::Typing, async {
                tokio::time::sleep(Duration::from_millis(90)).await;
                Ok(7)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(transport.texts(), vec!["Working on it…".to_string()]);

        let ticks = transport.action_count();
        assert!(ticks >= 2, "expected periodic signals, got {ticks}");
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(transport.action_count(), ticks);
    }

    #[tokio::test]
    async fn liveness_stops_after_error() {
        let transport = RecordingTransport::new();
        let result: ApiResult<()> = offload(1_000)
            .with_progress(transport.clone(), &AccountId::from(1i64), "…", ChatAction::Typing, async {
                Err(ApiError::storage("connection reset"))
            })
            .await;
        assert!(result.unwrap_err().is_retryable());

        let ticks = transport.action_count();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(transport.action_count(), ticks);
    }

    #[tokio::test]
    async fn timeout_is_a_hard_ceiling() {
        let transport = RecordingTransport::new();
        let result: ApiResult<()> = offload(60)
            .with_progress(transport.clone(), &AccountId::from(1i64), "…", ChatAction::Typing, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        match result {
            Err(ApiError::Timeout(after)) => assert_eq!(after, Duration::from_millis(60)),
            other => panic!("expected timeout, got {other:?}"),
        }

        let ticks = transport.action_count();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(transport.action_count(), ticks);
    }

    #[tokio::test]
    async fn guard_aborts_on_drop() {
        let transport = RecordingTransport::new();
        let guard = LivenessGuard::start(transport, AccountId::from(1i64), ChatAction::Typing, Duration::from_millis(10));
        assert!(guard.is_running());
        drop(guard);
    }

    #[tokio::test]
    async fn blocking_pool_is_bounded() {
        let pool = Arc::new(offload(1_000));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..6 {
            let pool = pool.clone();
            let running = running.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                pool.run_blocking(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(30));
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn blocking_errors_propagate() {
        let result: ApiResult<()> = offload(1_000)
            .run_blocking(|| Err(ApiError::InternalError("render failed".into())))
            .await;
        assert!(matches!(result, Err(ApiError::InternalError(_))));
    }
}
