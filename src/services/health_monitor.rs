//! Backend liveness monitor.
//!
//! Probes the service on a fixed interval and publishes the latest
//! [`BackendHealth`] through a shared `watch` channel. The monitor never
//! touches session entities; the phase controller only reads the channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::domain::models::{BackendConfig, BackendHealth};
use crate::domain::ports::BackendGateway;

/// Liveness monitor for the backend service.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use adloop::adapters::MockBackend;
/// use adloop::services::HealthMonitor;
/// use tokio::sync::{broadcast, watch};
///
/// # async fn example() {
/// let (health, _) = watch::channel(Default::default());
/// let monitor = HealthMonitor::new(Arc::new(MockBackend::new()), Arc::new(health));
/// let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
/// let handle = monitor.start_monitoring(shutdown_rx);
///
/// let _ = shutdown_tx.send(());
/// let _ = handle.await;
/// # }
/// ```
pub struct HealthMonitor {
    gateway: Arc<dyn BackendGateway>,
    health: Arc<watch::Sender<BackendHealth>>,
    check_interval: Duration,
    probe_timeout: Duration,
}

impl HealthMonitor {
    /// Create a monitor with a 30 second interval and a 2 second probe timeout.
    pub fn new(gateway: Arc<dyn BackendGateway>, health: Arc<watch::Sender<BackendHealth>>) -> Self {
        Self {
            gateway,
            health,
            check_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_millis(2000),
        }
    }

    /// Create a monitor using the intervals from configuration.
    pub fn from_config(
        gateway: Arc<dyn BackendGateway>,
        health: Arc<watch::Sender<BackendHealth>>,
        config: &BackendConfig,
    ) -> Self {
        Self::with_config(
            gateway,
            health,
            Duration::from_secs(config.health_interval_secs),
            Duration::from_millis(config.health_timeout_ms),
        )
    }

    pub fn with_config(
        gateway: Arc<dyn BackendGateway>,
        health: Arc<watch::Sender<BackendHealth>>,
        check_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self { gateway, health, check_interval, probe_timeout }
    }

    pub fn subscribe(&self) -> watch::Receiver<BackendHealth> {
        self.health.subscribe()
    }

    pub fn current(&self) -> BackendHealth {
        *self.health.borrow()
    }

    /// Run a single probe and publish its outcome.
    pub async fn probe_once(&self) -> BackendHealth {
        Self::probe(&self.gateway, &self.health, self.probe_timeout).await
    }

    /// Spawn the polling task. The first probe runs immediately; the task
    /// stops when `shutdown_rx` receives a signal or its sender is dropped.
    pub fn start_monitoring(&self, mut shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        let health = Arc::clone(&self.health);
        let check_interval = self.check_interval;
        let probe_timeout = self.probe_timeout;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(check_interval);

            tracing::info!(
                check_interval_secs = check_interval.as_secs(),
                "Started backend health monitoring"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        Self::probe(&gateway, &health, probe_timeout).await;
                    }

                    _ = shutdown_rx.recv() => {
                        tracing::info!("Received shutdown signal, stopping health monitoring");
                        break;
                    }
                }
            }

            tracing::info!("Backend health monitoring stopped");
        })
    }

    async fn probe(
        gateway: &Arc<dyn BackendGateway>,
        health: &watch::Sender<BackendHealth>,
        probe_timeout: Duration,
    ) -> BackendHealth {
        let previous = *health.borrow();
        let next = match tokio::time::timeout(probe_timeout, gateway.check_health()).await {
            Ok(Ok(report)) => BackendHealth::online(report.mode),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Health probe failed");
                previous.offline()
            }
            Err(_) => {
                tracing::debug!(timeout_ms = probe_timeout.as_millis(), "Health probe timed out");
                previous.offline()
            }
        };

        if next.status != previous.status {
            tracing::info!(status = ?next.status, mode = ?next.mode, "Backend status changed");
        }
        health.send_replace(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_backend::{GatewayCall, MockBackend};
    use crate::domain::models::{BackendMode, LinkStatus};
    use crate::domain::ports::GatewayError;

    fn monitor(backend: Arc<MockBackend>) -> HealthMonitor {
        let (tx, _) = watch::channel(BackendHealth::default());
        HealthMonitor::with_config(
            backend,
            Arc::new(tx),
            Duration::from_millis(20),
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_probe_reports_online_with_mode() {
        let monitor = monitor(Arc::new(MockBackend::new()));
        assert_eq!(monitor.current().status, LinkStatus::Checking);

        let health = monitor.probe_once().await;
        assert_eq!(health, BackendHealth::online(BackendMode::Mocked));
        assert_eq!(monitor.current(), health);
    }

    #[tokio::test]
    async fn test_failed_probe_goes_offline_and_keeps_mode() {
        let backend = Arc::new(MockBackend::new());
        let monitor = monitor(Arc::clone(&backend));
        monitor.probe_once().await;

        backend.fail_next(GatewayCall::CheckHealth, GatewayError::request(500, "down"));
        let health = monitor.probe_once().await;
        assert!(health.is_offline());
        assert_eq!(health.mode, BackendMode::Mocked);
    }

    #[tokio::test]
    async fn test_monitoring_publishes_and_stops_on_shutdown() {
        let backend = Arc::new(MockBackend::new());
        let monitor = monitor(Arc::clone(&backend));
        let mut rx = monitor.subscribe();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = monitor.start_monitoring(shutdown_rx);
        rx.changed().await.expect("first probe publishes");
        assert_eq!(rx.borrow().status, LinkStatus::Online);

        shutdown_tx.send(()).expect("monitor is listening");
        handle.await.expect("monitor task exits cleanly");
        assert!(!backend.calls_of(GatewayCall::CheckHealth).is_empty());
    }
}
