use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Local;
use rand::Rng;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::models::{Alert, AlertSeverity, MetricsSnapshot, StreamMessage};
use crate::registry::ConnectionRegistry;
use crate::store::AlertStore;

/// Default cadence between synthetic metric emissions.
pub const TICK_INTERVAL: Duration = Duration::from_secs(2);

/// First id handed out by a fresh generator. Ids are process-local: a restart
/// starts over from this seed and may reissue ids already present in the
/// alert log.
const ALERT_ID_SEED: i64 = 4;

const ALERT_SOURCE: &str = "System Monitor";

/// Probability that a tick lands in the incident regime.
const INCIDENT_PROBABILITY: f64 = 0.2;

/// Synthesizes one metrics snapshot per tick, raises alerts on incident
/// ticks, and drives both the connection registry and the alert store.
pub struct TelemetryGenerator {
    registry: Arc<ConnectionRegistry>,
    store: AlertStore,
    next_alert_id: AtomicI64,
    tick: Duration,
}

impl TelemetryGenerator {
    pub fn new(registry: Arc<ConnectionRegistry>, store: AlertStore) -> Self {
        Self {
            registry,
            store,
            next_alert_id: AtomicI64::new(ALERT_ID_SEED),
            tick: TICK_INTERVAL,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Draw the next snapshot and, on an incident tick, the alert that goes
    /// with it. The id counter advances here, before any I/O, so ids stay
    /// monotonic per tick.
    pub fn next_reading(&self) -> (MetricsSnapshot, Option<Alert>) {
        synthesize(&mut rand::thread_rng(), &self.next_alert_id)
    }

    /// One tick: persist a raised alert, then broadcast the envelope if
    /// anyone is listening. Persistence and broadcast are independent side
    /// effects: a storage failure never stops the update going out, and
    /// persistence happens whether or not any subscriber is connected.
    pub async fn run_tick(&self) {
        let (snapshot, alert) = self.next_reading();

        if let Some(alert) = &alert {
            if let Err(e) = self.store.append(alert).await {
                error!("Failed to persist alert {}: {}", alert.id, e);
            }
        }

        if self.registry.client_count().await > 0 {
            let update = StreamMessage::MetricsUpdate {
                data: snapshot,
                alert,
            };
            self.registry.broadcast(&update).await;
        }
    }

    /// Run until the token is cancelled. A single tick's failure is logged
    /// inside [`run_tick`] and never terminates the loop.
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Telemetry generator started");
        let mut ticker = interval(self.tick);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Telemetry generator stopping");
                    break;
                }
                _ = ticker.tick() => self.run_tick().await,
            }
        }
    }
}

/// Draw one reading. Normal regime: traffic in [100, 5000], threats in
/// [0, 15]. With [`INCIDENT_PROBABILITY`] the tick switches to the incident
/// regime, redraws threats in [70, 100] and traffic in [10000, 50000], and
/// raises an alert: `Critical` when threats exceed 90, `High` otherwise.
fn synthesize<R: Rng>(rng: &mut R, next_id: &AtomicI64) -> (MetricsSnapshot, Option<Alert>) {
    let mut traffic = rng.gen_range(100..=5000);
    let mut threats = rng.gen_range(0..=15);
    let mut alert = None;

    if rng.gen_bool(INCIDENT_PROBABILITY) {
        threats = rng.gen_range(70..=100);
        traffic = rng.gen_range(10_000..=50_000);

        let severity = if threats > 90 {
            AlertSeverity::Critical
        } else {
            AlertSeverity::High
        };
        alert = Some(Alert {
            id: next_id.fetch_add(1, Ordering::SeqCst),
            severity,
            source: ALERT_SOURCE.to_string(),
            desc: format!("CPU spiked to {}%! Potential DDoS attempt.", threats),
            time: "Just now".to_string(),
        });
    }

    let snapshot = MetricsSnapshot {
        time: Local::now().format("%H:%M:%S").to_string(),
        threats,
        traffic,
    };

    (snapshot, alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::memory_store;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::time::timeout;

    #[test]
    fn readings_stay_within_regime_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let ids = AtomicI64::new(4);
        let mut incidents = 0;

        for _ in 0..500 {
            let (snapshot, alert) = synthesize(&mut rng, &ids);
            assert!(snapshot.traffic >= 100);
            match alert {
                Some(alert) => {
                    incidents += 1;
                    assert!((70..=100).contains(&snapshot.threats));
                    assert!((10_000..=50_000).contains(&snapshot.traffic));
                    assert_eq!(alert.source, "System Monitor");
                    assert_eq!(alert.time, "Just now");
                    assert!(alert.desc.contains(&snapshot.threats.to_string()));
                    if snapshot.threats > 90 {
                        assert_eq!(alert.severity, AlertSeverity::Critical);
                    } else {
                        assert_eq!(alert.severity, AlertSeverity::High);
                    }
                }
                None => {
                    assert!((0..=15).contains(&snapshot.threats));
                    assert!((100..=5000).contains(&snapshot.traffic));
                }
            }
        }

        // With p = 0.2 over 500 draws, both regimes must have occurred.
        assert!(incidents > 0);
        assert!(incidents < 500);
    }

    #[test]
    fn alert_ids_are_strictly_increasing_from_the_seed() {
        let mut rng = StdRng::seed_from_u64(42);
        let ids = AtomicI64::new(4);
        let mut issued = Vec::new();

        for _ in 0..500 {
            if let (_, Some(alert)) = synthesize(&mut rng, &ids) {
                issued.push(alert.id);
            }
        }

        assert!(!issued.is_empty());
        assert_eq!(issued[0], 4);
        assert!(issued.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    #[tokio::test]
    async fn run_tick_broadcasts_one_update_to_each_subscriber() {
        let registry = Arc::new(ConnectionRegistry::new());
        let store = memory_store().await;
        let generator = TelemetryGenerator::new(registry.clone(), store);

        let mut client = registry.register().await;
        generator.run_tick().await;

        let payload = timeout(Duration::from_millis(100), client.rx.recv())
            .await
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["type"], "METRICS_UPDATE");
        let threats = json["data"]["threats"].as_i64().unwrap();
        assert!((0..=15).contains(&threats) || (70..=100).contains(&threats));

        // Exactly one message per tick.
        assert!(timeout(Duration::from_millis(50), client.rx.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn alerts_are_persisted_even_with_no_subscribers() {
        let registry = Arc::new(ConnectionRegistry::new());
        let store = memory_store().await;
        let generator = TelemetryGenerator::new(registry, store.clone());

        // An incident tick is near-certain well before 200 draws.
        for _ in 0..200 {
            generator.run_tick().await;
            if !store.recent(1).await.unwrap().is_empty() {
                break;
            }
        }

        let records = store.recent(100).await.unwrap();
        assert!(!records.is_empty());
        assert!(matches!(records[0].severity.as_str(), "High" | "Critical"));
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let registry = Arc::new(ConnectionRegistry::new());
        let store = memory_store().await;
        let generator =
            TelemetryGenerator::new(registry, store).with_tick(Duration::from_millis(10));

        let shutdown = CancellationToken::new();
        let task = tokio::spawn(generator.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown.cancel();
        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    }
}
