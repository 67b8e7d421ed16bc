//! Standalone worker that drains the edge-agent log channels.
//!
//! Deliberately unintegrated with the telemetry engine: records are decoded
//! and logged, nothing more. Routing into analysis or storage comes later.

use futures::StreamExt;
use tracing::{error, info, warn};

const CHANNELS: [&str; 2] = ["network_logs", "system_logs"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let broker_url = std::env::var("SENTINEL_NATS_URL")
        .unwrap_or_else(|_| "nats://localhost:4222".to_string());

    let client = match async_nats::connect(&broker_url).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to broker {}: {}", broker_url, e);
            return Err(e.into());
        }
    };

    let network = client.subscribe(CHANNELS[0].to_string()).await?;
    let system = client.subscribe(CHANNELS[1].to_string()).await?;
    info!("Subscribed to channels {:?} on broker {}", CHANNELS, broker_url);

    let mut messages = futures::stream::select(network, system);
    while let Some(message) = messages.next().await {
        match serde_json::from_slice::<serde_json::Value>(&message.payload) {
            Ok(record) => {
                info!("Received from [{}]: {}", message.subject, record);
            }
            Err(e) => {
                warn!("Failed to decode record on [{}]: {}", message.subject, e);
            }
        }
    }

    info!("Broker connection closed, consumer shutting down");
    Ok(())
}
