//! Watch a Channels app from the terminal
//!
//! ```text
//! CHANNELS_LOG_MODE=development cargo run -p channels-device --example monitor -- 192.168.1.20
//! ```

use std::sync::Arc;
use std::time::Duration;

use channels_device::{
    init_logging_from_env, query_device, AdapterConfig, DeviceAdapter, PollingTask, SetupRequest,
};
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let address = std::env::args()
        .nth(1)
        .ok_or("usage: monitor <address> [name]")?;
    let name = std::env::args().nth(2).unwrap_or_default();
    let config = AdapterConfig::from_env();

    println!("1. Checking Channels app at {}...", address);
    let device_config = query_device(&SetupRequest::new(address, name), config.request_timeout).await?;
    println!("✓ Found {} ({})", device_config.name(), device_config.identifier());

    println!("2. Connecting...");
    let adapter = Arc::new(DeviceAdapter::with_config(device_config, &config));
    adapter.establish_connection().await?;
    println!("✓ Connected, state: {:?}", adapter.state());

    println!("3. Polling every {:?} (60s window)...", config.poll_interval);
    let poller = PollingTask::for_adapter(Arc::clone(&adapter), &config);
    let mut updates = adapter.subscribe();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(60);

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }

        match timeout(remaining, updates.changed()).await {
            Ok(Ok(())) => {
                let attributes = updates.borrow_and_update().clone();
                println!(
                    "  {:?} | {} | {} | {}/{}s",
                    attributes.state,
                    attributes.media_title.as_deref().unwrap_or("-"),
                    attributes.media_artist.as_deref().unwrap_or("-"),
                    attributes.media_position.unwrap_or(0),
                    attributes.media_duration.unwrap_or(0),
                );
            }
            Ok(Err(_)) => break,
            Err(_) => break,
        }
    }

    poller.stop();
    println!(
        "✓ {} polls, {} unavailable, {} skipped",
        poller.poll_count(),
        poller.unavailable_count(),
        poller.skipped_count()
    );

    Ok(())
}
