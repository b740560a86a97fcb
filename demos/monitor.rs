// SPDX-License-Identifier: MPL-2.0

//! Live appliance monitor.
//!
//! Discovers every supported appliance of the account, prints each sensor
//! reading as it changes, and logs session status changes.
//!
//! # Usage
//!
//! ```bash
//! HOME_CONNECT_REFRESH_TOKEN=... cargo run --example monitor -- [minutes]
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Monitor for 10 minutes against the simulator
//! HOME_CONNECT_BASE_URL=https://simulator.home-connect.com \
//! HOME_CONNECT_REFRESH_TOKEN=... \
//! RUST_LOG=hconnect_lib=debug \
//! cargo run --example monitor -- 10
//! ```

use std::env;
use std::time::Duration;

use hconnect_lib::ClientConfig;
use hconnect_lib::event::ApplianceEvent;
use hconnect_lib::manager::ApplianceRegistry;
use hconnect_lib::subscription::Subscribable;
use tracing_subscriber::EnvFilter;

const DEFAULT_MINUTES: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hconnect_lib=info")),
        )
        .init();

    let minutes = match env::args().nth(1) {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_MINUTES,
    };

    let config = ClientConfig::from_env()?;
    let registry = ApplianceRegistry::new(&config)?;

    let mut events = registry.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ApplianceEvent::Discovered { ha_id, kind } => {
                    println!("+ {kind} {ha_id}");
                }
                ApplianceEvent::SessionStatusChanged { ha_id, status } => {
                    println!("~ {ha_id}: {status}");
                }
                ApplianceEvent::StateChanged { .. } => {}
            }
        }
    });

    let sensors = registry.discover().await?;
    println!("Monitoring {} sensors for {minutes} minutes", sensors.len());

    for sensor in &sensors {
        let reader = sensor.clone();
        sensor.on_changed(move || {
            println!("  {} = {}", reader.name(), reader.value());
        });
    }

    tokio::time::sleep(Duration::from_secs(minutes * 60)).await;

    registry.shutdown().await;
    println!("Done");
    Ok(())
}
