//! Découvre les devices UPnP du réseau et affiche leurs métadonnées.

use std::time::Duration;

use anyhow::Result;
use upnpclient::{discover, SearchOptions, SessionPolicy};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let options = SearchOptions::with_timeout(Duration::from_secs(5));
    let devices = discover(&options, &SessionPolicy::default())?;

    if devices.is_empty() {
        println!("No UPnP device found.");
        return Ok(());
    }

    for device in &devices {
        println!(
            "{} ({})",
            device.friendly_name().unwrap_or("<unnamed>"),
            device.location()
        );
        for service in device.services() {
            println!("   {}", service.service_type);
        }
    }

    Ok(())
}
