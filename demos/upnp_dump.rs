//! Dump complet : services, actions et signatures d'arguments de chaque
//! device découvert (ou d'une URL de description passée en argument).

use std::time::Duration;

use anyhow::Result;
use upnpclient::{discover, Device, SearchOptions, SessionPolicy};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let devices = match std::env::args().nth(1) {
        Some(url) => vec![Device::from_url(&url, SessionPolicy::default())?],
        None => {
            let options = SearchOptions::with_timeout(Duration::from_secs(5));
            discover(&options, &SessionPolicy::default())?
        }
    };

    for device in &devices {
        println!(
            "{}: {}",
            device.friendly_name().unwrap_or("<unnamed>"),
            device
                .description()
                .model_description
                .as_deref()
                .unwrap_or("")
        );
        for service in device.services() {
            println!("   {}", service.service_type);
            for action in service.actions() {
                println!("      {}", action.name);
                for (name, def) in &action.argsdef_in {
                    let valid: Vec<&str> =
                        def.allowed_values.iter().map(String::as_str).collect();
                    let valid = if valid.is_empty() {
                        "*".to_string()
                    } else {
                        valid.join(", ")
                    };
                    println!("          in: {} ({}): {}", name, def.datatype, valid);
                }
                for (name, def) in &action.argsdef_out {
                    println!("         out: {} ({})", name, def.datatype);
                }
            }
        }
    }

    Ok(())
}
