//! Bibliothèque control point UPnP.
//!
//! Le flot habituel :
//!
//! 1. [`ssdp::search`] envoie un M-SEARCH multicast et collecte les
//!    réponses uniques (une par USN) dans le budget de temps donné ;
//! 2. [`Device::from_url`] (ou [`discover`], qui enchaîne les deux) va
//!    chercher la description du device puis le SCPD de chaque service,
//!    et matérialise un arbre navigable avec des signatures d'action
//!    typées ;
//! 3. [`Device::call_action`] valide et encode les arguments, POSTe
//!    l'enveloppe SOAP sur le controlURL, et décode les arguments de
//!    sortie.
//!
//! ```no_run
//! use upnpclient::{Device, SessionPolicy};
//!
//! # fn main() -> Result<(), upnpclient::Error> {
//! let device = Device::from_url("http://192.168.1.1:5000/rootDesc.xml", SessionPolicy::default())?;
//! let out = device.call_action(
//!     "WANIPConn1",
//!     "GetExternalIPAddress",
//!     &[],
//!     None,
//! )?;
//! println!("{:?}", out.get("NewExternalIPAddress"));
//! # Ok(())
//! # }
//! ```

mod device;
mod errors;
mod http;
mod session;
mod soap_client;

pub mod description;
pub mod soap;
pub mod ssdp;
pub mod value_ranges;
pub mod variable_types;

use tracing::warn;

pub use crate::device::{Action, ActionOutput, Device, Service};
pub use crate::errors::Error;
pub use crate::session::{CallOverrides, ClientCertPair, HttpAuth, SessionPolicy};
pub use crate::soap_client::{invoke_upnp_action, SoapCallResult};
pub use crate::ssdp::{SearchOptions, SsdpResponse};

/// Découvre les devices UPnP du réseau et les matérialise.
///
/// Chaque réponse SSDP unique est promue en [`Device`] avec `policy` ;
/// les emplacements injoignables ou illisibles sont ignorés (avec un
/// warning), et les doublons d'UDN sont éliminés. Les LOCATION en
/// `https://` ne sont pas sondées.
pub fn discover(
    options: &ssdp::SearchOptions,
    policy: &SessionPolicy,
) -> Result<Vec<Device>, Error> {
    let mut options = options.clone();
    if options.ssdp_in_port.is_none() {
        options.ssdp_in_port = policy.ssdp_in_port;
    }

    let mut devices: Vec<Device> = Vec::new();
    for response in ssdp::search(&options)? {
        if response.location.to_ascii_lowercase().starts_with("https://") {
            warn!(
                "skipping HTTPS location {} (not probed during discovery)",
                response.location
            );
            continue;
        }
        match Device::from_url(&response.location, policy.clone()) {
            Ok(device) => {
                let duplicate = match device.udn() {
                    Some(udn) => devices.iter().any(|d| d.udn() == Some(udn)),
                    None => false,
                };
                if !duplicate {
                    devices.push(device);
                }
            }
            Err(e) => {
                warn!("error '{}' for {}", e, response.location);
            }
        }
    }
    Ok(devices)
}
