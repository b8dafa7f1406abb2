//! Boucle de recherche M-SEARCH multi-interfaces.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, trace, warn};

use super::{SsdpResponse, SSDP_MULTICAST_ADDR, SSDP_PORT, ST_ALL};
use crate::errors::Error;

/// Granularité de la boucle de réception (la deadline est respectée même
/// sans trafic).
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Paramètres d'une recherche SSDP.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Budget global de la recherche.
    pub timeout: Duration,
    /// Valeur MX du M-SEARCH (délai max de réponse demandé aux devices).
    /// Défaut : `min(timeout, 2)`. Doit rester ≤ `timeout`.
    pub mx: Option<u32>,
    /// Search target (défaut `ssdp:all`).
    pub st: Option<String>,
    /// Port UDP local fixe (éphémère si absent).
    pub ssdp_in_port: Option<u16>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            mx: None,
            st: None,
            ssdp_in_port: None,
        }
    }
}

impl SearchOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Recherche sur toutes les interfaces IPv4 non-loopback de l'hôte.
///
/// Une socket par interface : beaucoup d'OS ne délivrent les réponses
/// multicast que sur la socket dont `IP_MULTICAST_IF` correspond à la
/// route sortante ; une socket unique bindée sur 0.0.0.0 perd
/// silencieusement les devices des interfaces secondaires.
pub fn search(options: &SearchOptions) -> Result<Vec<SsdpResponse>, Error> {
    let addrs = local_ipv4_addresses()?;
    if addrs.is_empty() {
        return Err(Error::discovery("no usable IPv4 interface"));
    }
    search_on_addrs(&addrs, options)
}

/// Recherche sur des adresses locales explicites.
pub fn search_on_addrs(
    addrs: &[Ipv4Addr],
    options: &SearchOptions,
) -> Result<Vec<SsdpResponse>, Error> {
    let timeout_secs = options.timeout.as_secs();
    let mx = options.mx.unwrap_or_else(|| timeout_secs.min(2) as u32);
    if u64::from(mx) > timeout_secs {
        return Err(Error::validation(format!(
            "MX ({}) must not exceed the discovery timeout ({}s)",
            mx, timeout_secs
        )));
    }
    let st = options.st.as_deref().unwrap_or(ST_ALL);
    let port = options.ssdp_in_port.unwrap_or(0);

    let request = msearch_request(st, mx);
    let target: SocketAddr = format!("{}:{}", SSDP_MULTICAST_ADDR, SSDP_PORT)
        .parse()
        .map_err(|e| Error::discovery(format!("bad multicast target: {}", e)))?;

    // Une socket par adresse ; un échec de bind n'abandonne pas la
    // découverte tant qu'au moins une socket reste utilisable.
    let mut sockets: Vec<UdpSocket> = Vec::new();
    for addr in addrs {
        match open_search_socket(*addr, port) {
            Ok(socket) => {
                debug!("SSDP: socket ready on {}:{}", addr, port);
                sockets.push(socket);
            }
            Err(e) => {
                warn!("SSDP: cannot open socket on {}: {}", addr, e);
            }
        }
    }
    if sockets.is_empty() {
        return Err(Error::discovery(format!(
            "no SSDP socket could be opened on {:?} port {}",
            addrs, port
        )));
    }

    for socket in &sockets {
        match socket.send_to(&request, target) {
            Ok(_) => {
                info!("📤 M-SEARCH sent (ST={}, MX={})", st, mx);
            }
            Err(e) => {
                // La socket reste dans la boucle de réception : des
                // réponses peuvent encore arriver en unicast.
                warn!("❌ Failed to send M-SEARCH: {}", e);
            }
        }
    }

    // Les sockets sont fermées au drop, quel que soit le chemin de sortie.
    Ok(receive_until_deadline(&sockets, options.timeout))
}

/// Requête M-SEARCH, CRLF comprises. Format figé par le protocole.
fn msearch_request(st: &str, mx: u32) -> Vec<u8> {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}:{}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, SSDP_PORT, mx, st
    )
    .into_bytes()
}

fn open_search_socket(addr: Ipv4Addr, port: u16) -> std::io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_multicast_if_v4(&addr)?;
    socket.set_multicast_ttl_v4(2)?;
    let bind_addr = SocketAddr::from(SocketAddrV4::new(addr, port));
    socket.bind(&bind_addr.into())?;

    let socket: UdpSocket = socket.into();
    socket.set_nonblocking(true)?;
    Ok(socket)
}

fn receive_until_deadline(sockets: &[UdpSocket], timeout: Duration) -> Vec<SsdpResponse> {
    let deadline = Instant::now() + timeout;
    let mut seen_usn: HashSet<String> = HashSet::new();
    let mut responses: Vec<SsdpResponse> = Vec::new();
    let mut buf = [0u8; 8192];

    while Instant::now() < deadline {
        let mut received_any = false;

        for socket in sockets {
            loop {
                match socket.recv_from(&mut buf) {
                    Ok((n, from)) => {
                        received_any = true;
                        let data = String::from_utf8_lossy(&buf[..n]);
                        match SsdpResponse::parse(&data, from) {
                            Some(response) => {
                                if seen_usn.insert(response.usn.clone()) {
                                    debug!(
                                        "📥 SSDP response from {} (USN={})",
                                        from, response.usn
                                    );
                                    responses.push(response);
                                } else {
                                    trace!("duplicate USN {} from {}", response.usn, from);
                                }
                            }
                            None => {
                                trace!("unparseable SSDP datagram from {}", from);
                            }
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                    Err(e) => {
                        warn!("❌ SSDP read error: {}", e);
                        break;
                    }
                }
            }
        }

        if !received_any {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(POLL_INTERVAL));
        }
    }

    responses
}

fn local_ipv4_addresses() -> Result<Vec<Ipv4Addr>, Error> {
    let mut addrs = Vec::new();
    for iface in get_if_addrs::get_if_addrs()
        .map_err(|e| Error::discovery(format!("cannot enumerate interfaces: {}", e)))?
    {
        if let IpAddr::V4(ipv4) = iface.ip() {
            if !ipv4.is_loopback() && !addrs.contains(&ipv4) {
                addrs.push(ipv4);
            }
        }
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msearch_request_is_bit_exact() {
        let req = msearch_request("ssdp:all", 2);
        assert_eq!(
            String::from_utf8(req).unwrap(),
            "M-SEARCH * HTTP/1.1\r\nHOST: 239.255.255.250:1900\r\nMAN: \"ssdp:discover\"\r\nMX: 2\r\nST: ssdp:all\r\n\r\n"
        );
    }

    #[test]
    fn mx_above_timeout_is_rejected() {
        let options = SearchOptions {
            timeout: Duration::from_secs(2),
            mx: Some(5),
            ..SearchOptions::default()
        };
        let err = search_on_addrs(&[Ipv4Addr::LOCALHOST], &options).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
