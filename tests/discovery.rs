//! Découverte SSDP contre un répondeur UDP local : corrélation des
//! réponses, déduplication par USN, respect de la deadline.

use std::net::{Ipv4Addr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use upnpclient::ssdp::{search_on_addrs, SearchOptions};

fn response_datagram(usn: &str, location: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         CACHE-CONTROL: max-age=1800\r\n\
         EXT:\r\n\
         LOCATION: {}\r\n\
         SERVER: Linux/3.4 UPnP/1.1 Test/1.0\r\n\
         ST: upnp:rootdevice\r\n\
         USN: {}\r\n\
         \r\n",
        location, usn
    )
}

/// Envoie des datagrammes vers la socket de découverte après un court
/// délai, comme le ferait un device répondant au M-SEARCH.
fn spawn_responder(port: u16, datagrams: Vec<String>) {
    thread::spawn(move || {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("responder socket");
        thread::sleep(Duration::from_millis(300));
        for datagram in datagrams {
            socket
                .send_to(datagram.as_bytes(), ("127.0.0.1", port))
                .expect("send response");
            thread::sleep(Duration::from_millis(50));
        }
    });
}

#[test]
fn duplicate_usn_keeps_the_first_response() {
    let port = 41923;
    spawn_responder(
        port,
        vec![
            response_datagram("uuid:A::upnp:rootdevice", "http://10.0.0.1:80/desc.xml"),
            response_datagram("uuid:A::upnp:rootdevice", "http://10.0.0.2:80/desc.xml"),
        ],
    );

    let options = SearchOptions {
        timeout: Duration::from_secs(2),
        mx: Some(1),
        st: None,
        ssdp_in_port: Some(port),
    };
    let responses = search_on_addrs(&[Ipv4Addr::LOCALHOST], &options).expect("search");

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].usn, "uuid:A::upnp:rootdevice");
    assert_eq!(responses[0].location, "http://10.0.0.1:80/desc.xml");
}

#[test]
fn distinct_usns_are_all_collected() {
    let port = 41931;
    spawn_responder(
        port,
        vec![
            response_datagram("uuid:A::upnp:rootdevice", "http://10.0.0.1:80/desc.xml"),
            response_datagram("uuid:B::upnp:rootdevice", "http://10.0.0.2:80/desc.xml"),
        ],
    );

    let options = SearchOptions {
        timeout: Duration::from_secs(2),
        mx: Some(1),
        st: None,
        ssdp_in_port: Some(port),
    };
    let responses = search_on_addrs(&[Ipv4Addr::LOCALHOST], &options).expect("search");

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().any(|r| r.usn.contains("uuid:A")));
    assert!(responses.iter().any(|r| r.usn.contains("uuid:B")));
    assert_eq!(responses[0].udn().as_deref(), Some("uuid:a"));
}

#[test]
fn malformed_datagrams_are_ignored() {
    let port = 41937;
    spawn_responder(
        port,
        vec![
            "not http at all".to_string(),
            "HTTP/1.1 404 Not Found\r\n\r\n".to_string(),
            response_datagram("uuid:C::upnp:rootdevice", "http://10.0.0.3:80/desc.xml"),
        ],
    );

    let options = SearchOptions {
        timeout: Duration::from_secs(2),
        mx: Some(1),
        st: None,
        ssdp_in_port: Some(port),
    };
    let responses = search_on_addrs(&[Ipv4Addr::LOCALHOST], &options).expect("search");

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].usn, "uuid:C::upnp:rootdevice");
}

#[test]
fn deadline_is_respected_without_any_responder() {
    let options = SearchOptions {
        timeout: Duration::from_secs(1),
        mx: Some(1),
        st: None,
        ssdp_in_port: Some(41941),
    };
    let started = Instant::now();
    let responses = search_on_addrs(&[Ipv4Addr::LOCALHOST], &options).expect("search");
    let elapsed = started.elapsed();

    assert!(responses.is_empty());
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(3));
}
