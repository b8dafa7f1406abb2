//! Parsing des réponses M-SEARCH.

use std::collections::HashMap;
use std::net::SocketAddr;

use tracing::trace;

use super::MAX_AGE;

/// Une réponse M-SEARCH (`HTTP/1.1 200 OK` sur UDP).
///
/// Les en-têtes reconnus sont extraits dans des champs dédiés ; tous les
/// en-têtes, connus ou non, restent disponibles dans [`headers`]
/// (clés en majuscules).
///
/// [`headers`]: SsdpResponse::headers
#[derive(Debug, Clone)]
pub struct SsdpResponse {
    /// URL de la description du device (en-tête LOCATION).
    pub location: String,
    /// Bannière SERVER.
    pub server: Option<String>,
    /// Search target renvoyé (ST).
    pub st: Option<String>,
    /// Unique Service Name : identité pour la déduplication.
    pub usn: String,
    /// Durée de validité en secondes (CACHE-CONTROL: max-age=), 1800 par
    /// défaut.
    pub max_age: u32,
    /// En-tête HOST.
    pub host: Option<String>,
    /// En-tête EXT.
    pub ext: Option<String>,
    /// Tous les en-têtes, clés en majuscules.
    pub headers: HashMap<String, String>,
    /// Adresse source du datagramme.
    pub from: SocketAddr,
}

impl SsdpResponse {
    /// Parse un datagramme ; `None` si ce n'est pas une réponse 200 OK
    /// portant les en-têtes obligatoires (USN, LOCATION).
    pub fn parse(data: &str, from: SocketAddr) -> Option<SsdpResponse> {
        let mut lines = data.lines();
        let status_line = lines.next()?.trim();
        let upper = status_line.to_ascii_uppercase();
        if !(upper.starts_with("HTTP/") && upper.contains(" 200 ")) {
            trace!("not an M-SEARCH response from {}: {}", from, status_line);
            return None;
        }

        let headers = parse_headers(lines);

        let usn = match headers.get("USN") {
            Some(usn) => usn.clone(),
            None => {
                trace!("M-SEARCH response from {} missing USN header, ignoring", from);
                return None;
            }
        };
        let location = match headers.get("LOCATION") {
            Some(location) => location.clone(),
            None => {
                trace!(
                    "M-SEARCH response from {} missing LOCATION header, ignoring",
                    from
                );
                return None;
            }
        };

        Some(SsdpResponse {
            location,
            server: headers.get("SERVER").cloned(),
            st: headers.get("ST").cloned(),
            usn,
            max_age: parse_max_age(headers.get("CACHE-CONTROL")),
            host: headers.get("HOST").cloned(),
            ext: headers.get("EXT").cloned(),
            headers,
            from,
        })
    }

    /// UDN (`uuid:...`) extrait du USN, en minuscules.
    pub fn udn(&self) -> Option<String> {
        extract_udn_from_usn(&self.usn)
    }
}

fn parse_headers<'a, I>(lines: I) -> HashMap<String, String>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();

        // Empty line marks end of headers
        if line.is_empty() {
            break;
        }

        // Split on first ':' only (values may contain ':')
        if let Some(colon_pos) = line.find(':') {
            let (name, value_with_colon) = line.split_at(colon_pos);
            let value = &value_with_colon[1..];

            let name = name.trim().to_ascii_uppercase();
            let value = value.trim().to_string();

            if !name.is_empty() {
                headers.insert(name, value);
            }
        } else {
            trace!("Skipping line without colon: '{}'", line);
        }
    }
    headers
}

fn parse_max_age(value: Option<&String>) -> u32 {
    if let Some(v) = value {
        let lower = v.to_ascii_lowercase();
        if let Some(idx) = lower.find("max-age") {
            let after_key = &v[idx + 7..];
            let after_eq = after_key.trim_start().trim_start_matches('=').trim_start();
            let digits: String = after_eq
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(age) = digits.parse::<u32>() {
                return age;
            }
        }
        trace!(
            "Could not parse max-age from CACHE-CONTROL: '{}', using default {}",
            v,
            MAX_AGE
        );
    }
    MAX_AGE
}

fn extract_udn_from_usn(usn: &str) -> Option<String> {
    let lower = usn.trim().to_ascii_lowercase();
    if let Some(idx) = lower.find("uuid:") {
        let sub = &lower[idx..];
        if let Some(end) = sub.find("::") {
            Some(sub[..end].to_string())
        } else {
            Some(sub.to_string())
        }
    } else {
        None
    }
}
