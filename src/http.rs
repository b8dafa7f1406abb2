//! Client HTTP construit depuis une [`SessionPolicy`].
//!
//! Un agent est construit par requête : aucun état (connexion, en-tête
//! d'authentification) ne peut fuir d'un appel vers le suivant.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;
use ureq::tls::{Certificate, ClientCert, PrivateKey, TlsConfig};
use ureq::Agent;

use crate::errors::Error;
use crate::session::{ClientCertPair, SessionPolicy};

/// Construit un agent ureq appliquant timeout et réglages TLS de la
/// politique.
pub(crate) fn build_agent(policy: &SessionPolicy) -> Result<Agent, Error> {
    let mut builder = Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(policy.effective_timeout()));

    if policy.allow_self_signed_ssl || policy.cert.is_some() {
        let mut tls = TlsConfig::builder();
        if policy.allow_self_signed_ssl {
            tls = tls.disable_verification(true);
        }
        if let Some(pair) = &policy.cert {
            tls = tls.client_cert(Some(load_client_cert(pair)?));
        }
        builder = builder.tls_config(tls.build());
    }

    Ok(builder.build().into())
}

/// Charge la paire certificat/clé PEM. Les certificats construits par
/// ureq empruntent leurs octets pour 'static : chaque paire distincte
/// n'est lue et conservée qu'une fois par processus.
fn load_client_cert(pair: &ClientCertPair) -> Result<ClientCert, Error> {
    static LOADED: OnceLock<Mutex<HashMap<(String, String), ClientCert>>> = OnceLock::new();
    let cache = LOADED.get_or_init(|| Mutex::new(HashMap::new()));

    let key = (pair.cert_path.clone(), pair.key_path.clone());
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(cert) = cache.get(&key) {
        return Ok(cert.clone());
    }

    let cert_pem: &'static [u8] = Box::leak(
        std::fs::read(&pair.cert_path)
            .map_err(|e| {
                Error::transport(format!("cannot read client cert {}: {}", pair.cert_path, e))
            })?
            .into_boxed_slice(),
    );
    let key_pem: &'static [u8] = Box::leak(
        std::fs::read(&pair.key_path)
            .map_err(|e| {
                Error::transport(format!("cannot read client key {}: {}", pair.key_path, e))
            })?
            .into_boxed_slice(),
    );

    let cert = Certificate::from_pem(cert_pem)
        .map_err(|e| Error::transport(format!("invalid client cert: {}", e)))?;
    let private_key = PrivateKey::from_pem(key_pem)
        .map_err(|e| Error::transport(format!("invalid client key: {}", e)))?;
    let client_cert = ClientCert::new_with_certs(&[cert], private_key);

    cache.insert(key, client_cert.clone());
    Ok(client_cert)
}

/// Valeur de l'en-tête Authorization (Basic) pour la politique, s'il y a
/// des identifiants.
pub(crate) fn authorization_header(policy: &SessionPolicy) -> Option<String> {
    policy.http_auth.as_ref().map(|auth| {
        let credentials = format!("{}:{}", auth.username, auth.password);
        format!("Basic {}", STANDARD.encode(credentials))
    })
}

/// GET avec la politique appliquée ; utilisé pour la description racine et
/// les SCPD.
pub(crate) fn http_get(url: &str, policy: &SessionPolicy) -> Result<String, Error> {
    debug!(url, "HTTP GET");
    let agent = build_agent(policy)?;

    let mut request = agent.get(url);
    if let Some(authorization) = authorization_header(policy) {
        request = request.header("Authorization", authorization.as_str());
    }
    for (name, value) in &policy.http_headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let mut response = request.call()?;
    let status = response.status();
    let body = response.body_mut().read_to_string()?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        });
    }

    Ok(body)
}
