//! Politique de session HTTP : auth, en-têtes, timeout, TLS.
//!
//! Trois couches, la plus proche de l'appel gagne :
//! surcharges par appel → valeurs du device → défauts de la bibliothèque.
//! Un `Some(None)` dans [`CallOverrides`] supprime explicitement la valeur
//! du device (ex: un appel sans Authorization sur un device authentifié).

use std::collections::HashMap;
use std::time::Duration;

/// Timeout par défaut des requêtes HTTP et SOAP.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifiants HTTP Basic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAuth {
    pub username: String,
    pub password: String,
}

impl HttpAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Certificat client TLS : chemins d'un certificat et d'une clé PEM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertPair {
    pub cert_path: String,
    pub key_path: String,
}

/// Réglages appliqués uniformément au fetch de description, aux fetches
/// SCPD et aux POST SOAP d'un device.
#[derive(Debug, Clone, Default)]
pub struct SessionPolicy {
    pub http_auth: Option<HttpAuth>,
    pub http_headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub allow_self_signed_ssl: bool,
    pub cert: Option<ClientCertPair>,
    /// Port UDP local fixe pour la réception SSDP (éphémère sinon).
    pub ssdp_in_port: Option<u16>,
}

impl SessionPolicy {
    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.http_auth = Some(auth);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn allow_self_signed_ssl(mut self, allow: bool) -> Self {
        self.allow_self_signed_ssl = allow;
        self
    }

    pub fn with_cert(mut self, cert: ClientCertPair) -> Self {
        self.cert = Some(cert);
        self
    }

    pub fn with_ssdp_in_port(mut self, port: u16) -> Self {
        self.ssdp_in_port = Some(port);
        self
    }

    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_HTTP_TIMEOUT)
    }

    /// Applique des surcharges par appel et rend la politique effective.
    pub fn layered(&self, overrides: Option<&CallOverrides>) -> SessionPolicy {
        let mut effective = self.clone();
        let Some(overrides) = overrides else {
            return effective;
        };

        if let Some(auth) = &overrides.http_auth {
            effective.http_auth = auth.clone();
        }
        if let Some(headers) = &overrides.http_headers {
            effective.http_headers = headers.clone();
        }
        if let Some(timeout) = &overrides.timeout {
            effective.timeout = *timeout;
        }
        effective
    }
}

/// Surcharges par appel. `None` = hériter du device ; `Some(None)` =
/// supprimer la valeur du device pour cet appel.
#[derive(Debug, Clone, Default)]
pub struct CallOverrides {
    pub http_auth: Option<Option<HttpAuth>>,
    pub http_headers: Option<HashMap<String, String>>,
    pub timeout: Option<Option<Duration>>,
}

impl CallOverrides {
    pub fn auth(mut self, auth: HttpAuth) -> Self {
        self.http_auth = Some(Some(auth));
        self
    }

    /// Envoie l'appel sans Authorization même si le device en a une.
    pub fn no_auth(mut self) -> Self {
        self.http_auth = Some(None);
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.http_headers = Some(headers);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(Some(timeout));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_keeps_device_policy() {
        let policy = SessionPolicy::default()
            .with_auth(HttpAuth::new("admin", "secret"))
            .with_timeout(Duration::from_secs(5));
        let effective = policy.layered(None);
        assert!(effective.http_auth.is_some());
        assert_eq!(effective.effective_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn explicit_none_suppresses_device_auth() {
        let policy = SessionPolicy::default().with_auth(HttpAuth::new("admin", "secret"));
        let effective = policy.layered(Some(&CallOverrides::default().no_auth()));
        assert!(effective.http_auth.is_none());
    }

    #[test]
    fn per_call_auth_wins() {
        let policy = SessionPolicy::default().with_auth(HttpAuth::new("admin", "secret"));
        let effective = policy.layered(Some(
            &CallOverrides::default().auth(HttpAuth::new("other", "pw")),
        ));
        assert_eq!(effective.http_auth.unwrap().username, "other");
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(
            SessionPolicy::default().effective_timeout(),
            Duration::from_secs(30)
        );
    }
}
