use thiserror::Error;

use crate::variable_types::StateValueError;

/// Erreurs publiques de la bibliothèque, une variante par famille.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad argument value, missing/unknown argument, out-of-range value.
    /// Always raised before any network I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed XML, missing required element, dangling relatedStateVariable.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Connection refused, DNS failure, TLS handshake failure, socket errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation deadline exceeded.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-2xx HTTP response without a parseable SOAP fault body.
    #[error("HTTP error {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// SOAP <Fault> returned by the device, typically with an embedded
    /// UPnPError code/description.
    #[error("SOAP fault {fault_code:?}: {fault_string:?} (UPnP error {error_code:?}: {error_description:?})")]
    SoapFault {
        fault_code: Option<String>,
        fault_string: Option<String>,
        error_code: Option<u32>,
        error_description: Option<String>,
    },

    /// No usable interface, invalid SSDP port, bad MX/timeout combination.
    #[error("Discovery error: {0}")]
    Discovery(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport(message.into())
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Error::Discovery(message.into())
    }
}

impl From<StateValueError> for Error {
    fn from(err: StateValueError) -> Self {
        Error::Validation(err.to_string())
    }
}

impl From<xmltree::ParseError> for Error {
    fn from(err: xmltree::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(kind) => Error::Timeout(kind.to_string()),
            other => Error::Transport(other.to_string()),
        }
    }
}
