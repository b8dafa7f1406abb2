//! # Module SOAP - Simple Object Access Protocol
//!
//! Côté control point : construction de la requête SOAP 1.1 d'une action
//! UPnP, parsing de l'enveloppe de réponse et des SOAP Faults.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction de requêtes d'action (arguments ordonnés)
//! - ✅ Parsing d'enveloppes SOAP (tolérant aux préfixes de namespace)
//! - ✅ Extraction des SOAP Faults avec le détail UPnPError
//! - ✅ Nettoyage des déclarations XML surnuméraires renvoyées par
//!   certains devices
//!
//! ## Architecture
//!
//! - [`SoapEnvelope`] : Enveloppe SOAP complète
//! - [`SoapFault`] : Erreur SOAP parsée (faultcode, faultstring, UPnPError)

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::build_soap_request;
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{parse_soap_fault, SoapFault, UpnpError};
pub use parser::{parse_soap_envelope, SoapParseError};

/// Namespace de l'enveloppe SOAP 1.1
pub const NS_SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Style d'encodage SOAP
pub const ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";
