pub mod algorithm;
pub mod extensions;
pub(crate) mod multi;
pub mod params;

use crate::error::TemplateError;
pub type Result<T> = std::result::Result<T, TemplateError>;

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use url::Url;

use algorithm::{PublicKeyAlgorithm, SignatureAlgorithm};
use extensions::{ExtendedKeyUsage, KeyUsage};
use params::{Extension, Subject};

use crate::key::PublicKey;

/// Template of a certificate to be issued.
///
/// It is built from a certificate request or from a JSON/YAML document, and
/// holds no issuer, validity or serial number: those belong to the issuing
/// side. The public key is only ever set in memory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(default)]
    pub subject: Subject,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub dns_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub email_addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub ip_addresses: Vec<IpAddr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub uris: Vec<Url>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub extensions: Vec<Extension>,
    #[serde(default, skip_serializing_if = "KeyUsage::is_empty")]
    pub key_usage: KeyUsage,
    #[serde(default, rename = "extKeyUsage", skip_serializing_if = "ExtendedKeyUsage::is_empty")]
    pub ext_key_usage: ExtendedKeyUsage,
    #[serde(default, skip_serializing_if = "SignatureAlgorithm::is_unknown")]
    pub signature_algorithm: SignatureAlgorithm,
    #[serde(skip)]
    pub public_key: Option<PublicKey>,
    #[serde(skip)]
    pub public_key_algorithm: PublicKeyAlgorithm,
}
