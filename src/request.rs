//! PKCS#10 certificate requests and their certificate templates.

use std::net::IpAddr;

use bon::Builder;
use der::asn1::{Any, BitString, SetOfVec};
use der::{Decode, Encode};
use serde::{Deserialize, Serialize};
use url::Url;
use x509_cert::attr::Attribute;
use x509_cert::request::{CertReq, CertReqInfo, ExtensionReq, Version};

use crate::cert::Result;
use crate::cert::algorithm::{PublicKeyAlgorithm, SignatureAlgorithm};
use crate::cert::extensions::{
    ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage, KeyUsages, SubjectAltName,
    ToAndFromX509Extension,
};
use crate::cert::params::{Extension, Subject};
use crate::cert::{Certificate, multi};
use crate::error::TemplateError;
use crate::key::{PublicKey, RequestSigner};
use crate::oid;
use crate::pem_utils;
use crate::sans::split_sans;

/// A certificate signing request.
///
/// Built from a parsed PKCS#10 request, or from a JSON/YAML template. Public
/// key and signature fields are never part of the serialized form.
#[derive(Clone, Debug, Default, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    #[builder(default)]
    #[serde(default)]
    pub version: u8,
    #[builder(default)]
    #[serde(default)]
    pub subject: Subject,
    #[builder(default)]
    #[serde(default, deserialize_with = "multi::deserialize")]
    pub dns_names: Vec<String>,
    #[builder(default)]
    #[serde(default, deserialize_with = "multi::deserialize")]
    pub email_addresses: Vec<String>,
    #[builder(default)]
    #[serde(default, deserialize_with = "multi::deserialize")]
    pub ip_addresses: Vec<IpAddr>,
    #[builder(default)]
    #[serde(default, deserialize_with = "multi::deserialize")]
    pub uris: Vec<Url>,
    #[builder(default)]
    #[serde(default, deserialize_with = "multi::deserialize")]
    pub extensions: Vec<Extension>,
    #[serde(skip)]
    pub public_key: Option<PublicKey>,
    #[builder(default)]
    #[serde(skip)]
    pub public_key_algorithm: PublicKeyAlgorithm,
    #[builder(default)]
    #[serde(skip)]
    pub signature: Vec<u8>,
    #[builder(default)]
    #[serde(skip)]
    pub signature_algorithm: SignatureAlgorithm,
}

impl CertificateRequest {
    /// Copies a parsed PKCS#10 request.
    ///
    /// Requested extensions are read from the extensionRequest attribute and
    /// kept verbatim. The subject alternative names are also decoded out of
    /// them.
    pub fn from_x509(csr: &CertReq) -> Result<Self> {
        let extensions = requested_extensions(&csr.info)?;

        let mut names = SubjectAltName::default();
        for ext in extensions.iter().filter(|ext| ext.oid == SubjectAltName::OID) {
            let san: SubjectAltName = ext.to_extension()?;
            names.dns_names.extend(san.dns_names);
            names.email_addresses.extend(san.email_addresses);
            names.ip_addresses.extend(san.ip_addresses);
            names.uris.extend(san.uris);
        }

        let public_key = PublicKey::from_x509spki(&csr.info.public_key)?;
        Ok(Self {
            version: csr.info.version as u8,
            subject: Subject::from_x509_name(&csr.info.subject),
            dns_names: names.dns_names,
            email_addresses: names.email_addresses,
            ip_addresses: names.ip_addresses,
            uris: names.uris,
            extensions,
            public_key_algorithm: public_key.algorithm(),
            public_key: Some(public_key),
            signature: csr.signature.raw_bytes().to_vec(),
            signature_algorithm: SignatureAlgorithm::from_algorithm_identifier(&csr.algorithm),
        })
    }

    /// Parses a DER-encoded PKCS#10 request.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let csr = CertReq::from_der(der)?;
        let request = Self::from_x509(&csr)?;
        log::debug!(
            "parsed certificate request for {:?}",
            request.subject.common_name
        );
        Ok(request)
    }

    /// Parses a PEM-encoded PKCS#10 request.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem, &["CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST"])?;
        Self::from_der(&der)
    }

    /// The certificate template of this request.
    ///
    /// Subject, names, extensions and public key are copied. The signature
    /// fields are dropped, as are key usage and extended key usage.
    pub fn get_certificate(&self) -> Certificate {
        Certificate {
            subject: self.subject.clone(),
            dns_names: self.dns_names.clone(),
            email_addresses: self.email_addresses.clone(),
            ip_addresses: self.ip_addresses.clone(),
            uris: self.uris.clone(),
            extensions: self.extensions.clone(),
            public_key: self.public_key.clone(),
            public_key_algorithm: self.public_key_algorithm,
            ..Default::default()
        }
    }

    /// The template of a TLS leaf certificate for this request.
    ///
    /// Key usage is digital signature, plus key encipherment for RSA keys.
    /// Extended key usage is server auth then client auth.
    pub fn get_leaf_certificate(&self) -> Certificate {
        let mut key_usage = KeyUsage(KeyUsages::DigitalSignature.into());
        if let Some(PublicKey::Rsa(_)) = self.public_key {
            key_usage.0 |= KeyUsages::KeyEncipherment;
        }

        let mut cert = self.get_certificate();
        cert.key_usage = key_usage;
        cert.ext_key_usage = ExtendedKeyUsage {
            usage: vec![
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::ClientAuth,
            ],
        };
        log::debug!(
            "leaf template for {:?} with key usage {:?}",
            cert.subject.common_name,
            cert.key_usage.0
        );
        cert
    }
}

fn requested_extensions(info: &CertReqInfo) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();
    for attr in info.attributes.iter().filter(|attr| attr.oid == oid::EXTENSION_REQUEST) {
        for value in attr.values.iter() {
            let req = ExtensionReq::from_der(&value.to_der()?)?;
            extensions.extend(req.0.iter().map(Extension::from_x509));
        }
    }
    Ok(extensions)
}

/// Builds and signs a DER-encoded PKCS#10 request.
///
/// The subject holds only `common_name`. `sans` are classified with
/// [`split_sans`] and requested through the extensionRequest attribute.
pub fn encode_certificate_request<S: AsRef<str>>(
    common_name: &str,
    sans: &[S],
    signer: &dyn RequestSigner,
) -> Result<Vec<u8>> {
    let subject = Subject::builder()
        .common_name(common_name.to_string())
        .build();
    let names = split_sans(sans);

    let mut attributes = SetOfVec::new();
    if !names.is_empty() {
        // With no subject the names identify the key, so they must be critical.
        let san = Extension::from_extension(&names, subject.is_empty())?;
        let req = ExtensionReq(vec![san.to_x509()?]);
        attributes.insert(Attribute {
            oid: oid::EXTENSION_REQUEST,
            values: SetOfVec::try_from(vec![Any::encode_from(&req)?])?,
        })?;
    }

    let info = CertReqInfo {
        version: Version::V1,
        subject: subject.to_x509_name()?,
        public_key: signer.public_key().as_spki()?,
        attributes,
    };

    let algorithm = signer.signature_algorithm().to_algorithm_identifier()?;
    let signature = signer.sign(&info.to_der()?)?;
    let csr = CertReq {
        info,
        algorithm,
        signature: BitString::from_bytes(&signature)?,
    };
    Ok(csr.to_der()?)
}

/// Creates a signed certificate request for `common_name` and `sans`.
///
/// Encoding and signing failures come back as
/// [`TemplateError::RequestCreation`]. The signed request is parsed back
/// before it is returned; a failure there is a
/// [`TemplateError::InvariantViolation`].
pub fn create_certificate_request<S: AsRef<str>>(
    common_name: &str,
    sans: &[S],
    signer: &dyn RequestSigner,
) -> Result<CertificateRequest> {
    let der = encode_certificate_request(common_name, sans, signer)
        .map_err(|e| TemplateError::RequestCreation(Box::new(e)))?;
    log::debug!(
        "signed certificate request for {common_name:?} with {}",
        signer.signature_algorithm()
    );
    CertificateRequest::from_der(&der).map_err(|e| TemplateError::InvariantViolation(e.to_string()))
}
