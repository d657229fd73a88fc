//! # certtemplate - X.509 certificate request and template handling
//!
//! certtemplate turns PKCS#10 certificate requests into certificate templates
//! and creates new signed requests, built entirely with rustcrypto libraries.
//!
//! ## Supported Key Types
//!
//! - **RSA**: signed with SHA256-RSA (PKCS#1 v1.5)
//! - **ECDSA**: P-256 and P-384 curves
//! - **Ed25519**: Edwards curve digital signature algorithm
//!
//! ## Key Features
//!
//! - **Signature algorithm names**: a fixed registry of canonical names such as
//!   `ECDSA-SHA256`, used as the JSON form of [`cert::algorithm::SignatureAlgorithm`]
//! - **Request projection**: [`request::CertificateRequest::get_certificate`] and
//!   [`request::CertificateRequest::get_leaf_certificate`]
//! - **Request creation**: [`request::create_certificate_request`] with any
//!   [`key::RequestSigner`]
//! - **Templates**: requests and certificates deserialize from JSON or YAML
//!
//! ## Quick Start
//!
//! ### Creating a Certificate Request
//!
//! ```rust,no_run
//! use certtemplate::{key::KeyPair, request::create_certificate_request};
//!
//! # fn main() -> Result<(), certtemplate::error::TemplateError> {
//! let key_pair = KeyPair::generate_ecdsa_p256();
//! let request = create_certificate_request(
//!     "example.com",
//!     &["example.com", "1.2.3.4", "admin@example.com"],
//!     &key_pair,
//! )?;
//! assert_eq!(request.subject.common_name, "example.com");
//! # Ok(())
//! # }
//! ```
//!
//! ### Building a Leaf Certificate Template
//!
//! ```rust,no_run
//! use certtemplate::request::CertificateRequest;
//!
//! # fn main() -> Result<(), certtemplate::error::TemplateError> {
//! # let pem = "";
//! let request = CertificateRequest::from_pem(pem)?;
//! let template = request.get_leaf_certificate();
//! println!("{}", serde_json::to_string_pretty(&template)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Signature Algorithm Names
//!
//! ```rust
//! use certtemplate::cert::algorithm::SignatureAlgorithm;
//!
//! let algorithm = SignatureAlgorithm::from_json(br#""ecdsa-sha256""#).unwrap();
//! assert_eq!(algorithm, SignatureAlgorithm::EcdsaWithSha256);
//! assert_eq!(algorithm.to_json(), r#""ECDSA-SHA256""#);
//! assert_eq!(SignatureAlgorithm::Unknown.to_json(), r#""""#);
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use certtemplate::{cert::algorithm::SignatureAlgorithm, error::TemplateError};
//!
//! match SignatureAlgorithm::from_json(b"0") {
//!     Err(TemplateError::InvalidType(found)) => println!("not a string: {}", found),
//!     Err(TemplateError::UnsupportedSignatureAlgorithm(name)) => println!("unknown {}", name),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(algorithm) => println!("{}", algorithm),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`cert`]: Certificate templates, signature algorithms and extensions
//! - [`request`]: Certificate requests, projection and creation
//! - [`key`]: Public keys, key pairs and the request signer trait
//! - [`sans`]: Classification of subject alternative names
//! - [`error`]: Error types

pub mod cert;
pub mod error;
pub mod key;
pub mod oid;
pub mod pem_utils;
pub mod request;
pub mod sans;
