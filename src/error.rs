//! use certtemplate::error::TemplateError;

use thiserror::Error;

/// Represents errors that can occur in the certtemplate library.
///
/// This enum provides detailed error messages for various failure scenarios.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// A signature algorithm was given as a JSON value that is not a string.
    #[error("invalid signature algorithm: expected a string, found {0}")]
    InvalidType(&'static str),

    /// A signature algorithm name has no match in the algorithm table.
    #[error("unsupported signature algorithm {0}")]
    UnsupportedSignatureAlgorithm(String),

    /// Encoding or signing a new certificate request failed.
    #[error("error creating certificate request: {0}")]
    RequestCreation(#[source] Box<TemplateError>),

    /// A certificate request we just produced could not be parsed back.
    #[error("certificate request does not round trip: {0}")]
    InvariantViolation(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Error returned by a signer.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Error from JSON (de)serialization.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error from PEM parsing.
    #[error("PEM error: {0}")]
    PemError(String),
}

impl From<der::Error> for TemplateError {
    /// Converts a `der::Error` into a `TemplateError`.
    fn from(err: der::Error) -> Self {
        TemplateError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for TemplateError {
    fn from(err: pkcs8::spki::Error) -> Self {
        TemplateError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for TemplateError {
    fn from(err: pkcs8::Error) -> Self {
        TemplateError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for TemplateError {
    fn from(err: rsa::Error) -> Self {
        TemplateError::RsaError(err.to_string())
    }
}

impl From<rsa::signature::Error> for TemplateError {
    fn from(err: rsa::signature::Error) -> Self {
        TemplateError::SigningError(err.to_string())
    }
}

impl From<pem::PemError> for TemplateError {
    fn from(err: pem::PemError) -> Self {
        TemplateError::PemError(err.to_string())
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::JsonError(err.to_string())
    }
}

impl From<url::ParseError> for TemplateError {
    fn from(err: url::ParseError) -> Self {
        TemplateError::DecodingError(err.to_string())
    }
}
