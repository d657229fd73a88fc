#![allow(dead_code)]

use certtemplate::cert::Result;
use certtemplate::cert::algorithm::SignatureAlgorithm;
use certtemplate::error::TemplateError;
use certtemplate::key::{KeyPair, PublicKey, RequestSigner};

pub const SANS: [&str; 3] = ["example.com", "1.2.3.4", "a@example.com"];

pub fn generate_rsa_key() -> KeyPair {
    KeyPair::generate_rsa(2048).expect("Failed to generate RSA key")
}

/// A signer whose token is unplugged.
pub struct FailingSigner {
    pub key: KeyPair,
}

impl RequestSigner for FailingSigner {
    fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.key.signature_algorithm()
    }

    fn sign(&self, _message: &[u8]) -> Result<Vec<u8>> {
        Err(TemplateError::SigningError("token not present".to_string()))
    }
}

pub fn write_debug_pem(name: &str, pem: &str) {
    use std::io::Write;
    std::fs::create_dir_all(".debug_certs").unwrap();
    std::fs::File::create(format!(".debug_certs/{name}"))
        .unwrap()
        .write_all(pem.as_bytes())
        .unwrap();
}
