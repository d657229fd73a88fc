use der::{Decode, Encode};
use ed25519_dalek::{SigningKey as Ed25519SigningKey, VerifyingKey as Ed25519VerifyingKey};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey, PrivateKeyInfo};
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::cert::Result;
use crate::cert::algorithm::{PublicKeyAlgorithm, SignatureAlgorithm};
use crate::error::TemplateError;
use crate::oid;

/// Public key of a certificate or request subject.
///
/// Keys this crate can use are decoded. Anything else is kept as its raw
/// `SubjectPublicKeyInfo`.
#[derive(Clone, Debug, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
    Ed25519(Ed25519VerifyingKey),
    Unknown(SubjectPublicKeyInfoOwned),
}

impl PublicKey {
    /// Classifies a `SubjectPublicKeyInfo`.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let der = spki.to_der()?;
        let key = match spki.algorithm.oid {
            oid::RSA_ENCRYPTION => PublicKey::Rsa(rsa_public_key(spki)?),
            oid::EC_PUBLIC_KEY => match curve(&spki.algorithm) {
                Some(oid::SECP256R1) => {
                    PublicKey::EcdsaP256(P256VerifyingKey::from_public_key_der(&der)?)
                }
                Some(oid::SECP384R1) => {
                    PublicKey::EcdsaP384(P384VerifyingKey::from_public_key_der(&der)?)
                }
                _ => PublicKey::Unknown(spki.clone()),
            },
            oid::ED25519 => PublicKey::Ed25519(Ed25519VerifyingKey::from_public_key_der(&der)?),
            _ => PublicKey::Unknown(spki.clone()),
        };
        Ok(key)
    }

    /// Encodes the key as a `SubjectPublicKeyInfo`.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone())?,
            PublicKey::EcdsaP256(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
            PublicKey::EcdsaP384(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
            PublicKey::Ed25519(verifying_key) => SubjectPublicKeyInfoOwned {
                algorithm: AlgorithmIdentifierOwned {
                    oid: oid::ED25519,
                    parameters: None,
                },
                subject_public_key: der::asn1::BitString::from_bytes(verifying_key.as_bytes())?,
            },
            PublicKey::Unknown(spki) => spki.clone(),
        };
        Ok(spki)
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        match self {
            PublicKey::Rsa(_) => PublicKeyAlgorithm::Rsa,
            PublicKey::EcdsaP256(_) | PublicKey::EcdsaP384(_) => PublicKeyAlgorithm::Ecdsa,
            PublicKey::Ed25519(_) => PublicKeyAlgorithm::Ed25519,
            PublicKey::Unknown(spki) => PublicKeyAlgorithm::from_oid(&spki.algorithm.oid),
        }
    }
}

/// Largest RSA modulus accepted from a request, in bits.
pub const MAX_RSA_KEY_BITS: usize = 16384;

// `DecodePublicKey` caps RSA moduli at 4096 bits.
fn rsa_public_key(spki: &SubjectPublicKeyInfoOwned) -> Result<RsaPublicKey> {
    let pkcs1 = rsa::pkcs1::RsaPublicKey::from_der(spki.subject_public_key.raw_bytes())?;
    Ok(RsaPublicKey::new_with_max_size(
        BigUint::from_bytes_be(pkcs1.modulus.as_bytes()),
        BigUint::from_bytes_be(pkcs1.public_exponent.as_bytes()),
        MAX_RSA_KEY_BITS,
    )?)
}

fn curve(algorithm: &AlgorithmIdentifierOwned) -> Option<const_oid::ObjectIdentifier> {
    algorithm
        .parameters
        .as_ref()?
        .decode_as::<const_oid::ObjectIdentifier>()
        .ok()
}

/// Something that can sign a certificate request.
///
/// Implementations may block, for example on a hardware token.
pub trait RequestSigner {
    /// The public key matching the signing key.
    fn public_key(&self) -> PublicKey;

    /// The algorithm [`RequestSigner::sign`] produces signatures with.
    fn signature_algorithm(&self) -> SignatureAlgorithm;

    /// Signs `message`, returning the signature as it goes in the request.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Supported key types for certificate request signing.
#[derive(Clone, Debug)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
    },
    Ed25519 {
        signing_key: Ed25519SigningKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| TemplateError::KeyGenerationError(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        KeyPair::EcdsaP256 {
            signing_key: P256SigningKey::random(&mut rng),
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        KeyPair::EcdsaP384 {
            signing_key: P384SigningKey::random(&mut rng),
        }
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key: Ed25519SigningKey = Ed25519SigningKey::generate(&mut rng);
        KeyPair::Ed25519 { signing_key }
    }

    /// Import a private key from PKCS#8 DER.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)?;
        match info.algorithm.oid {
            oid::RSA_ENCRYPTION => {
                let private = RsaPrivateKey::from_pkcs8_der(der)?;
                let public = RsaPublicKey::from(&private);
                Ok(KeyPair::Rsa {
                    private: Box::new(private),
                    public,
                })
            }
            oid::EC_PUBLIC_KEY => match info.algorithm.parameters_oid()? {
                oid::SECP256R1 => Ok(KeyPair::EcdsaP256 {
                    signing_key: P256SigningKey::from_pkcs8_der(der)?,
                }),
                oid::SECP384R1 => Ok(KeyPair::EcdsaP384 {
                    signing_key: P384SigningKey::from_pkcs8_der(der)?,
                }),
                other => Err(TemplateError::InvalidInput(format!(
                    "unsupported elliptic curve {other}"
                ))),
            },
            oid::ED25519 => Ok(KeyPair::Ed25519 {
                signing_key: Ed25519SigningKey::from_pkcs8_der(der)?,
            }),
            other => Err(TemplateError::InvalidInput(format!(
                "unsupported private key algorithm {other}"
            ))),
        }
    }

    /// Import a private key from a PKCS#8 `PRIVATE KEY` PEM block.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let der = crate::pem_utils::pem_to_der(pem, &["PRIVATE KEY"])?;
        Self::from_pkcs8_der(&der)
    }
}

impl RequestSigner for KeyPair {
    fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP256 { signing_key } => {
                PublicKey::EcdsaP256(*signing_key.verifying_key())
            }
            KeyPair::EcdsaP384 { signing_key } => {
                PublicKey::EcdsaP384(*signing_key.verifying_key())
            }
            KeyPair::Ed25519 { signing_key } => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }

    fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::Sha256WithRsa,
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::EcdsaWithSha256,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::EcdsaWithSha384,
            KeyPair::Ed25519 { .. } => SignatureAlgorithm::PureEd25519,
        }
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match self {
            KeyPair::Rsa { private, .. } => {
                let signing_key: RsaSigningKey<Sha256> = RsaSigningKey::new(*private.clone());
                Ok(signing_key.try_sign(message)?.to_vec())
            }
            // X.509 carries ECDSA signatures DER encoded.
            KeyPair::EcdsaP256 { signing_key } => {
                let signature: p256::ecdsa::DerSignature = signing_key.try_sign(message)?;
                Ok(signature.as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key } => {
                let signature: p384::ecdsa::DerSignature = signing_key.try_sign(message)?;
                Ok(signature.as_bytes().to_vec())
            }
            KeyPair::Ed25519 { signing_key } => {
                Ok(signing_key.try_sign(message)?.to_bytes().to_vec())
            }
        }
    }
}
