use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use der::asn1::{Any, AnyRef};
use der::{Decode, Encode};
use lazy_static::lazy_static;
use rsa::pkcs1::RsaPssParams;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::{Sha256, Sha384, Sha512};
use x509_cert::spki::AlgorithmIdentifierOwned;

use super::{Certificate, Result};
use crate::error::TemplateError;
use crate::oid;

/// Signature algorithms with a stable textual name.
///
/// The textual form is the canonical name from [`SignatureAlgorithm::name`], so
/// templates never depend on the numeric codes below. `Unknown` has no name and
/// is written as the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureAlgorithm {
    #[default]
    Unknown = 0,
    Md2WithRsa = 1,
    Md5WithRsa = 2,
    Sha1WithRsa = 3,
    Sha256WithRsa = 4,
    Sha384WithRsa = 5,
    Sha512WithRsa = 6,
    DsaWithSha1 = 7,
    DsaWithSha256 = 8,
    EcdsaWithSha1 = 9,
    EcdsaWithSha256 = 10,
    EcdsaWithSha384 = 11,
    EcdsaWithSha512 = 12,
    Sha256WithRsaPss = 13,
    Sha384WithRsaPss = 14,
    Sha512WithRsaPss = 15,
    PureEd25519 = 16,
}

/// Canonical names, one per algorithm. Never mutated.
static SIGNATURE_ALGORITHM_NAMES: [(SignatureAlgorithm, &str); 16] = [
    (SignatureAlgorithm::Md2WithRsa, "MD2-RSA"),
    (SignatureAlgorithm::Md5WithRsa, "MD5-RSA"),
    (SignatureAlgorithm::Sha1WithRsa, "SHA1-RSA"),
    (SignatureAlgorithm::Sha256WithRsa, "SHA256-RSA"),
    (SignatureAlgorithm::Sha384WithRsa, "SHA384-RSA"),
    (SignatureAlgorithm::Sha512WithRsa, "SHA512-RSA"),
    (SignatureAlgorithm::Sha256WithRsaPss, "SHA256-RSAPSS"),
    (SignatureAlgorithm::Sha384WithRsaPss, "SHA384-RSAPSS"),
    (SignatureAlgorithm::Sha512WithRsaPss, "SHA512-RSAPSS"),
    (SignatureAlgorithm::DsaWithSha1, "DSA-SHA1"),
    (SignatureAlgorithm::DsaWithSha256, "DSA-SHA256"),
    (SignatureAlgorithm::EcdsaWithSha1, "ECDSA-SHA1"),
    (SignatureAlgorithm::EcdsaWithSha256, "ECDSA-SHA256"),
    (SignatureAlgorithm::EcdsaWithSha384, "ECDSA-SHA384"),
    (SignatureAlgorithm::EcdsaWithSha512, "ECDSA-SHA512"),
    (SignatureAlgorithm::PureEd25519, "Ed25519"),
];

lazy_static! {
    /// Lowercased canonical name to algorithm.
    static ref SIGNATURE_ALGORITHMS_BY_NAME: HashMap<String, SignatureAlgorithm> =
        SIGNATURE_ALGORITHM_NAMES
            .iter()
            .map(|(algorithm, name)| (name.to_lowercase(), *algorithm))
            .collect();
}

impl SignatureAlgorithm {
    /// Returns every algorithm that has a canonical name.
    pub fn all() -> impl Iterator<Item = SignatureAlgorithm> {
        SIGNATURE_ALGORITHM_NAMES
            .iter()
            .map(|(algorithm, _)| *algorithm)
    }

    /// The numeric code of the algorithm, `0` for [`SignatureAlgorithm::Unknown`].
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_unknown(&self) -> bool {
        *self == SignatureAlgorithm::Unknown
    }

    /// Returns the canonical name, or `""` for [`SignatureAlgorithm::Unknown`].
    pub fn name(self) -> &'static str {
        SIGNATURE_ALGORITHM_NAMES
            .iter()
            .find(|(algorithm, _)| *algorithm == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    /// Writes this algorithm into the certificate template.
    pub fn set(self, cert: &mut Certificate) {
        cert.signature_algorithm = self;
    }

    /// Marshals the algorithm as a JSON string.
    pub fn to_json(self) -> String {
        serde_json::Value::String(self.name().to_string()).to_string()
    }

    /// Unmarshals an algorithm from JSON.
    ///
    /// `null` and `""` give [`SignatureAlgorithm::Unknown`]. Any other non-string
    /// value is an [`TemplateError::InvalidType`], and a string without a
    /// case-insensitive match is an [`TemplateError::UnsupportedSignatureAlgorithm`].
    pub fn from_json(data: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<serde_json::Value>(data)? {
            serde_json::Value::Null => Ok(SignatureAlgorithm::Unknown),
            serde_json::Value::String(name) => name.parse(),
            serde_json::Value::Bool(_) => Err(TemplateError::InvalidType("boolean")),
            serde_json::Value::Number(_) => Err(TemplateError::InvalidType("number")),
            serde_json::Value::Array(_) => Err(TemplateError::InvalidType("array")),
            serde_json::Value::Object(_) => Err(TemplateError::InvalidType("object")),
        }
    }

    /// Builds the X.509 algorithm identifier for this algorithm.
    pub fn to_algorithm_identifier(self) -> Result<AlgorithmIdentifierOwned> {
        let null = || Some(Any::from(AnyRef::NULL));
        let (oid, parameters) = match self {
            SignatureAlgorithm::Unknown => {
                return Err(TemplateError::InvalidInput(
                    "unknown signature algorithm has no identifier".to_string(),
                ));
            }
            SignatureAlgorithm::Md2WithRsa => (oid::MD2_WITH_RSA, null()),
            SignatureAlgorithm::Md5WithRsa => (oid::MD5_WITH_RSA, null()),
            SignatureAlgorithm::Sha1WithRsa => (oid::SHA1_WITH_RSA, null()),
            SignatureAlgorithm::Sha256WithRsa => (oid::SHA256_WITH_RSA, null()),
            SignatureAlgorithm::Sha384WithRsa => (oid::SHA384_WITH_RSA, null()),
            SignatureAlgorithm::Sha512WithRsa => (oid::SHA512_WITH_RSA, null()),
            SignatureAlgorithm::DsaWithSha1 => (oid::DSA_WITH_SHA1, None),
            SignatureAlgorithm::DsaWithSha256 => (oid::DSA_WITH_SHA256, None),
            SignatureAlgorithm::EcdsaWithSha1 => (oid::ECDSA_WITH_SHA1, None),
            SignatureAlgorithm::EcdsaWithSha256 => (oid::ECDSA_WITH_SHA256, None),
            SignatureAlgorithm::EcdsaWithSha384 => (oid::ECDSA_WITH_SHA384, None),
            SignatureAlgorithm::EcdsaWithSha512 => (oid::ECDSA_WITH_SHA512, None),
            // Salt length equals the digest length.
            SignatureAlgorithm::Sha256WithRsaPss => (
                oid::RSASSA_PSS,
                Some(Any::encode_from(&RsaPssParams::new::<Sha256>(32))?),
            ),
            SignatureAlgorithm::Sha384WithRsaPss => (
                oid::RSASSA_PSS,
                Some(Any::encode_from(&RsaPssParams::new::<Sha384>(48))?),
            ),
            SignatureAlgorithm::Sha512WithRsaPss => (
                oid::RSASSA_PSS,
                Some(Any::encode_from(&RsaPssParams::new::<Sha512>(64))?),
            ),
            SignatureAlgorithm::PureEd25519 => (oid::ED25519, None),
        };
        Ok(AlgorithmIdentifierOwned { oid, parameters })
    }

    /// Maps a parsed X.509 algorithm identifier back to an algorithm.
    ///
    /// Identifiers without a canonical name map to [`SignatureAlgorithm::Unknown`].
    pub fn from_algorithm_identifier(algorithm: &AlgorithmIdentifierOwned) -> Self {
        match algorithm.oid {
            oid::MD2_WITH_RSA => SignatureAlgorithm::Md2WithRsa,
            oid::MD5_WITH_RSA => SignatureAlgorithm::Md5WithRsa,
            oid::SHA1_WITH_RSA => SignatureAlgorithm::Sha1WithRsa,
            oid::SHA256_WITH_RSA => SignatureAlgorithm::Sha256WithRsa,
            oid::SHA384_WITH_RSA => SignatureAlgorithm::Sha384WithRsa,
            oid::SHA512_WITH_RSA => SignatureAlgorithm::Sha512WithRsa,
            oid::DSA_WITH_SHA1 => SignatureAlgorithm::DsaWithSha1,
            oid::DSA_WITH_SHA256 => SignatureAlgorithm::DsaWithSha256,
            oid::ECDSA_WITH_SHA1 => SignatureAlgorithm::EcdsaWithSha1,
            oid::ECDSA_WITH_SHA256 => SignatureAlgorithm::EcdsaWithSha256,
            oid::ECDSA_WITH_SHA384 => SignatureAlgorithm::EcdsaWithSha384,
            oid::ECDSA_WITH_SHA512 => SignatureAlgorithm::EcdsaWithSha512,
            oid::ED25519 => SignatureAlgorithm::PureEd25519,
            oid::RSASSA_PSS => match pss_hash(algorithm.parameters.as_ref()) {
                Some(oid::SHA256) => SignatureAlgorithm::Sha256WithRsaPss,
                Some(oid::SHA384) => SignatureAlgorithm::Sha384WithRsaPss,
                Some(oid::SHA512) => SignatureAlgorithm::Sha512WithRsaPss,
                _ => SignatureAlgorithm::Unknown,
            },
            _ => SignatureAlgorithm::Unknown,
        }
    }
}

/// Digest named in RSASSA-PSS parameters.
fn pss_hash(parameters: Option<&Any>) -> Option<const_oid::ObjectIdentifier> {
    let der = parameters?.to_der().ok()?;
    let params = RsaPssParams::from_der(&der).ok()?;
    Some(params.hash.oid)
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = TemplateError;

    /// Case-insensitive lookup of a canonical name. The empty string is
    /// [`SignatureAlgorithm::Unknown`].
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(SignatureAlgorithm::Unknown);
        }
        SIGNATURE_ALGORITHMS_BY_NAME
            .get(&s.to_lowercase())
            .copied()
            .ok_or_else(|| TemplateError::UnsupportedSignatureAlgorithm(s.to_string()))
    }
}

impl Serialize for SignatureAlgorithm {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SignatureAlgorithm {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = Option::<String>::deserialize(deserializer)?;
        name.as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Public key algorithms, as reported by a parsed request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PublicKeyAlgorithm {
    #[default]
    Unknown,
    Rsa,
    Dsa,
    Ecdsa,
    Ed25519,
}

impl PublicKeyAlgorithm {
    /// Classifies a `SubjectPublicKeyInfo` algorithm OID.
    pub fn from_oid(oid: &const_oid::ObjectIdentifier) -> Self {
        match *oid {
            oid::RSA_ENCRYPTION => PublicKeyAlgorithm::Rsa,
            oid::DSA => PublicKeyAlgorithm::Dsa,
            oid::EC_PUBLIC_KEY => PublicKeyAlgorithm::Ecdsa,
            oid::ED25519 => PublicKeyAlgorithm::Ed25519,
            _ => PublicKeyAlgorithm::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_round_trip() {
        for algorithm in SignatureAlgorithm::all() {
            let json = algorithm.to_json();
            assert_eq!(json, format!("\"{}\"", algorithm.name()));
            assert_eq!(
                SignatureAlgorithm::from_json(json.as_bytes()).unwrap(),
                algorithm
            );
            assert_eq!(algorithm.name().parse::<SignatureAlgorithm>(), Ok(algorithm));
        }
        assert_eq!(SignatureAlgorithm::all().count(), 16);
    }

    #[test]
    fn test_canonical_names() {
        let cases = [
            (SignatureAlgorithm::Md2WithRsa, "MD2-RSA"),
            (SignatureAlgorithm::Md5WithRsa, "MD5-RSA"),
            (SignatureAlgorithm::Sha1WithRsa, "SHA1-RSA"),
            (SignatureAlgorithm::Sha256WithRsa, "SHA256-RSA"),
            (SignatureAlgorithm::Sha384WithRsa, "SHA384-RSA"),
            (SignatureAlgorithm::Sha512WithRsa, "SHA512-RSA"),
            (SignatureAlgorithm::Sha256WithRsaPss, "SHA256-RSAPSS"),
            (SignatureAlgorithm::Sha384WithRsaPss, "SHA384-RSAPSS"),
            (SignatureAlgorithm::Sha512WithRsaPss, "SHA512-RSAPSS"),
            (SignatureAlgorithm::DsaWithSha1, "DSA-SHA1"),
            (SignatureAlgorithm::DsaWithSha256, "DSA-SHA256"),
            (SignatureAlgorithm::EcdsaWithSha1, "ECDSA-SHA1"),
            (SignatureAlgorithm::EcdsaWithSha256, "ECDSA-SHA256"),
            (SignatureAlgorithm::EcdsaWithSha384, "ECDSA-SHA384"),
            (SignatureAlgorithm::EcdsaWithSha512, "ECDSA-SHA512"),
            (SignatureAlgorithm::PureEd25519, "Ed25519"),
        ];
        for (algorithm, name) in cases {
            assert_eq!(algorithm.to_string(), name);
            assert_eq!(
                serde_json::to_string(&algorithm).unwrap(),
                format!("\"{name}\"")
            );
        }
    }

    #[test]
    fn test_unknown_is_empty_string() {
        assert_eq!(SignatureAlgorithm::Unknown.to_json(), "\"\"");
        assert_eq!(SignatureAlgorithm::Unknown.code(), 0);
        assert_eq!(
            serde_json::to_string(&SignatureAlgorithm::default()).unwrap(),
            "\"\""
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(
            SignatureAlgorithm::from_json(br#""ecdsa-sha256""#).unwrap(),
            SignatureAlgorithm::from_json(br#""ECDSA-SHA256""#).unwrap()
        );
        assert_eq!(
            "ed25519".parse::<SignatureAlgorithm>(),
            Ok(SignatureAlgorithm::PureEd25519)
        );
        assert_eq!(
            "Sha384-RsaPss".parse::<SignatureAlgorithm>(),
            Ok(SignatureAlgorithm::Sha384WithRsaPss)
        );
    }

    #[test]
    fn test_empty_and_null_are_unknown() {
        assert_eq!(
            SignatureAlgorithm::from_json(br#""""#),
            Ok(SignatureAlgorithm::Unknown)
        );
        assert_eq!(
            SignatureAlgorithm::from_json(b"null"),
            Ok(SignatureAlgorithm::Unknown)
        );
        let decoded: SignatureAlgorithm = serde_json::from_str("null").unwrap();
        assert_eq!(decoded, SignatureAlgorithm::Unknown);
    }

    #[test]
    fn test_unmarshal_failures() {
        assert_eq!(
            SignatureAlgorithm::from_json(br#""unknown""#),
            Err(TemplateError::UnsupportedSignatureAlgorithm(
                "unknown".to_string()
            ))
        );
        assert_eq!(
            SignatureAlgorithm::from_json(br#""0""#),
            Err(TemplateError::UnsupportedSignatureAlgorithm("0".to_string()))
        );
        assert_eq!(
            SignatureAlgorithm::from_json(b"0"),
            Err(TemplateError::InvalidType("number"))
        );
        assert_eq!(
            SignatureAlgorithm::from_json(b"{}"),
            Err(TemplateError::InvalidType("object"))
        );
        assert_eq!(
            SignatureAlgorithm::from_json(b"[]"),
            Err(TemplateError::InvalidType("array"))
        );
        assert_eq!(
            SignatureAlgorithm::from_json(b"true"),
            Err(TemplateError::InvalidType("boolean"))
        );
        assert!(matches!(
            SignatureAlgorithm::from_json(b"\"ECDSA"),
            Err(TemplateError::JsonError(_))
        ));

        assert!(serde_json::from_str::<SignatureAlgorithm>("0").is_err());
        assert!(serde_json::from_str::<SignatureAlgorithm>("{}").is_err());
        let err = serde_json::from_str::<SignatureAlgorithm>(r#""SHA3-RSA""#).unwrap_err();
        assert!(err.to_string().contains("SHA3-RSA"));
    }

    #[test]
    fn test_set_writes_algorithm() {
        let mut cert = Certificate::default();
        SignatureAlgorithm::EcdsaWithSha256.set(&mut cert);
        assert_eq!(cert.signature_algorithm, SignatureAlgorithm::EcdsaWithSha256);

        SignatureAlgorithm::PureEd25519.set(&mut cert);
        assert_eq!(cert.signature_algorithm, SignatureAlgorithm::PureEd25519);

        SignatureAlgorithm::Unknown.set(&mut cert);
        assert_eq!(cert.signature_algorithm, SignatureAlgorithm::Unknown);
    }

    #[test]
    fn test_algorithm_identifier_mapping() {
        for algorithm in SignatureAlgorithm::all() {
            let id = algorithm.to_algorithm_identifier().unwrap();
            assert_eq!(SignatureAlgorithm::from_algorithm_identifier(&id), algorithm);
        }
        assert!(SignatureAlgorithm::Unknown.to_algorithm_identifier().is_err());

        let unrelated = AlgorithmIdentifierOwned {
            oid: oid::RSA_ENCRYPTION,
            parameters: None,
        };
        assert_eq!(
            SignatureAlgorithm::from_algorithm_identifier(&unrelated),
            SignatureAlgorithm::Unknown
        );
    }
}
