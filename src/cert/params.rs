use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Tag;
use der::Tagged;
use der::asn1::{Any, Ia5StringRef, OctetString, PrintableStringRef, SetOfVec, Utf8StringRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use super::multi;
use crate::error::TemplateError;
use crate::oid;

/// Subject of a certificate or certificate request template.
///
/// Every attribute but the common name and serial number may hold several
/// values. In templates those accept either a single string or a list.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C).
/// * `organization` - The organization (O).
/// * `organizational_unit` - The organizational unit (OU).
/// * `locality` - The locality or city (L).
/// * `province` - The state or province (ST).
/// * `street_address` - The street address (STREET).
/// * `postal_code` - The postal code.
/// * `serial_number` - The subject serial number, not the certificate serial.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub country: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub organization: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub organizational_unit: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub locality: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub province: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub street_address: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "multi::deserialize")]
    pub postal_code: Vec<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial_number: String,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub common_name: String,
}

impl Subject {
    /// Returns true when no attribute is set.
    pub fn is_empty(&self) -> bool {
        *self == Subject::default()
    }

    /// Converts the subject to an X.509 name.
    ///
    /// One RDN is written per value, in the order C, O, OU, L, ST, STREET,
    /// postalCode, serialNumber, CN.
    pub fn to_x509_name(&self) -> Result<Name, TemplateError> {
        let multi_valued = [
            (oid::COUNTRY, &self.country),
            (oid::ORGANIZATION, &self.organization),
            (oid::ORGANIZATIONAL_UNIT, &self.organizational_unit),
            (oid::LOCALITY, &self.locality),
            (oid::PROVINCE, &self.province),
            (oid::STREET_ADDRESS, &self.street_address),
            (oid::POSTAL_CODE, &self.postal_code),
        ];

        let mut rdns = Vec::new();
        for (oid, values) in multi_valued {
            for value in values {
                rdns.push(rdn(oid, value)?);
            }
        }
        if !self.serial_number.is_empty() {
            rdns.push(rdn(oid::SERIAL_NUMBER, &self.serial_number)?);
        }
        if !self.common_name.is_empty() {
            rdns.push(rdn(oid::COMMON_NAME, &self.common_name)?);
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `Subject` from an X.509 name.
    ///
    /// Attributes that are not part of `Subject`, or whose value is not a
    /// string, are skipped.
    pub fn from_x509_name(name: &Name) -> Self {
        let mut subject = Subject::default();
        for rdn in name.0.iter() {
            for attr in rdn.0.iter() {
                let Some(value) = directory_string(&attr.value) else {
                    continue;
                };
                match attr.oid {
                    oid::COUNTRY => subject.country.push(value),
                    oid::ORGANIZATION => subject.organization.push(value),
                    oid::ORGANIZATIONAL_UNIT => subject.organizational_unit.push(value),
                    oid::LOCALITY => subject.locality.push(value),
                    oid::PROVINCE => subject.province.push(value),
                    oid::STREET_ADDRESS => subject.street_address.push(value),
                    oid::POSTAL_CODE => subject.postal_code.push(value),
                    oid::SERIAL_NUMBER => subject.serial_number = value,
                    oid::COMMON_NAME => subject.common_name = value,
                    _ => {}
                }
            }
        }
        subject
    }
}

/// Single valued RDN, as a PrintableString when possible.
fn rdn(oid: ObjectIdentifier, value: &str) -> Result<RelativeDistinguishedName, TemplateError> {
    let value = match PrintableStringRef::new(value) {
        Ok(printable) => Any::encode_from(&printable)?,
        Err(_) => Any::encode_from(&Utf8StringRef::new(value)?)?,
    };
    let attribute = AttributeTypeAndValue { oid, value };
    Ok(RelativeDistinguishedName(SetOfVec::try_from(vec![attribute])?))
}

fn directory_string(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::Utf8String => value.decode_as::<Utf8StringRef<'_>>().ok().map(|s| s.to_string()),
        Tag::PrintableString => value
            .decode_as::<PrintableStringRef<'_>>()
            .ok()
            .map(|s| s.to_string()),
        Tag::Ia5String => value.decode_as::<Ia5StringRef<'_>>().ok().map(|s| s.to_string()),
        _ => None,
    }
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and value of an extension. In
/// templates the OID is written in dotted form under `id` and the value is
/// base64.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(rename = "id", with = "oid_string")]
    pub oid: ObjectIdentifier,
    #[serde(default)]
    pub critical: bool,
    /// DER-encoded extension value
    #[serde(default, with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl Extension {
    /// Creates an `Extension` from a specific extension.
    ///
    /// # Arguments
    /// * `extension` - The extension to encode.
    /// * `critical` - Indicates if the extension is critical.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: &E,
        critical: bool,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `Extension` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, TemplateError> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn from_x509(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }

    pub fn to_x509(&self) -> Result<x509_cert::ext::Extension, TemplateError> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: OctetString::new(self.value.clone())?,
        })
    }
}

mod oid_string {
    use super::*;

    pub fn serialize<S: Serializer>(oid: &ObjectIdentifier, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(oid)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ObjectIdentifier, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectIdentifier::new(&s).map_err(|e| de::Error::custom(format!("invalid oid {s}: {e}")))
    }
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD.decode(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_x509_name_round_trip() {
        let subject = Subject::builder()
            .common_name("server.example.com".to_string())
            .organization(vec!["Example Corp".to_string(), "Ünïcode Org".to_string()])
            .country(vec!["US".to_string()])
            .serial_number("1234".to_string())
            .build();

        let name = subject.to_x509_name().unwrap();
        assert_eq!(name.0.len(), 5);
        assert_eq!(Subject::from_x509_name(&name), subject);
    }

    #[test]
    fn test_empty_subject() {
        let subject = Subject::default();
        assert!(subject.is_empty());
        assert!(subject.to_x509_name().unwrap().0.is_empty());
        assert_eq!(serde_json::to_string(&subject).unwrap(), "{}");
    }

    #[test]
    fn test_subject_accepts_single_or_multiple_values() {
        let subject: Subject = serde_json::from_str(
            r#"{"commonName": "test", "organization": "Acme", "country": ["US", "CA"], "locality": null}"#,
        )
        .unwrap();
        assert_eq!(subject.common_name, "test");
        assert_eq!(subject.organization, vec!["Acme".to_string()]);
        assert_eq!(subject.country, vec!["US".to_string(), "CA".to_string()]);
        assert!(subject.locality.is_empty());
    }

    #[test]
    fn test_extension_json() {
        let ext = Extension {
            oid: ObjectIdentifier::new_unwrap("1.2.3.4"),
            critical: true,
            value: vec![0x05, 0x00],
        };
        let json = serde_json::to_string(&ext).unwrap();
        assert_eq!(json, r#"{"id":"1.2.3.4","critical":true,"value":"BQA="}"#);
        let decoded: Extension = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, ext);

        assert!(serde_json::from_str::<Extension>(r#"{"id":"not an oid"}"#).is_err());
    }
}
