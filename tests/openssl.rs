mod util;

use std::fs;
use std::process::Command;

use certtemplate::cert::algorithm::{PublicKeyAlgorithm, SignatureAlgorithm};
use certtemplate::cert::extensions::KeyUsages;
use certtemplate::key::{KeyPair, PublicKey, RequestSigner};
use certtemplate::pem_utils::der_to_pem;
use certtemplate::request::{CertificateRequest, encode_certificate_request};
use der::Encode;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::X509Req;
use openssl::x509::extension::SubjectAlternativeName;

fn common_name(req: &X509Req) -> String {
    req.subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .expect("Missing common name")
        .data()
        .as_utf8()
        .expect("Common name is not a string")
        .to_string()
}

#[test]
fn test_openssl_cli_validate_request() {
    let key = KeyPair::generate_ecdsa_p256();
    let der = encode_certificate_request("example.com", &util::SANS, &key).unwrap();
    let pem = der_to_pem(&der, "CERTIFICATE REQUEST");

    let csr_path = std::env::temp_dir().join("certtemplate_test_request.pem");
    fs::write(&csr_path, pem).expect("Failed to write certificate request");

    let output = Command::new("openssl")
        .arg("req")
        .arg("-in")
        .arg(&csr_path)
        .arg("-noout")
        .arg("-verify")
        .arg("-text")
        .output()
        .expect("Failed to execute OpenSSL command");

    assert!(
        output.status.success(),
        "OpenSSL command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);
    assert!(
        output_text.contains("CN = example.com") || output_text.contains("CN=example.com"),
        "Subject field is incorrect"
    );
    assert!(
        output_text.contains("DNS:example.com"),
        "DNS name is missing"
    );
    assert!(
        output_text.contains("IP Address:1.2.3.4"),
        "IP address is missing"
    );
    assert!(
        output_text.contains("email:a@example.com"),
        "Email address is missing"
    );
    assert!(
        output_text.contains("ecdsa-with-SHA256"),
        "Signature Algorithm field is incorrect"
    );

    fs::remove_file(&csr_path).expect("Failed to remove test certificate request");
}

#[test]
fn test_openssl_crate_verifies_signatures() {
    for key in [
        util::generate_rsa_key(),
        KeyPair::generate_ecdsa_p256(),
        KeyPair::generate_ecdsa_p384(),
        KeyPair::generate_ed25519(),
    ] {
        let der = encode_certificate_request("verify.example.com", &["verify.example.com"], &key)
            .unwrap();
        let req = X509Req::from_der(&der).expect("OpenSSL rejected the request");
        let public_key = req.public_key().unwrap();
        assert!(
            req.verify(&public_key).unwrap(),
            "signature of {:?} request does not verify",
            key.signature_algorithm()
        );
        assert_eq!(common_name(&req), "verify.example.com");

        let spki = key.public_key().as_spki().unwrap().to_der().unwrap();
        assert_eq!(public_key.public_key_to_der().unwrap(), spki);
    }
}

#[test]
fn test_parse_openssl_ec_request() {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let pkey = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

    let mut builder = X509Req::builder().unwrap();
    builder.set_pubkey(&pkey).unwrap();
    let mut name = openssl::x509::X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::ORGANIZATIONNAME, "Example Corp")
        .unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "openssl.example.com")
        .unwrap();
    builder.set_subject_name(&name.build()).unwrap();

    let san = SubjectAlternativeName::new()
        .dns("openssl.example.com")
        .ip("192.168.1.1")
        .email("ops@example.com")
        .uri("spiffe://example.com/openssl")
        .build(&builder.x509v3_context(None))
        .unwrap();
    let mut extensions = Stack::new().unwrap();
    extensions.push(san).unwrap();
    builder.add_extensions(&extensions).unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();

    let pem = String::from_utf8(builder.build().to_pem().unwrap()).unwrap();
    let request = CertificateRequest::from_pem(&pem).unwrap();

    assert_eq!(request.subject.common_name, "openssl.example.com");
    assert_eq!(request.subject.organization, vec!["Example Corp"]);
    assert_eq!(request.dns_names, vec!["openssl.example.com"]);
    assert_eq!(
        request.ip_addresses,
        vec!["192.168.1.1".parse::<std::net::IpAddr>().unwrap()]
    );
    assert_eq!(request.email_addresses, vec!["ops@example.com"]);
    assert_eq!(request.uris[0].as_str(), "spiffe://example.com/openssl");
    assert_eq!(request.signature_algorithm, SignatureAlgorithm::EcdsaWithSha256);
    assert_eq!(request.public_key_algorithm, PublicKeyAlgorithm::Ecdsa);
    assert!(matches!(request.public_key, Some(PublicKey::EcdsaP256(_))));
    assert_eq!(request.extensions.len(), 1);

    let leaf = request.get_leaf_certificate();
    assert_eq!(leaf.dns_names, request.dns_names);
    assert!(!leaf.key_usage.is_empty());
}

#[test]
fn test_parse_openssl_rsa_request() {
    let pkey = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut builder = X509Req::builder().unwrap();
    builder.set_pubkey(&pkey).unwrap();
    let mut name = openssl::x509::X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "rsa.example.com")
        .unwrap();
    builder.set_subject_name(&name.build()).unwrap();
    builder.sign(&pkey, MessageDigest::sha384()).unwrap();

    let request = CertificateRequest::from_der(&builder.build().to_der().unwrap()).unwrap();
    assert_eq!(request.signature_algorithm, SignatureAlgorithm::Sha384WithRsa);
    assert!(request.dns_names.is_empty());
    assert!(request.extensions.is_empty());

    let leaf = request.get_leaf_certificate();
    assert!(leaf.key_usage.0.contains(KeyUsages::KeyEncipherment));
}

#[test]
fn test_parse_openssl_large_rsa_request() {
    let pkey = PKey::from_rsa(Rsa::generate(6144).unwrap()).unwrap();

    let mut builder = X509Req::builder().unwrap();
    builder.set_pubkey(&pkey).unwrap();
    let mut name = openssl::x509::X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "big.example.com")
        .unwrap();
    builder.set_subject_name(&name.build()).unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();

    let request = CertificateRequest::from_der(&builder.build().to_der().unwrap()).unwrap();
    assert_eq!(request.subject.common_name, "big.example.com");
    assert_eq!(request.public_key_algorithm, PublicKeyAlgorithm::Rsa);

    let spki = request.public_key.as_ref().unwrap().as_spki().unwrap();
    assert_eq!(
        spki.to_der().unwrap(),
        pkey.public_key_to_der().unwrap()
    );

    let leaf = request.get_leaf_certificate();
    assert!(leaf.key_usage.0.contains(KeyUsages::KeyEncipherment));
}
