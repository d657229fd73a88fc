//! Classification of free-form subject alternative names.

use std::net::IpAddr;

use url::Url;

use crate::cert::extensions::SubjectAltName;

/// Splits `sans` into DNS names, IP addresses, email addresses and URIs.
///
/// IP literals come first, then anything that parses as a URL with a scheme,
/// then anything containing `@`. Everything else is a DNS name. Order and
/// duplicates are kept within each kind.
///
/// URIs are stored in their normalized [`Url`] form, so the requested name may
/// differ from the input: `https://example.com` becomes `https://example.com/`,
/// scheme and host are lowercased, default ports are dropped and dot segments
/// are resolved.
pub fn split_sans<S: AsRef<str>>(sans: &[S]) -> SubjectAltName {
    let mut names = SubjectAltName::default();
    for san in sans {
        let san = san.as_ref();
        if let Ok(ip) = san.parse::<IpAddr>() {
            names.ip_addresses.push(ip);
        } else if let Ok(uri) = Url::parse(san) {
            names.uris.push(uri);
        } else if san.contains('@') {
            names.email_addresses.push(san.to_string());
        } else {
            names.dns_names.push(san.to_string());
        }
    }
    names
}
