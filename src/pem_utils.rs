use crate::error::TemplateError;

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, pem::EncodeConfig::new())
}

/// Convert a PEM‑encoded string to DER‑encoded bytes.
///
/// The first block must carry one of `labels`.
pub fn pem_to_der(pem_str: &str, labels: &[&str]) -> Result<Vec<u8>, TemplateError> {
    let pem = pem::parse(pem_str)?;
    if !labels.contains(&pem.tag()) {
        return Err(TemplateError::PemError(format!(
            "unexpected PEM block {}, expected one of {labels:?}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_label_is_checked() {
        let pem = der_to_pem(&[0x30, 0x00], "CERTIFICATE");
        assert_eq!(
            pem_to_der(&pem, &["CERTIFICATE"]).unwrap(),
            vec![0x30, 0x00]
        );
        assert!(matches!(
            pem_to_der(&pem, &["CERTIFICATE REQUEST"]),
            Err(TemplateError::PemError(_))
        ));
        assert!(pem_to_der("garbage", &["CERTIFICATE"]).is_err());
    }
}
