//! Terminal QR rendering for the WhatsApp Web pairing flow.

use crate::domain::DomainError;
use qrcode::render::unicode;
use qrcode::QrCode;

/// Render the pairing payload as a unicode block suitable for a terminal.
pub fn render_unicode(payload: &str) -> Result<String, DomainError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| DomainError::Bridge(format!("QR payload rejected: {e}")))?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_nonempty_block() {
        let block = render_unicode("2@pairing-payload,token,key").unwrap();
        assert!(!block.is_empty());
        assert!(block.lines().count() > 10);
    }
}
