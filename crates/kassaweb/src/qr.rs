//! QR bitmap rendering.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::Luma;
use qrcode::{EcLevel, QrCode};

use kassacore::{AppError, AppResult};

/// Renders a QR payload into an inline PNG data URL.
///
/// Error-correction level L with the standard 4-module quiet zone, which is
/// what the banks' scanner apps expect.
pub fn render_qr_data_url(payload: &str) -> AppResult<String> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
        .map_err(|e| AppError::Qr(e.to_string()))?;

    let img = code.render::<Luma<u8>>().module_dimensions(10, 10).build();

    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| AppError::Qr(e.to_string()))?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(buffer.into_inner())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png_data_url() {
        let url = render_qr_data_url("abc123").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let encoded = url.trim_start_matches("data:image/png;base64,");
        let bytes = BASE64.decode(encoded).unwrap();
        // PNG magic
        assert_eq!(bytes[..8], [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }

    #[test]
    fn different_payloads_render_differently() {
        let a = render_qr_data_url("payment-one").unwrap();
        let b = render_qr_data_url("payment-two").unwrap();
        assert_ne!(a, b);
    }
}
