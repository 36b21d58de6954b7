//! QR Encoder adapter: turns a URL into an image that can be embedded straight into HTML.

use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

pub trait QrEncoder: Send + Sync {
    /// Encode `url` and return a `data:` URL holding the rendered image.
    fn encode(&self, url: &str) -> Result<String, EncodingError>;
}

/// Renders QR codes as SVG and inlines them as base64 data URLs.
pub struct SvgQrEncoder {
    min_dimension: u32,
}

impl SvgQrEncoder {
    pub fn new(min_dimension: u32) -> Self {
        Self { min_dimension }
    }
}

impl Default for SvgQrEncoder {
    fn default() -> Self {
        Self::new(240)
    }
}

impl QrEncoder for SvgQrEncoder {
    fn encode(&self, url: &str) -> Result<String, EncodingError> {
        let code = QrCode::new(url.as_bytes())?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .build();

        Ok(format!(
            "data:image/svg+xml;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image.as_bytes())
        ))
    }
}
