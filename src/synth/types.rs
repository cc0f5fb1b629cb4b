//! Core types for the synthesis client.

use crate::error::{PixsynthError, Result};
use crate::intake::EncodedImage;
use base64::Engine;

/// Model variants accepted by the generation endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynthModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    FlashImage,
    /// Gemini 3 Pro Image (highest quality).
    ProImage,
}

impl SynthModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImage => "gemini-2.5-flash-image",
            Self::ProImage => "gemini-3-pro-image-preview",
        }
    }
}

/// One submission's worth of input: the prompt and the encoded images, in
/// selection order. Constructed once per submission; immutable.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// The text prompt, sent verbatim after the image parts.
    pub prompt: String,
    /// Encoded images, one request part each, in order.
    pub images: Vec<EncodedImage>,
}

impl SynthesisRequest {
    /// Creates a request from a prompt and encoded images.
    pub fn new(prompt: impl Into<String>, images: Vec<EncodedImage>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
        }
    }
}

/// What came back from a successful synthesis: a generated image and/or
/// generated text. At least one field is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    /// Generated image as a `data:<mime>;base64,<payload>` URL, directly
    /// renderable without a separate fetch.
    pub image_data_url: Option<String>,
    /// Generated text, if the response carried any.
    pub text: Option<String>,
}

impl SynthesisResult {
    /// True when neither an image nor text was produced.
    pub fn is_empty(&self) -> bool {
        self.image_data_url.is_none() && self.text.is_none()
    }

    /// Decodes the generated image's data URL back into raw bytes, for
    /// saving to disk.
    pub fn image_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(url) = &self.image_data_url else {
            return Ok(None);
        };
        let payload = url
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| PixsynthError::Decode("malformed data URL".into()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| PixsynthError::Decode(e.to_string()))?;
        Ok(Some(bytes))
    }
}
