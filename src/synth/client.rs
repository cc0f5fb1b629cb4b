//! HTTP client for the multimodal generation endpoint.

use crate::error::{PixsynthError, Result};
use crate::synth::types::{SynthModel, SynthesisRequest, SynthesisResult};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Builder for [`SynthesisClient`].
#[derive(Debug, Clone, Default)]
pub struct SynthesisClientBuilder {
    api_key: Option<String>,
    model: SynthModel,
    base_url: Option<String>,
}

impl SynthesisClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to the `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model variant.
    pub fn model(mut self, model: SynthModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the endpoint base URL. Intended for tests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<SynthesisClient> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                PixsynthError::MissingCredential(
                    "GOOGLE_API_KEY not set and no API key provided".into(),
                )
            })?;

        Ok(SynthesisClient {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        })
    }
}

/// Client for one remote generation endpoint, requesting both IMAGE and
/// TEXT response modalities.
pub struct SynthesisClient {
    client: reqwest::Client,
    api_key: String,
    model: SynthModel,
    base_url: String,
}

impl SynthesisClient {
    /// Creates a new [`SynthesisClientBuilder`].
    pub fn builder() -> SynthesisClientBuilder {
        SynthesisClientBuilder::new()
    }

    /// The model this client targets.
    pub fn model(&self) -> SynthModel {
        self.model
    }

    /// Sends one request and parses the first candidate into a
    /// [`SynthesisResult`].
    ///
    /// Rejects blank prompts and empty image lists before any network
    /// activity. Transport failures surface as a generic message; the
    /// underlying cause is logged.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        if request.prompt.trim().is_empty() {
            return Err(PixsynthError::Validation("prompt is blank".into()));
        }
        if request.images.is_empty() {
            return Err(PixsynthError::Validation("no images selected".into()));
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GenerateRequest::from_synthesis_request(request);

        tracing::info!(
            model = self.model.as_str(),
            images = request.images.len(),
            "sending synthesis request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(cause = %e, "synthesis request failed to send");
                PixsynthError::Transport("could not reach the synthesis service".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %text, "synthesis service returned an error");
            return Err(PixsynthError::Transport(format!(
                "the synthesis service returned HTTP {}",
                status.as_u16()
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(cause = %e, "failed to read synthesis response");
            PixsynthError::Transport("could not read the synthesis response".into())
        })?;

        extract_result(parsed)
    }
}

/// Walks the response for the first candidate's usable parts. First-wins:
/// later parts of the same kind never overwrite earlier ones.
fn extract_result(response: GenerateResponse) -> Result<SynthesisResult> {
    // Blocked prompts come back as HTTP 200 with no usable content.
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("prompt blocked: {reason}"));
            return Err(PixsynthError::EmptyResponse(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PixsynthError::EmptyResponse("no candidates in response".into()))?;

    // Safety filtering surfaces as a finish reason on an otherwise empty
    // candidate; keep the reason in the message.
    if let Some(reason) = &candidate.finish_reason {
        match reason.as_str() {
            "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST" => {
                return Err(PixsynthError::EmptyResponse(format!(
                    "content blocked by safety filter: {reason}"
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let mut result = SynthesisResult {
        image_data_url: None,
        text: None,
    };

    if let Some(content) = candidate.content {
        for part in content.parts {
            if result.image_data_url.is_none() {
                if let Some(inline) = &part.inline_data {
                    result.image_data_url = Some(format!(
                        "data:{};base64,{}",
                        inline.mime_type, inline.data
                    ));
                }
            }
            if result.text.is_none() {
                if let Some(text) = part.text {
                    result.text = Some(text);
                }
            }
        }
    }

    if result.is_empty() {
        let msg = match candidate.finish_reason {
            Some(reason) => format!("candidate had no usable parts (finish reason: {reason})"),
            None => "candidate had no image or text parts".into(),
        };
        return Err(PixsynthError::EmptyResponse(msg));
    }

    Ok(result)
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

/// A request part: either inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

impl GenerateRequest {
    fn from_synthesis_request(req: &SynthesisRequest) -> Self {
        // Image parts first, in selection order, then the verbatim prompt.
        let mut parts: Vec<RequestPart> = req
            .images
            .iter()
            .map(|img| RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: img.media_type.clone(),
                    data: img.data.clone(),
                },
            })
            .collect();

        parts.push(RequestPart::Text {
            text: req.prompt.clone(),
        });

        Self {
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}
