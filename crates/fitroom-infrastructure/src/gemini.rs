//! Gemini-backed synthesis client.
//!
//! Sends `generateContent` requests with inline image parts to the hosted
//! Gemini image model and extracts the generated image from the response.
//! One request per operation; classification of failures is the only error
//! handling here, retry policy (there is none) belongs to the caller.

use fitroom_core::error::{FitroomError, Result};
use fitroom_core::media::ImageData;
use fitroom_core::synthesis::SynthesisClient;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

const MODEL_PROMPT: &str = "You are an expert fashion photographer AI. Transform the person in this image into a full-body fashion model photo suitable for an e-commerce website. The background must be a clean, neutral studio backdrop (light gray, #f0f0f0). The person should have a neutral, professional model expression. Preserve the person's identity, unique features, and body type, but place them in a standard, relaxed standing model pose. The final image must be photorealistic. Return ONLY the final image.";

/// Client for the Gemini image generation endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new client using the provided API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| FitroomError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Overrides the model name if needed.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        };

        let response = self.client.post(url).json(&request).send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                FitroomError::network(err.to_string())
            } else {
                FitroomError::remote(err.status().map(|s| s.as_u16()), err.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| FitroomError::remote(None, format!("Failed to parse response: {err}")))?;

        extract_image_data_url(&payload)
    }

    fn image_part(image: &ImageData) -> Part {
        use base64::Engine;
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime.clone(),
                data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
            }),
        }
    }

    fn text_part(text: impl Into<String>) -> Part {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn base_image_part(base_image_url: &str, what_for: &str) -> Result<Part> {
        if base_image_url.trim().is_empty() {
            return Err(FitroomError::invalid_state(format!(
                "{what_for} requires a base image, none was provided"
            )));
        }
        let base = ImageData::from_data_url(base_image_url)?;
        Ok(Self::image_part(&base))
    }
}

#[async_trait::async_trait]
impl SynthesisClient for GeminiClient {
    async fn generate_model_image(&self, photo: &ImageData) -> Result<String> {
        if !photo.mime.starts_with("image/") {
            return Err(FitroomError::unsupported_media(photo.mime.clone()));
        }
        log::info!("requesting model generation ({} bytes, {})", photo.bytes.len(), photo.mime);
        self.generate(vec![Self::image_part(photo), Self::text_part(MODEL_PROMPT)])
            .await
    }

    async fn generate_outfit_image(
        &self,
        base_image_url: &str,
        garment_image: &ImageData,
        garment_name: &str,
        pose_instruction: &str,
    ) -> Result<String> {
        let base_part = Self::base_image_part(base_image_url, "garment application")?;
        let prompt = format!(
            "You are an expert virtual try-on AI. You will be given a 'model image' (the first image) and a 'garment image' (the second image, {garment_name}). Create a new photorealistic image where the person from the model image is wearing the garment from the garment image, layered naturally over their current clothes. The person, pose and background must remain identical. The pose is: {pose_instruction}. Return ONLY the final image."
        );
        log::info!("requesting outfit synthesis for '{garment_name}'");
        self.generate(vec![
            base_part,
            Self::image_part(garment_image),
            Self::text_part(prompt),
        ])
        .await
    }

    async fn generate_pose_variation(
        &self,
        base_image_url: &str,
        pose_instruction: &str,
    ) -> Result<String> {
        let base_part = Self::base_image_part(base_image_url, "pose variation")?;
        let prompt = format!(
            "You are an expert fashion photographer AI. Regenerate this image from a different perspective. The person, clothing, background and style must remain identical. The new perspective is: {pose_instruction}. Return ONLY the final image."
        );
        log::info!("requesting pose variation: {pose_instruction}");
        self.generate(vec![base_part, Self::text_part(prompt)]).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

/// Maps a non-success HTTP response to a `RemoteService` error with the
/// provider's own message where the body carries one.
fn map_http_error(status: StatusCode, body: &str) -> FitroomError {
    let provider_message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    let message = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            "The API key was rejected. Check that it is valid and has access to the image model.".to_string()
        }
        StatusCode::TOO_MANY_REQUESTS => provider_message
            .unwrap_or_else(|| "Quota exceeded or rate limited.".to_string()),
        _ => provider_message.unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("The image service returned status {status}.")
            } else {
                trimmed.chars().take(200).collect()
            }
        }),
    };

    FitroomError::remote(Some(status.as_u16()), message)
}

/// Pulls the first generated image out of a `generateContent` response and
/// re-encodes it as a data-URL.
fn extract_image_data_url(root: &Value) -> Result<String> {
    if let Some(candidates) = root.get("candidates").and_then(|c| c.as_array()) {
        for candidate in candidates {
            let parts = candidate
                .get("content")
                .and_then(|content| content.get("parts"))
                .and_then(|parts| parts.as_array());
            let Some(parts) = parts else { continue };
            for part in parts {
                if let Some(inline) = part.get("inlineData") {
                    let mime = inline
                        .get("mimeType")
                        .and_then(|m| m.as_str())
                        .unwrap_or("image/png");
                    if let Some(data) = inline.get("data").and_then(|d| d.as_str()) {
                        return Ok(format!("data:{mime};base64,{data}"));
                    }
                }
            }
        }
    }

    // No image part. Blocked prompts and text-only refusals each carry a
    // reason worth surfacing.
    if let Some(reason) = root
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(FitroomError::remote(
            None,
            format!("The request was blocked (reason: {reason})."),
        ));
    }

    let text = collect_text(root);
    let message = if text.is_empty() {
        "The model returned no image.".to_string()
    } else {
        format!("The model returned no image. It said: \"{}\"", text.chars().take(200).collect::<String>())
    };
    Err(FitroomError::remote(None, message))
}

fn collect_text(root: &Value) -> String {
    let mut collected = Vec::new();
    if let Some(candidates) = root.get("candidates").and_then(|c| c.as_array()) {
        for candidate in candidates {
            if let Some(parts) = candidate
                .get("content")
                .and_then(|content| content.get("parts"))
                .and_then(|parts| parts.as_array())
            {
                for part in parts {
                    if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            collected.push(trimmed.to_string());
                        }
                    }
                }
            }
        }
    }
    collected.join(" ")
}
