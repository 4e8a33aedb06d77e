use crate::{
    config::ProviderConfig,
    error::{GenerationError, Result},
    models::{GenerationParams, ProviderKind, ProviderResult},
    providers::{ImageProvider, ProviderOutcome},
};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde::{Deserialize, Serialize};

pub const OPENAI_IMAGES_PATH: &str = "/v1/images/generations";
pub const OPENAI_IMAGE_MODEL: &str = "gpt-image-1";

/// Long side over short side at which the wide/tall size is chosen.
const ELONGATED_RATIO: f64 = 1.7;

/// The only output sizes the images endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpenAiSize {
    #[serde(rename = "1792x1024")]
    Wide,
    #[serde(rename = "1536x1024")]
    Landscape,
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1024x1536")]
    Portrait,
    #[serde(rename = "1024x1792")]
    Tall,
}

impl OpenAiSize {
    /// Nearest supported size for the requested pixel dimensions.
    pub fn nearest(width: u32, height: u32) -> Self {
        if width == height {
            return OpenAiSize::Square;
        }

        let (long, short) = (width.max(height) as f64, width.min(height).max(1) as f64);
        let elongated = long / short >= ELONGATED_RATIO;

        match (width > height, elongated) {
            (true, true) => OpenAiSize::Wide,
            (true, false) => OpenAiSize::Landscape,
            (false, true) => OpenAiSize::Tall,
            (false, false) => OpenAiSize::Portrait,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpenAiSize::Wide => "1792x1024",
            OpenAiSize::Landscape => "1536x1024",
            OpenAiSize::Square => "1024x1024",
            OpenAiSize::Portrait => "1024x1536",
            OpenAiSize::Tall => "1024x1792",
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiImageRequest {
    model: &'static str,
    prompt: String,
    size: OpenAiSize,
    quality: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// Secondary provider: the OpenAI images API. Only serves a fixed set of
/// sizes and has no negative prompt parameter.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    /// Folds the negative prompt into the main prompt.
    pub fn compose_prompt(prompt: &str, negative_prompt: Option<&str>) -> String {
        match negative_prompt {
            Some(negative) if !negative.is_empty() => {
                format!("{}\nNegative prompt: {}", prompt, negative)
            }
            _ => prompt.to_string(),
        }
    }

    fn error(message: impl Into<String>) -> GenerationError {
        GenerationError::provider(ProviderKind::OpenAi, message)
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn generate(&self, params: &GenerationParams) -> Result<ProviderOutcome> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            log::debug!("OpenAI key not configured, skipping provider");
            return Ok(ProviderOutcome::Unavailable);
        };

        let size = OpenAiSize::nearest(params.width, params.height);
        let request = OpenAiImageRequest {
            model: OPENAI_IMAGE_MODEL,
            prompt: Self::compose_prompt(&params.prompt, params.negative_prompt.as_deref()),
            size,
            quality: "high",
        };

        log::info!(
            "Generating image with OpenAI ({} for requested {}x{})",
            size.as_str(),
            params.width,
            params.height
        );

        let response = self
            .client
            .post(self.config.endpoint(OPENAI_IMAGES_PATH))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::warn!("OpenAI responded with {}", status);
            let message = serde_json::from_str::<OpenAiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(Self::error(if message.trim().is_empty() {
                "OpenAI generation failed".to_string()
            } else {
                message
            }));
        }

        let body: OpenAiImageResponse = response
            .json()
            .await
            .map_err(|e| Self::error(format!("invalid response body: {}", e)))?;

        let image_url = body
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Self::error("Image URL missing from OpenAI response"))?;

        Ok(ProviderOutcome::Generated(ProviderResult {
            image_url,
            provider: ProviderKind::OpenAi,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(width: u32, height: u32) -> GenerationParams {
        GenerationParams {
            prompt: "a paper boat in a storm".into(),
            negative_prompt: Some("text, watermark".into()),
            width,
            height,
            guidance_scale: 7.0,
            steps: 40,
            style_strength: 0.3,
        }
    }

    fn provider(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(
            Client::new(),
            ProviderConfig::new(server.uri()).with_api_key("sk-test"),
        )
    }

    #[test]
    fn test_size_mapping() {
        assert_eq!(OpenAiSize::nearest(4096, 2304), OpenAiSize::Wide);
        assert_eq!(OpenAiSize::nearest(4096, 3072), OpenAiSize::Landscape);
        assert_eq!(OpenAiSize::nearest(4096, 4096), OpenAiSize::Square);
        assert_eq!(OpenAiSize::nearest(3072, 4096), OpenAiSize::Portrait);
        assert_eq!(OpenAiSize::nearest(2304, 4096), OpenAiSize::Tall);
        assert_eq!(OpenAiSize::Wide.as_str(), "1792x1024");
    }

    #[test]
    fn test_size_threshold_is_inclusive() {
        assert_eq!(OpenAiSize::nearest(1700, 1000), OpenAiSize::Wide);
        assert_eq!(OpenAiSize::nearest(1000, 1700), OpenAiSize::Tall);
        assert_eq!(OpenAiSize::nearest(1690, 1000), OpenAiSize::Landscape);
    }

    #[test]
    fn test_compose_prompt() {
        assert_eq!(
            OpenAiProvider::compose_prompt("a fox", Some("snow")),
            "a fox\nNegative prompt: snow"
        );
        assert_eq!(OpenAiProvider::compose_prompt("a fox", None), "a fox");
    }

    #[tokio::test]
    async fn test_unavailable_without_key() {
        let provider = OpenAiProvider::new(Client::new(), ProviderConfig::openai());
        let outcome = provider.generate(&params(4096, 2304)).await.unwrap();
        assert_eq!(outcome, ProviderOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OPENAI_IMAGES_PATH))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-image-1",
                "size": "1792x1024",
                "quality": "high",
                "prompt": "a paper boat in a storm\nNegative prompt: text, watermark"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1700000000,
                "data": [{"url": "https://oaidalle.blob/out.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = provider(&server).generate(&params(4096, 2304)).await.unwrap();
        assert_eq!(
            outcome,
            ProviderOutcome::Generated(ProviderResult {
                image_url: "https://oaidalle.blob/out.png".into(),
                provider: ProviderKind::OpenAi,
            })
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"b64_json": "AAAA"}]})),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&params(1024, 1024))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Image URL missing from OpenAI response"));
    }

    #[tokio::test]
    async fn test_empty_url_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"url": ""}]})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&params(1024, 1024))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Image URL missing from OpenAI response"));
    }

    #[tokio::test]
    async fn test_error_message_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&params(1024, 1024))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Incorrect API key provided"));
    }
}
