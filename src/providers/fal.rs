use crate::{
    config::ProviderConfig,
    error::{GenerationError, Result},
    extract::extract_image_url,
    models::{GenerationParams, ProviderKind, ProviderResult},
    providers::{ImageProvider, ProviderOutcome, RandomSeed, SeedSource},
};
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    Client,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const FAL_MODEL_PATH: &str = "/fal-ai/flux-pro-1.1";

const SAFETY_TOLERANCE: &str = "auto";
const OUTPUT_FORMAT: &str = "png";
const PROMPT_STRENGTH: f64 = 0.85;

#[derive(Debug, Serialize)]
pub(crate) struct FalRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    guidance_scale: f64,
    num_inference_steps: u32,
    style_strength: f64,
    image_size: FalImageSize,
    safety_tolerance: &'static str,
    output_format: &'static str,
    enable_safety_checker: bool,
    prompt_strength: f64,
    seed: u64,
}

#[derive(Debug, Serialize)]
struct FalImageSize {
    width: u32,
    height: u32,
}

/// Primary provider: FLUX 1.1 pro on fal.ai. Supports explicit pixel sizes.
#[derive(Clone)]
pub struct FalProvider {
    client: Client,
    config: ProviderConfig,
    seeds: Arc<dyn SeedSource>,
}

impl FalProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self {
            client,
            config,
            seeds: Arc::new(RandomSeed),
        }
    }

    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    pub(crate) fn build_request<'a>(params: &'a GenerationParams, seed: u64) -> FalRequest<'a> {
        FalRequest {
            prompt: &params.prompt,
            negative_prompt: params.negative_prompt.as_deref(),
            guidance_scale: params.guidance_scale,
            num_inference_steps: params.steps,
            style_strength: params.style_strength,
            image_size: FalImageSize {
                width: params.width,
                height: params.height,
            },
            safety_tolerance: SAFETY_TOLERANCE,
            output_format: OUTPUT_FORMAT,
            enable_safety_checker: true,
            prompt_strength: PROMPT_STRENGTH,
            seed,
        }
    }

    fn error(message: impl Into<String>) -> GenerationError {
        GenerationError::provider(ProviderKind::Fal, message)
    }
}

#[async_trait]
impl ImageProvider for FalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fal
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn generate(&self, params: &GenerationParams) -> Result<ProviderOutcome> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            log::debug!("fal key not configured, skipping provider");
            return Ok(ProviderOutcome::Unavailable);
        };

        let seed = self.seeds.next_seed();
        let request = Self::build_request(params, seed);

        log::info!(
            "Generating image with fal ({}x{}, seed {})",
            params.width,
            params.height,
            seed
        );

        let response = self
            .client
            .post(self.config.endpoint(FAL_MODEL_PATH))
            .header(AUTHORIZATION, format!("Key {}", api_key))
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::warn!("fal responded with {}", status);
            return Err(Self::error(if error_text.trim().is_empty() {
                "FAL generation failed".to_string()
            } else {
                error_text
            }));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Self::error(format!("invalid response body: {}", e)))?;

        let image_url = extract_image_url(&body)
            .ok_or_else(|| Self::error("Image URL missing from FAL response"))?;

        Ok(ProviderOutcome::Generated(ProviderResult {
            image_url,
            provider: ProviderKind::Fal,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixedSeed;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params() -> GenerationParams {
        GenerationParams {
            prompt: "a glass city under aurora".into(),
            negative_prompt: Some("blurry".into()),
            width: 4096,
            height: 2304,
            guidance_scale: 7.0,
            steps: 40,
            style_strength: 0.3,
        }
    }

    fn provider(server: &MockServer) -> FalProvider {
        FalProvider::new(
            Client::new(),
            ProviderConfig::new(server.uri()).with_api_key("fal-test"),
        )
        .with_seed_source(Arc::new(FixedSeed(7)))
    }

    #[test]
    fn test_request_body_shape() {
        let params = params();
        let body = serde_json::to_value(FalProvider::build_request(&params, 99)).unwrap();
        assert_eq!(body["negative_prompt"], "blurry");
        assert_eq!(body["num_inference_steps"], 40);
        assert_eq!(body["image_size"], json!({"width": 4096, "height": 2304}));
        assert_eq!(body["safety_tolerance"], "auto");
        assert_eq!(body["output_format"], "png");
        assert_eq!(body["prompt_strength"], 0.85);
        assert_eq!(body["seed"], 99);
    }

    #[test]
    fn test_negative_prompt_omitted_when_absent() {
        let mut params = params();
        params.negative_prompt = None;
        let body = serde_json::to_value(FalProvider::build_request(&params, 1)).unwrap();
        assert!(body.get("negative_prompt").is_none());
    }

    #[tokio::test]
    async fn test_unavailable_without_key() {
        let provider = FalProvider::new(Client::new(), ProviderConfig::fal());
        assert!(!provider.is_configured());
        let outcome = provider.generate(&params()).await.unwrap();
        assert_eq!(outcome, ProviderOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FAL_MODEL_PATH))
            .and(header("authorization", "Key fal-test"))
            .and(body_partial_json(json!({"seed": 7, "image_size": {"width": 4096}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "images": [{"url": "https://fal.media/files/out.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = provider(&server).generate(&params()).await.unwrap();
        assert_eq!(
            outcome,
            ProviderOutcome::Generated(ProviderResult {
                image_url: "https://fal.media/files/out.png".into(),
                provider: ProviderKind::Fal,
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("prompt rejected"))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&params()).await.unwrap_err();
        assert!(err.to_string().contains("prompt rejected"));
    }

    #[tokio::test]
    async fn test_error_status_with_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&params()).await.unwrap_err();
        assert!(err.to_string().contains("FAL generation failed"));
    }

    #[tokio::test]
    async fn test_missing_url_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "done"})))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&params()).await.unwrap_err();
        assert!(err.to_string().contains("Image URL missing from FAL response"));
    }

    #[tokio::test]
    async fn test_empty_url_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"images": [{"url": ""}]})),
            )
            .mount(&server)
            .await;

        let err = provider(&server).generate(&params()).await.unwrap_err();
        assert!(err.to_string().contains("Image URL missing from FAL response"));
    }
}
