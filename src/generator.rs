use crate::{
    aspect,
    config::Config,
    error::{GenerationError, Result},
    logger,
    models::{
        GenerationParams, GenerationPayload, GenerationRequest, GenerationResponse, ProviderKind,
        ProviderResult,
    },
    providers::{FalProvider, ImageProvider, OpenAiProvider, ProviderOutcome},
};
use reqwest::Client;
use std::sync::Arc;
use uuid::Uuid;

pub const MISSING_PROVIDER_MESSAGE: &str =
    "Add a FAL_KEY or OPENAI_API_KEY environment variable to enable image generation.";

/// Validates requests, resolves dimensions and walks the provider chain.
///
/// Providers are tried in order. Only [`ProviderOutcome::Unavailable`]
/// moves on to the next one; an error from a configured provider ends the
/// request.
#[derive(Clone)]
pub struct ImageGenerator {
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ImageGenerator {
    /// fal first, OpenAI second, sharing one HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        let fal: Arc<dyn ImageProvider> =
            Arc::new(FalProvider::new(client.clone(), config.fal.clone()));
        let openai: Arc<dyn ImageProvider> =
            Arc::new(OpenAiProvider::new(client, config.openai.clone()));

        Ok(Self::with_providers(vec![fal, openai]))
    }

    pub fn with_providers(providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self { providers }
    }

    /// Providers with a credential, in priority order.
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.kind())
            .collect()
    }

    /// Entry point for raw request bodies. Malformed JSON is an input error.
    pub async fn generate_from_json(&self, body: &[u8]) -> Result<GenerationResponse> {
        let payload: GenerationPayload = serde_json::from_slice(body)
            .map_err(|e| GenerationError::InvalidInput(format!("Invalid payload: {}", e)))?;
        self.generate(payload).await
    }

    pub async fn generate(&self, payload: GenerationPayload) -> Result<GenerationResponse> {
        let request = GenerationRequest::try_from(payload)?;
        let dimensions = aspect::resolve(Some(request.aspect_ratio.as_str()));

        if self.configured_providers().is_empty() {
            log::error!("Generation requested but no provider credential is configured");
            return Err(GenerationError::Config(MISSING_PROVIDER_MESSAGE.into()));
        }

        log::info!(
            "Generation request: ratio {} -> {}x{}, {} steps",
            dimensions.ratio,
            dimensions.width,
            dimensions.height,
            request.steps
        );

        let params = GenerationParams::new(&request, &dimensions);
        let result = self.run_providers(&params).await?;

        // Declared size always follows the requested ratio, even when the
        // provider only serves a fixed set of sizes.
        Ok(GenerationResponse {
            id: Uuid::new_v4().to_string(),
            image_url: result.image_url,
            width: dimensions.width,
            height: dimensions.height,
            prompt: request.prompt,
        })
    }

    async fn run_providers(&self, params: &GenerationParams) -> Result<ProviderResult> {
        for provider in &self.providers {
            let kind = provider.kind();
            let _timer = logger::timer(format!("{} generation", kind));

            match provider.generate(params).await {
                Ok(ProviderOutcome::Generated(result)) => {
                    log::info!("Image generated by {}", result.provider);
                    return Ok(result);
                }
                Ok(ProviderOutcome::Unavailable) => {
                    log::debug!("{} unavailable, trying next provider", kind);
                }
                Err(e) => {
                    log::error!("[image-generate] {}", e);
                    return Err(e);
                }
            }
        }

        Err(GenerationError::Config("No generation provider available.".into()))
    }
}
