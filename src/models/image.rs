use crate::error::{GenerationError, Result};
use crate::models::ProviderKind;
use serde::{Deserialize, Serialize};

pub const MIN_PROMPT_CHARS: usize = 5;
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.0;
pub const DEFAULT_STEPS: u32 = 40;
pub const DEFAULT_STYLE_STRENGTH: f64 = 0.3;

const GUIDANCE_RANGE: (f64, f64) = (1.0, 20.0);
const STEPS_RANGE: (f64, f64) = (20.0, 80.0);
const STYLE_RANGE: (f64, f64) = (0.0, 1.0);

/// Inbound body of `POST /api/generate`, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_strength: Option<f64>,
}

impl GenerationPayload {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = Some(guidance_scale);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps as f64);
        self
    }

    pub fn with_style_strength(mut self, style_strength: f64) -> Self {
        self.style_strength = Some(style_strength);
        self
    }
}

/// A payload that passed validation, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: String,
    pub guidance_scale: f64,
    pub steps: u32,
    pub style_strength: f64,
}

impl TryFrom<GenerationPayload> for GenerationRequest {
    type Error = GenerationError;

    fn try_from(payload: GenerationPayload) -> Result<Self> {
        let prompt = payload
            .prompt
            .map(|p| p.trim().to_string())
            .ok_or_else(|| GenerationError::InvalidInput("Prompt is required.".into()))?;

        if prompt.chars().count() < MIN_PROMPT_CHARS {
            return Err(GenerationError::InvalidInput(
                "Prompt needs a bit more detail to guide the model.".into(),
            ));
        }

        let guidance_scale = bounded(
            "guidanceScale",
            payload.guidance_scale,
            DEFAULT_GUIDANCE_SCALE,
            GUIDANCE_RANGE,
        )?;

        let steps = bounded("steps", payload.steps, DEFAULT_STEPS as f64, STEPS_RANGE)?;
        if steps.fract() != 0.0 {
            return Err(GenerationError::InvalidInput(
                "steps must be a whole number".into(),
            ));
        }

        let style_strength = bounded(
            "styleStrength",
            payload.style_strength,
            DEFAULT_STYLE_STRENGTH,
            STYLE_RANGE,
        )?;

        let negative_prompt = payload
            .negative_prompt
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let aspect_ratio = payload
            .aspect_ratio
            .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string());

        Ok(Self {
            prompt,
            negative_prompt,
            aspect_ratio,
            guidance_scale,
            steps: steps as u32,
            style_strength,
        })
    }
}

fn bounded(field: &str, value: Option<f64>, default: f64, (min, max): (f64, f64)) -> Result<f64> {
    let value = value.unwrap_or(default);
    if !value.is_finite() || value < min || value > max {
        return Err(GenerationError::InvalidInput(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(value)
}

/// Pixel size derived from an aspect ratio string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub ratio: String,
}

/// Normalized parameters handed to every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f64,
    pub steps: u32,
    pub style_strength: f64,
}

impl GenerationParams {
    pub fn new(request: &GenerationRequest, dimensions: &Dimensions) -> Self {
        Self {
            prompt: request.prompt.clone(),
            negative_prompt: request.negative_prompt.clone(),
            width: dimensions.width,
            height: dimensions.height,
            guidance_scale: request.guidance_scale,
            steps: request.steps,
            style_strength: request.style_strength,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub image_url: String,
    pub provider: ProviderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub id: String,
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub prompt: String,
}
