use crate::{
    error::Result,
    models::{GenerationParams, ProviderKind, ProviderResult},
};
use async_trait::async_trait;

/// What a provider did with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Generated(ProviderResult),
    /// No credential is configured; the next provider should be tried.
    Unavailable,
}

/// One upstream image generation service.
///
/// Implementations translate [`GenerationParams`] into their own wire
/// format and always report back a [`ProviderResult`]. A missing credential
/// is reported as [`ProviderOutcome::Unavailable`], never as an error.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn is_configured(&self) -> bool;

    async fn generate(&self, params: &GenerationParams) -> Result<ProviderOutcome>;
}
