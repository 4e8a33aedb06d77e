use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the upstream service that produced an image.
///
/// [`ProviderKind::Fal`] is the primary provider and
/// [`ProviderKind::OpenAi`] the secondary one, tried only when fal has no
/// credential.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Fal,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Fal => "fal",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every non-200 response from the generate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AspectPreset {
    pub label: &'static str,
    pub ratio: &'static str,
    pub hint: &'static str,
}

/// A preset together with the pixel size it resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPreset {
    pub label: String,
    pub ratio: String,
    pub hint: String,
    pub width: u32,
    pub height: u32,
}
