//! Image generation service: request validation, aspect ratio resolution
//! and a primary/secondary provider chain behind one endpoint.

pub mod aspect;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod logger;
pub mod models;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;

pub use client::StudioClient;
pub use config::{Config, ProviderConfig};
pub use error::{ErrorKind, GenerationError, Result};
pub use generator::ImageGenerator;
pub use models::*;
pub use providers::{FalProvider, ImageProvider, OpenAiProvider, ProviderOutcome, SeedSource};
