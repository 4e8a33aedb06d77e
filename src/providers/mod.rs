pub mod fal;
pub mod openai;
pub mod seed;
pub mod traits;

pub use fal::FalProvider;
pub use openai::{OpenAiProvider, OpenAiSize};
pub use seed::{FixedSeed, RandomSeed, SeedSource};
pub use traits::{ImageProvider, ProviderOutcome};
