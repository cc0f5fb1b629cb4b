//! Synthesis client: one request to the multimodal generation endpoint,
//! one parsed result.

mod client;
mod types;

pub use client::{SynthesisClient, SynthesisClientBuilder};
pub use types::{SynthModel, SynthesisRequest, SynthesisResult};
