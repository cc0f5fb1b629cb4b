#![warn(missing_docs)]
//! Pixsynth - multimodal image synthesis from reference images and a prompt.
//!
//! This crate collects a set of local image files, encodes them for
//! transport, and submits them with a text prompt in a single request to a
//! hosted generation endpoint that can answer with an image, text, or both.
//!
//! # Quick Start
//!
//! ```no_run
//! use pixsynth::{Session, SynthesisClient};
//!
//! #[tokio::main]
//! async fn main() -> pixsynth::Result<()> {
//!     let client = SynthesisClient::builder().build()?;
//!     let mut session = Session::new(client);
//!
//!     session.tray_mut().add(["sketch.png", "palette.jpg"]);
//!     let result = session.submit("Render the sketch in this palette").await?;
//!
//!     if let Some(text) = &result.text {
//!         println!("{text}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The API key is read from `GOOGLE_API_KEY` unless set explicitly on the
//! builder; building the client fails when neither is present.

mod error;
pub mod intake;
mod session;
pub mod synth;

// Re-export error types at crate root
pub use error::{PixsynthError, Result};

pub use intake::{EncodedImage, ImageEntry, ImageTray, MediaKind, PreviewHandle};
pub use session::{Session, SubmissionPhase};
pub use synth::{SynthModel, SynthesisClient, SynthesisClientBuilder, SynthesisRequest, SynthesisResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{PixsynthError, Result};
    pub use crate::intake::{EncodedImage, ImageTray};
    pub use crate::session::{Session, SubmissionPhase};
    pub use crate::synth::{SynthesisClient, SynthesisRequest, SynthesisResult};
}
