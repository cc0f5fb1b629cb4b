//! Per-submission state machine tying intake and synthesis together.
//!
//! One submission moves `Idle -> Encoding -> Requesting -> (Success |
//! Failed)`. The terminal phase stays observable until the next submission
//! begins, which restarts the cycle; every failure clears any stored result
//! so the caller can immediately resubmit. There is no retry, no
//! cancellation, and at most one outstanding request.

use crate::error::{PixsynthError, Result};
use crate::intake::ImageTray;
use crate::synth::{SynthesisClient, SynthesisRequest, SynthesisResult};

/// Phase of the current (or last) submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    /// No submission has run yet; ready to accept one.
    #[default]
    Idle,
    /// Reading and encoding the selected files.
    Encoding,
    /// The single network request is outstanding.
    Requesting,
    /// The last submission produced a result. At rest; a new submission may
    /// begin.
    Success,
    /// The last submission failed and its result was cleared. At rest; a new
    /// submission may begin.
    Failed,
}

impl SubmissionPhase {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Encoding => "encoding",
            Self::Requesting => "requesting",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Owns the intake tray and the synthesis client, and runs submissions
/// through the explicit state machine.
pub struct Session {
    tray: ImageTray,
    client: SynthesisClient,
    phase: SubmissionPhase,
    result: Option<SynthesisResult>,
}

impl Session {
    /// Creates a session around an already-built client.
    pub fn new(client: SynthesisClient) -> Self {
        Self {
            tray: ImageTray::new(),
            client,
            phase: SubmissionPhase::Idle,
            result: None,
        }
    }

    /// The intake tray, for adding and removing images.
    pub fn tray(&self) -> &ImageTray {
        &self.tray
    }

    /// Mutable access to the intake tray.
    pub fn tray_mut(&mut self) -> &mut ImageTray {
        &mut self.tray
    }

    /// Current phase of the state machine.
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// The last successful result, if any.
    pub fn result(&self) -> Option<&SynthesisResult> {
        self.result.as_ref()
    }

    /// Runs one submission end to end: validate, encode every selected file
    /// concurrently, send the single request, store the result.
    ///
    /// At most one submission runs at a time: `submit` takes `&mut self`, so
    /// the borrow checker enforces the mutual exclusion and no separate
    /// in-flight flag is needed.
    ///
    /// Validation rejections (blank prompt, empty tray) return before any
    /// file IO or network activity and leave the phase and any stored result
    /// untouched, since no submission was started. Failures past that point
    /// clear the stored result and land in [`SubmissionPhase::Failed`].
    pub async fn submit(&mut self, prompt: &str) -> Result<SynthesisResult> {
        if prompt.trim().is_empty() {
            return Err(PixsynthError::Validation("prompt is blank".into()));
        }
        if self.tray.is_empty() {
            return Err(PixsynthError::Validation("no images selected".into()));
        }

        match self.run(prompt).await {
            Ok(result) => {
                tracing::info!(
                    has_image = result.image_data_url.is_some(),
                    has_text = result.text.is_some(),
                    "submission succeeded"
                );
                self.set_phase(SubmissionPhase::Success);
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission failed");
                self.set_phase(SubmissionPhase::Failed);
                self.result = None;
                Err(e)
            }
        }
    }

    async fn run(&mut self, prompt: &str) -> Result<SynthesisResult> {
        self.set_phase(SubmissionPhase::Encoding);
        let images = self.tray.encode_all().await?;

        self.set_phase(SubmissionPhase::Requesting);
        let request = SynthesisRequest::new(prompt, images);
        self.client.synthesize(&request).await
    }

    fn set_phase(&mut self, phase: SubmissionPhase) {
        tracing::debug!(phase = phase.as_str(), "submission phase");
        self.phase = phase;
    }
}
