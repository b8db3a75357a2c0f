//! Warm-up wrapper for transcribers with one-time startup cost.
//!
//! Loading a local speech model can take tens of seconds. The wrapper starts
//! the load in the background at construction time; the session waits for
//! readiness with a bounded timeout and continues degraded if the deadline
//! passes, with each transcription attempt failing fast until the backend
//! comes up.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use voce_core::{BoxedTranscriber, Result, Transcriber, Transcription, VoiceError};

#[derive(Clone)]
enum LoadState {
    Loading,
    Ready(BoxedTranscriber),
    Failed(String),
}

/// A transcriber that becomes usable once its background load completes.
pub struct WarmupTranscriber {
    state: watch::Receiver<LoadState>,
}

impl WarmupTranscriber {
    /// Start loading in the background.
    ///
    /// `load` runs on its own task; it typically constructs the real backend
    /// and performs whatever model download or initialization it needs.
    pub fn spawn<F>(load: F) -> Self
    where
        F: Future<Output = Result<BoxedTranscriber>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(LoadState::Loading);
        tokio::spawn(async move {
            let state = match load.await {
                Ok(inner) => {
                    info!(backend = inner.name(), "transcriber finished loading");
                    LoadState::Ready(inner)
                }
                Err(e) => {
                    error!(error = %e, "transcriber failed to load");
                    LoadState::Failed(e.to_string())
                }
            };
            let _ = tx.send(state);
        });
        Self { state: rx }
    }

    fn current(&self) -> LoadState {
        self.state.borrow().clone()
    }
}

#[async_trait]
impl Transcriber for WarmupTranscriber {
    fn name(&self) -> &str {
        "warmup"
    }

    fn input_sample_rate(&self) -> u32 {
        match self.current() {
            LoadState::Ready(inner) => inner.input_sample_rate(),
            _ => 16000,
        }
    }

    async fn ready(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.state.clone();
        let wait = async move {
            loop {
                let state = rx.borrow_and_update().clone();
                match state {
                    LoadState::Ready(_) => return Ok(()),
                    LoadState::Failed(reason) => {
                        return Err(VoiceError::transcription(reason));
                    }
                    LoadState::Loading => {}
                }
                if rx.changed().await.is_err() {
                    return Err(VoiceError::transcription("loader task dropped"));
                }
            }
        };
        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(VoiceError::timeout(format!(
                "transcriber not ready after {}s",
                timeout.as_secs_f64()
            ))),
        }
    }

    async fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Transcription> {
        match self.current() {
            LoadState::Ready(inner) => inner.transcribe(samples, sample_rate).await,
            LoadState::Loading => Err(VoiceError::not_ready("transcriber is still loading")),
            LoadState::Failed(reason) => Err(VoiceError::transcription(reason)),
        }
    }
}
