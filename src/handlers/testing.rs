//! Test doubles and app builders shared by the handler tests.

use crate::config::AppConfig;
use crate::speech::{
    RecognitionOptions, SpeechError, SpeechProviders, SynthesisRequest, Synthesizer, Transcriber,
};
use crate::state::AppState;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Always hears the same text.
pub struct HearsText(pub &'static str);

#[async_trait]
impl Transcriber for HearsText {
    async fn recognize(
        &self,
        _audio: &[u8],
        _options: &RecognitionOptions,
    ) -> Result<Option<String>, SpeechError> {
        Ok(Some(self.0.to_string()))
    }
}

/// Fails every call like an unreachable provider.
pub struct Offline;

#[async_trait]
impl Transcriber for Offline {
    async fn recognize(
        &self,
        _audio: &[u8],
        _options: &RecognitionOptions,
    ) -> Result<Option<String>, SpeechError> {
        Err(SpeechError::Request("connection refused".to_string()))
    }
}

#[async_trait]
impl Synthesizer for Offline {
    async fn synthesize(&self, _request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError> {
        Err(SpeechError::Request("connection refused".to_string()))
    }
}

/// Returns the request text prefixed with a fake ID3 tag.
pub struct EchoSynthesizer;

#[async_trait]
impl Synthesizer for EchoSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError> {
        Ok(format!("ID3{}", request.text).into_bytes())
    }
}

/// State whose static directory lives under `dir`.
pub fn state_with(
    dir: &Path,
    transcriber: Option<Arc<dyn Transcriber>>,
    synthesizer: Option<Arc<dyn Synthesizer>>,
) -> AppState {
    let mut config = AppConfig::default();
    config.storage.static_dir = dir.join("static").to_string_lossy().into_owned();
    AppState::new(
        config,
        SpeechProviders {
            transcriber,
            synthesizer,
        },
    )
}
