//! # Speech Provider Module
//!
//! Boundary to the cloud speech services. The rest of the application only
//! sees two capabilities, both injected into the shared state at startup:
//!
//! - [`Transcriber`]: audio bytes in, transcript out
//! - [`Synthesizer`]: text in, MP3 bytes out
//!
//! ## Key Components:
//! - **google**: Google Cloud Speech-to-Text / Text-to-Speech over REST
//! - **fallback**: Explicit degraded branches when a provider is missing or fails
//! - **storage**: Reference audio files served under `/static`
//!
//! ## Degraded Mode:
//! When no API key is configured the providers are simply absent. Handlers
//! never pretend that made-up data is real: transcription returns a
//! [`TranscriptOutcome::Unavailable`] and synthesized audio carries a
//! `simulated` flag.

pub mod google;    // REST client for both Google Cloud speech APIs
pub mod fallback;  // Provider-or-fallback helpers used by the handlers
pub mod storage;   // Reference audio files on disk

pub use fallback::{synthesize_or_fallback, transcribe_phrase, transcribe_word};
pub use google::GoogleCloudSpeech;
pub use storage::ReferenceAudioStore;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a speech provider.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP transport or connection error.
    #[error("speech provider request failed: {0}")]
    Request(String),

    /// The provider did not answer within the configured timeout.
    #[error("speech provider request timed out")]
    Timeout,

    /// The provider answered with a non-success HTTP status.
    #[error("speech provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider's response (or the audio we were given) could not be decoded.
    #[error("failed to decode speech payload: {0}")]
    Decode(String),

    /// Synthesis succeeded but produced no audio.
    #[error("speech provider returned no audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else if e.is_decode() {
            SpeechError::Decode(e.to_string())
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

/// Audio container/codec of uploaded recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioEncoding {
    #[serde(rename = "LINEAR16")]
    Linear16,
    #[serde(rename = "WEBM_OPUS")]
    WebmOpus,
}

/// How a recording should be recognized.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOptions {
    pub encoding: AudioEncoding,
    /// Left to the provider (read from the file header) when `None`
    pub sample_rate_hertz: Option<u32>,
    pub language_code: String,
    pub word_time_offsets: bool,
    pub automatic_punctuation: bool,
}

impl RecognitionOptions {
    /// Plain recognition: no sample rate hint, no timing, no punctuation.
    pub fn new(encoding: AudioEncoding, language_code: &str) -> Self {
        Self {
            encoding,
            sample_rate_hertz: None,
            language_code: language_code.to_string(),
            word_time_offsets: false,
            automatic_punctuation: false,
        }
    }

    /// Sentence recognition with word timing and punctuation enabled.
    pub fn detailed(encoding: AudioEncoding, language_code: &str, sample_rate_hertz: u32) -> Self {
        Self {
            encoding,
            sample_rate_hertz: Some(sample_rate_hertz),
            language_code: language_code.to_string(),
            word_time_offsets: true,
            automatic_punctuation: true,
        }
    }
}

/// Speech-to-text capability.
///
/// Implementors must be `Send + Sync` so they can be shared across actix
/// workers as `Arc<dyn Transcriber>`.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio`. `Ok(None)` means the provider heard nothing.
    async fn recognize(
        &self,
        audio: &[u8],
        options: &RecognitionOptions,
    ) -> Result<Option<String>, SpeechError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceGender {
    Neutral,
    Female,
    Male,
}

/// Which voice the synthesizer should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub language_code: String,
    pub name: Option<String>,
    pub gender: VoiceGender,
}

pub const DEFAULT_VOICE: &str = "en-US-Neural2-F";

impl VoiceSelection {
    /// Provider-chosen neutral voice for a language.
    pub fn neutral(language_code: &str) -> Self {
        Self {
            language_code: language_code.to_string(),
            name: None,
            gender: VoiceGender::Neutral,
        }
    }

    /// Interpret a voice name such as `en-US-Neural2-F`.
    ///
    /// Names with fewer than three `-` separated parts fall back to the
    /// default US English female voice. Otherwise the language is taken from
    /// the first two parts and the voice counts as female when the name
    /// contains "Female" or its third part contains an "F".
    pub fn from_voice_name(voice: &str) -> Self {
        let parts: Vec<&str> = voice.split('-').collect();
        if parts.len() < 3 {
            return Self {
                language_code: "en-US".to_string(),
                name: Some(DEFAULT_VOICE.to_string()),
                gender: VoiceGender::Female,
            };
        }

        let gender = if voice.contains("Female") || parts[2].contains('F') {
            VoiceGender::Female
        } else {
            VoiceGender::Male
        };

        Self {
            language_code: format!("{}-{}", parts[0], parts[1]),
            name: Some(voice.to_string()),
            gender,
        }
    }
}

/// Everything needed to synthesize one MP3 clip.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceSelection,
    pub speaking_rate: f32,
    pub pitch: f32,
}

impl SynthesisRequest {
    /// Reference pronunciation of a practice word at normal speed.
    pub fn pronunciation(word: &str, language_code: &str) -> Self {
        Self {
            text: word.to_string(),
            voice: VoiceSelection::neutral(language_code),
            speaking_rate: 1.0,
            pitch: 0.0,
        }
    }
}

/// Text-to-speech capability.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize `request` to MP3 bytes.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError>;
}

/// What the transcription step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// The provider returned a transcript.
    Recognized(String),
    /// No real transcript exists; `reason` says why.
    Unavailable { reason: String },
}

impl TranscriptOutcome {
    /// Transcript text, empty when unavailable.
    pub fn text(&self) -> &str {
        match self {
            TranscriptOutcome::Recognized(text) => text,
            TranscriptOutcome::Unavailable { .. } => "",
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, TranscriptOutcome::Recognized(_))
    }
}

/// Speech capabilities injected into the application state.
///
/// Either side may be absent when the service runs without credentials.
#[derive(Clone, Default)]
pub struct SpeechProviders {
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub synthesizer: Option<Arc<dyn Synthesizer>>,
}

impl SpeechProviders {
    /// Use one Google Cloud client for both directions.
    pub fn google(client: GoogleCloudSpeech) -> Self {
        let client = Arc::new(client);
        Self {
            transcriber: Some(client.clone()),
            synthesizer: Some(client),
        }
    }
}

impl std::fmt::Debug for SpeechProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechProviders")
            .field("transcriber", &self.transcriber.is_some())
            .field("synthesizer", &self.synthesizer.is_some())
            .finish()
    }
}
