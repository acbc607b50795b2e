//! Provider calls with an explicit degraded branch.
//!
//! Every helper here takes the provider as an `Option`: `None` means the
//! service runs without credentials. Failures are logged and turned into a
//! [`TranscriptOutcome::Unavailable`] or a [`SynthesizedAudio`] with
//! `simulated: true`, never into data that looks real.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::Path;
use tracing::{error, info, warn};

use super::{
    AudioEncoding, RecognitionOptions, SynthesisRequest, Synthesizer, Transcriber,
    TranscriptOutcome,
};

/// Smallest MP3 frame header we can hand back when no audio exists at all.
const MINIMAL_MP3: &[u8] = &[
    0xFF, 0xFB, 0x90, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00,
];

/// File in the static directory used instead of real synthesis when present.
const SAMPLE_AUDIO_FILE: &str = "sample.mp3";

fn unavailable(reason: impl Into<String>) -> TranscriptOutcome {
    TranscriptOutcome::Unavailable {
        reason: reason.into(),
    }
}

/// Transcribe a single-word recording (LINEAR16, provider-detected rate).
///
/// Any failure degrades to an unavailable transcript, which scores as an
/// empty attempt.
pub async fn transcribe_word(
    transcriber: Option<&dyn Transcriber>,
    audio: &[u8],
    language_code: &str,
) -> TranscriptOutcome {
    let Some(transcriber) = transcriber else {
        warn!("Speech-to-text provider not configured; treating transcript as empty");
        return unavailable("speech-to-text provider not configured");
    };

    let options = RecognitionOptions::new(AudioEncoding::Linear16, language_code);
    match transcriber.recognize(audio, &options).await {
        Ok(Some(text)) => {
            info!(transcript = %text, "Word transcribed");
            TranscriptOutcome::Recognized(text)
        }
        Ok(None) => {
            warn!("No transcription results returned for word check");
            unavailable("no transcription results")
        }
        Err(e) => {
            error!(error = %e, "Word transcription failed");
            unavailable(e.to_string())
        }
    }
}

/// Transcribe a base64 sentence recording from the browser.
///
/// Tries WEBM_OPUS first and retries once as LINEAR16 on a provider error,
/// both at `sample_rate_hertz`.
pub async fn transcribe_phrase(
    transcriber: Option<&dyn Transcriber>,
    audio_base64: &str,
    language_code: &str,
    sample_rate_hertz: u32,
) -> TranscriptOutcome {
    let Some(transcriber) = transcriber else {
        warn!("Speech-to-text provider not configured; using simulated analysis");
        return unavailable("speech-to-text provider not configured");
    };

    let audio = match BASE64.decode(audio_base64.trim().as_bytes()) {
        Ok(audio) => {
            info!(bytes = audio.len(), "Decoded audio data");
            audio
        }
        Err(e) => {
            error!(error = %e, "Error decoding base64 audio");
            return unavailable(format!("invalid base64 audio: {}", e));
        }
    };

    let webm =
        RecognitionOptions::detailed(AudioEncoding::WebmOpus, language_code, sample_rate_hertz);
    let result = match transcriber.recognize(&audio, &webm).await {
        Ok(result) => Ok(result),
        Err(e) => {
            warn!(error = %e, "WEBM_OPUS recognition failed, retrying as LINEAR16");
            let linear = RecognitionOptions::detailed(
                AudioEncoding::Linear16,
                language_code,
                sample_rate_hertz,
            );
            transcriber.recognize(&audio, &linear).await
        }
    };

    match result {
        Ok(Some(text)) => {
            info!(transcript = %text, "Sentence transcribed");
            TranscriptOutcome::Recognized(text)
        }
        Ok(None) => {
            warn!("No transcription results returned");
            unavailable("no transcription results")
        }
        Err(e) => {
            error!(error = %e, "Recognition failed for both encodings");
            unavailable(e.to_string())
        }
    }
}

/// MP3 bytes plus whether they came from the real synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub simulated: bool,
}

/// Synthesize `request`, or fall back to placeholder audio.
///
/// The placeholder is `sample.mp3` from `static_dir` when it exists,
/// otherwise a bare MP3 frame header that plays nothing.
pub async fn synthesize_or_fallback(
    synthesizer: Option<&dyn Synthesizer>,
    request: &SynthesisRequest,
    static_dir: &Path,
) -> SynthesizedAudio {
    match synthesizer {
        Some(synthesizer) => match synthesizer.synthesize(request).await {
            Ok(bytes) => {
                return SynthesizedAudio {
                    bytes,
                    simulated: false,
                }
            }
            Err(e) => error!(error = %e, "Speech synthesis failed; using placeholder audio"),
        },
        None => warn!("Text-to-speech provider not configured; using placeholder audio"),
    }

    SynthesizedAudio {
        bytes: placeholder_audio(static_dir).await,
        simulated: true,
    }
}

async fn placeholder_audio(static_dir: &Path) -> Vec<u8> {
    let sample_path = static_dir.join(SAMPLE_AUDIO_FILE);
    match tokio::fs::read(&sample_path).await {
        Ok(bytes) => {
            info!(path = %sample_path.display(), "Using sample audio file");
            bytes
        }
        Err(_) => {
            warn!("Sample audio file not found, generating minimal MP3");
            MINIMAL_MP3.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SpeechError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replays scripted answers and records the encodings it was asked for.
    struct ScriptedTranscriber {
        answers: Mutex<Vec<Result<Option<String>, SpeechError>>>,
        seen: Mutex<Vec<AudioEncoding>>,
    }

    impl ScriptedTranscriber {
        fn new(mut answers: Vec<Result<Option<String>, SpeechError>>) -> Self {
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<AudioEncoding> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn recognize(
            &self,
            _audio: &[u8],
            options: &RecognitionOptions,
        ) -> Result<Option<String>, SpeechError> {
            self.seen.lock().unwrap().push(options.encoding);
            self.answers.lock().unwrap().pop().unwrap_or(Ok(None))
        }
    }

    struct FixedSynthesizer(Result<Vec<u8>, ()>);

    #[async_trait]
    impl Synthesizer for FixedSynthesizer {
        async fn synthesize(&self, _request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError> {
            self.0.clone().map_err(|_| SpeechError::Timeout)
        }
    }

    // -----------------------------------------------------------------------
    // Transcription
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_word_without_provider_is_unavailable() {
        let outcome = transcribe_word(None, b"audio", "en-US").await;
        assert!(!outcome.is_recognized());
        assert_eq!(outcome.text(), "");
    }

    #[tokio::test]
    async fn test_word_uses_linear16() {
        let transcriber = ScriptedTranscriber::new(vec![Ok(Some("cat".to_string()))]);
        let outcome = transcribe_word(Some(&transcriber), b"audio", "en-US").await;
        assert_eq!(outcome, TranscriptOutcome::Recognized("cat".to_string()));
        assert_eq!(transcriber.seen(), vec![AudioEncoding::Linear16]);
    }

    #[tokio::test]
    async fn test_word_provider_error_degrades() {
        let transcriber = ScriptedTranscriber::new(vec![Err(SpeechError::Timeout)]);
        let outcome = transcribe_word(Some(&transcriber), b"audio", "en-US").await;
        assert_eq!(outcome.text(), "");
        assert!(!outcome.is_recognized());
    }

    #[tokio::test]
    async fn test_phrase_retries_as_linear16() {
        let transcriber = ScriptedTranscriber::new(vec![
            Err(SpeechError::Status {
                status: 400,
                body: "bad encoding".to_string(),
            }),
            Ok(Some("hello there".to_string())),
        ]);
        let outcome = transcribe_phrase(Some(&transcriber), "aGVsbG8=", "en-US", 48000).await;
        assert_eq!(outcome, TranscriptOutcome::Recognized("hello there".to_string()));
        assert_eq!(
            transcriber.seen(),
            vec![AudioEncoding::WebmOpus, AudioEncoding::Linear16]
        );
    }

    #[tokio::test]
    async fn test_phrase_both_encodings_fail() {
        let transcriber =
            ScriptedTranscriber::new(vec![Err(SpeechError::Timeout), Err(SpeechError::Timeout)]);
        let outcome = transcribe_phrase(Some(&transcriber), "aGVsbG8=", "en-US", 48000).await;
        assert!(!outcome.is_recognized());
    }

    #[tokio::test]
    async fn test_phrase_no_results_is_unavailable() {
        let transcriber = ScriptedTranscriber::new(vec![Ok(None)]);
        let outcome = transcribe_phrase(Some(&transcriber), "aGVsbG8=", "en-US", 48000).await;
        assert!(!outcome.is_recognized());
        assert_eq!(transcriber.seen(), vec![AudioEncoding::WebmOpus]);
    }

    #[tokio::test]
    async fn test_phrase_bad_base64_skips_provider() {
        let transcriber = ScriptedTranscriber::new(vec![Ok(Some("never".to_string()))]);
        let outcome = transcribe_phrase(Some(&transcriber), "%%%", "en-US", 48000).await;
        assert!(!outcome.is_recognized());
        assert!(transcriber.seen().is_empty());
    }

    // -----------------------------------------------------------------------
    // Synthesis
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_synthesis_success_is_real() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = FixedSynthesizer(Ok(b"ID3audio".to_vec()));
        let request = SynthesisRequest::pronunciation("cat", "en-US");
        let audio = synthesize_or_fallback(Some(&synthesizer), &request, dir.path()).await;
        assert_eq!(audio.bytes, b"ID3audio");
        assert!(!audio.simulated);
    }

    #[tokio::test]
    async fn test_synthesis_failure_uses_minimal_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = FixedSynthesizer(Err(()));
        let request = SynthesisRequest::pronunciation("cat", "en-US");
        let audio = synthesize_or_fallback(Some(&synthesizer), &request, dir.path()).await;
        assert_eq!(audio.bytes, MINIMAL_MP3);
        assert_eq!(audio.bytes.len(), 18);
        assert!(audio.simulated);
    }

    #[tokio::test]
    async fn test_missing_synthesizer_prefers_sample_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SAMPLE_AUDIO_FILE), b"sample").unwrap();
        let request = SynthesisRequest::pronunciation("cat", "en-US");
        let audio = synthesize_or_fallback(None, &request, dir.path()).await;
        assert_eq!(audio.bytes, b"sample");
        assert!(audio.simulated);
    }
}
