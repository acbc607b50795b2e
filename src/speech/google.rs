//! Google Cloud Speech-to-Text and Text-to-Speech over their REST APIs.
//!
//! Both APIs take an API key as a query parameter and exchange audio as
//! base64 strings inside JSON bodies. One [`GoogleCloudSpeech`] value serves
//! both directions and is cheap to share behind an `Arc`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{
    AudioEncoding, RecognitionOptions, SpeechError, SynthesisRequest, Synthesizer, Transcriber,
    VoiceGender,
};
use crate::config::SpeechConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfigBody<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfigBody<'a> {
    encoding: AudioEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate_hertz: Option<u32>,
    language_code: &'a str,
    enable_word_time_offsets: bool,
    enable_automatic_punctuation: bool,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Top alternative of the first result, if the provider heard anything.
    fn first_transcript(self) -> Option<String> {
        self.results
            .into_iter()
            .next()
            .and_then(|result| result.alternatives.into_iter().next())
            .map(|alternative| alternative.transcript)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceParams<'a>,
    audio_config: AudioConfigBody,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceParams<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    ssml_gender: VoiceGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfigBody {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

fn recognize_body<'a>(audio: &[u8], options: &'a RecognitionOptions) -> RecognizeRequest<'a> {
    RecognizeRequest {
        config: RecognitionConfigBody {
            encoding: options.encoding,
            sample_rate_hertz: options.sample_rate_hertz,
            language_code: &options.language_code,
            enable_word_time_offsets: options.word_time_offsets,
            enable_automatic_punctuation: options.automatic_punctuation,
        },
        audio: RecognitionAudio {
            content: BASE64.encode(audio),
        },
    }
}

fn synthesize_body(request: &SynthesisRequest) -> SynthesizeRequest<'_> {
    SynthesizeRequest {
        input: SynthesisInput {
            text: &request.text,
        },
        voice: VoiceParams {
            language_code: &request.voice.language_code,
            name: request.voice.name.as_deref(),
            ssml_gender: request.voice.gender,
        },
        audio_config: AudioConfigBody {
            audio_encoding: "MP3",
            speaking_rate: request.speaking_rate,
            pitch: request.pitch,
        },
    }
}

fn decode_audio_content(response: SynthesizeResponse) -> Result<Vec<u8>, SpeechError> {
    let audio = BASE64
        .decode(response.audio_content.as_bytes())
        .map_err(|e| SpeechError::Decode(e.to_string()))?;
    if audio.is_empty() {
        return Err(SpeechError::EmptyAudio);
    }
    Ok(audio)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// API-key authenticated client for Google Cloud speech services.
pub struct GoogleCloudSpeech {
    client: reqwest::Client,
    api_key: String,
    speech_endpoint: String,
    tts_endpoint: String,
}

impl GoogleCloudSpeech {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured, which puts the
    /// service into degraded mode instead of failing startup.
    pub fn from_config(config: &SpeechConfig) -> Result<Option<Self>, SpeechError> {
        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Ok(None),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            api_key,
            speech_endpoint: config.speech_endpoint.trim_end_matches('/').to_string(),
            tts_endpoint: config.tts_endpoint.trim_end_matches('/').to_string(),
        }))
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, SpeechError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl Transcriber for GoogleCloudSpeech {
    async fn recognize(
        &self,
        audio: &[u8],
        options: &RecognitionOptions,
    ) -> Result<Option<String>, SpeechError> {
        let url = format!("{}/v1/speech:recognize", self.speech_endpoint);
        debug!(
            bytes = audio.len(),
            encoding = ?options.encoding,
            "Sending recognize request"
        );

        let response: RecognizeResponse =
            self.post_json(&url, &recognize_body(audio, options)).await?;
        Ok(response.first_transcript())
    }
}

#[async_trait]
impl Synthesizer for GoogleCloudSpeech {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{}/v1/text:synthesize", self.tts_endpoint);
        debug!(
            chars = request.text.chars().count(),
            voice = ?request.voice.name,
            "Sending synthesize request"
        );

        let response: SynthesizeResponse = self.post_json(&url, &synthesize_body(request)).await?;
        let audio = decode_audio_content(response)?;
        debug!(bytes = audio.len(), "Received synthesized audio");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::speech::VoiceSelection;
    use serde_json::json;

    #[test]
    fn test_no_api_key_means_no_client() {
        let config = AppConfig::default();
        assert!(GoogleCloudSpeech::from_config(&config.speech).unwrap().is_none());

        let mut speech = config.speech.clone();
        speech.api_key = Some("   ".to_string());
        assert!(GoogleCloudSpeech::from_config(&speech).unwrap().is_none());
    }

    #[test]
    fn test_client_built_with_api_key() {
        let mut speech = AppConfig::default().speech;
        speech.api_key = Some("secret".to_string());
        speech.speech_endpoint = "https://speech.example.test/".to_string();
        let client = GoogleCloudSpeech::from_config(&speech).unwrap().unwrap();
        assert_eq!(client.api_key, "secret");
        assert_eq!(client.speech_endpoint, "https://speech.example.test");
    }

    #[test]
    fn test_recognize_body_for_word_check() {
        let options = RecognitionOptions::new(AudioEncoding::Linear16, "en-US");
        let body = serde_json::to_value(recognize_body(b"abc", &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "config": {
                    "encoding": "LINEAR16",
                    "languageCode": "en-US",
                    "enableWordTimeOffsets": false,
                    "enableAutomaticPunctuation": false
                },
                "audio": { "content": "YWJj" }
            })
        );
    }

    #[test]
    fn test_recognize_body_for_sentence() {
        let options = RecognitionOptions::detailed(AudioEncoding::WebmOpus, "en-US", 48000);
        let body = serde_json::to_value(recognize_body(b"", &options)).unwrap();
        assert_eq!(body["config"]["encoding"], "WEBM_OPUS");
        assert_eq!(body["config"]["sampleRateHertz"], 48000);
        assert_eq!(body["config"]["enableWordTimeOffsets"], true);
    }

    #[test]
    fn test_first_transcript_picks_top_alternative() {
        let response: RecognizeResponse = serde_json::from_value(json!({
            "results": [
                { "alternatives": [
                    { "transcript": "hello", "confidence": 0.9 },
                    { "transcript": "yellow" }
                ] },
                { "alternatives": [ { "transcript": "world" } ] }
            ]
        }))
        .unwrap();
        assert_eq!(response.first_transcript().as_deref(), Some("hello"));
    }

    #[test]
    fn test_empty_recognize_response() {
        let response: RecognizeResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.first_transcript(), None);
    }

    #[test]
    fn test_synthesize_body() {
        let request = SynthesisRequest {
            text: "hello".to_string(),
            voice: VoiceSelection::from_voice_name("en-US-Neural2-F"),
            speaking_rate: 0.9,
            pitch: -2.0,
        };
        let body = serde_json::to_value(synthesize_body(&request)).unwrap();
        assert_eq!(body["input"]["text"], "hello");
        assert_eq!(body["voice"]["languageCode"], "en-US");
        assert_eq!(body["voice"]["name"], "en-US-Neural2-F");
        assert_eq!(body["voice"]["ssmlGender"], "MALE");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(body["audioConfig"]["pitch"], -2.0);

        let neutral = SynthesisRequest::pronunciation("cat", "en-US");
        let body = serde_json::to_value(synthesize_body(&neutral)).unwrap();
        assert!(body["voice"].get("name").is_none());
        assert_eq!(body["voice"]["ssmlGender"], "NEUTRAL");
    }

    #[test]
    fn test_decode_audio_content() {
        let audio = decode_audio_content(SynthesizeResponse {
            audio_content: "SUQz".to_string(),
        })
        .unwrap();
        assert_eq!(audio, b"ID3");

        let empty = decode_audio_content(SynthesizeResponse {
            audio_content: String::new(),
        });
        assert!(matches!(empty, Err(SpeechError::EmptyAudio)));

        let garbage = decode_audio_content(SynthesizeResponse {
            audio_content: "not base64!".to_string(),
        });
        assert!(matches!(garbage, Err(SpeechError::Decode(_))));
    }
}
