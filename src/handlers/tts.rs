use crate::{
    error::{AppError, AppResult},
    speech::{synthesize_or_fallback, SynthesisRequest, VoiceSelection},
    state::{AppState, PracticeKind},
};
use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Header set on every `/tts` response; `true` means placeholder audio.
pub const SIMULATED_AUDIO_HEADER: &str = "X-Audio-Simulated";

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    /// Voice name such as `en-US-Neural2-F`; the configured default when absent
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f32,
    #[serde(default)]
    pub pitch: f32,
}

fn default_speaking_rate() -> f32 {
    1.0
}

/// Synthesize speech and return it as an MP3 attachment.
///
/// ## Endpoint: `POST /tts`
///
/// ## Request:
/// ```json
/// {"text": "Hello there", "voice": "en-GB-Wavenet-B", "speaking_rate": 0.9, "pitch": 0.0}
/// ```
pub async fn text_to_speech(
    state: web::Data<AppState>,
    request: web::Json<TtsRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    if request.text.trim().is_empty() {
        return Err(AppError::ValidationError("text must not be empty".to_string()));
    }

    let voice_name = match request.voice {
        Some(voice) => voice,
        None => state.get_config().speech.default_voice,
    };
    let voice = VoiceSelection::from_voice_name(&voice_name);
    info!(voice = %voice_name, chars = request.text.len(), "Synthesizing speech");

    let synthesis = SynthesisRequest {
        text: request.text,
        voice,
        speaking_rate: request.speaking_rate,
        pitch: request.pitch,
    };
    let audio =
        synthesize_or_fallback(state.synthesizer(), &synthesis, state.audio_store.dir()).await;
    state.record_practice(PracticeKind::Tts, audio.simulated);

    let file_name = if audio.simulated {
        format!("tts_mock_{}.mp3", Uuid::new_v4())
    } else {
        format!("tts_{}.mp3", Uuid::new_v4())
    };

    Ok(HttpResponse::Ok()
        .content_type("audio/mp3")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", file_name),
        ))
        .insert_header((SIMULATED_AUDIO_HEADER, audio.simulated.to_string()))
        .body(audio.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::configure_routes;
    use crate::handlers::testing::{state_with, EchoSynthesizer, Offline};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_request_defaults() {
        let request: TtsRequest = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(request.voice, None);
        assert_eq!(request.speaking_rate, 1.0);
        assert_eq!(request.pitch, 0.0);
    }

    #[actix_web::test]
    async fn test_tts_returns_synthesized_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), None, Some(Arc::new(EchoSynthesizer)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/tts")
            .set_json(json!({"text": "good morning"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "audio/mp3");
        assert_eq!(resp.headers().get(SIMULATED_AUDIO_HEADER).unwrap(), "false");
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().starts_with("attachment; filename=tts_"));
        assert!(!disposition.to_str().unwrap().contains("mock"));

        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"ID3good morning");
    }

    #[actix_web::test]
    async fn test_tts_failure_returns_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), None, Some(Arc::new(Offline)));
        let metrics = state.metrics.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/tts")
            .set_json(json!({"text": "hello", "voice": "en-GB-Wavenet-B"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(SIMULATED_AUDIO_HEADER).unwrap(), "true");
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("tts_mock_"));
        assert!(!test::read_body(resp).await.is_empty());

        let metrics = metrics.read().unwrap();
        assert_eq!(metrics.tts_requests, 1);
        assert_eq!(metrics.fallback_responses, 1);
        assert_eq!(metrics.fallback_rate(), 1.0);
    }

    #[actix_web::test]
    async fn test_tts_rejects_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), None, None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/tts")
            .set_json(json!({"text": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
