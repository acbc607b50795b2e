use crate::{
    analysis::{analyze_phrase, simulate_analysis},
    catalog,
    error::{AppError, AppResult},
    speech::{transcribe_phrase, TranscriptOutcome},
    state::{AppState, PracticeKind},
};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct ExerciseQuery {
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

/// Exercise result posted by the client. Acknowledged and logged only.
#[derive(Debug, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub exercise_id: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct SpeechAnalysisRequest {
    pub audio_base64: String,
    pub target_text: String,
}

/// `GET /speech/exercises?difficulty=easy&category=general`
pub async fn list_exercises(query: web::Query<ExerciseQuery>) -> HttpResponse {
    HttpResponse::Ok().json(catalog::list_exercises(
        query.difficulty.as_deref(),
        query.category.as_deref(),
    ))
}

/// `POST /speech/progress`
pub async fn save_progress(record: web::Json<ProgressRecord>) -> HttpResponse {
    info!(
        user_id = %record.user_id,
        exercise_id = %record.exercise_id,
        score = record.score,
        "Progress received"
    );
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Progress saved successfully"
    }))
}

/// Analyze a recorded sentence against its target text.
///
/// ## Endpoint: `POST /speech/analyze`
///
/// ## Request:
/// ```json
/// {
///   "audio_base64": "GkXfo59ChoEBQveBAULygQRC84EIQoKEd2VibUKHgQRChYECGFOAZwH/////////",
///   "target_text": "Hello, how are you today?"
/// }
/// ```
///
/// When no transcript can be produced the response is simulated and carries
/// `"simulated": true`.
pub async fn analyze_speech(
    state: web::Data<AppState>,
    request: web::Json<SpeechAnalysisRequest>,
) -> AppResult<HttpResponse> {
    let target_text = request.target_text.trim();
    if target_text.is_empty() {
        return Err(AppError::ValidationError(
            "target_text must not be empty".to_string(),
        ));
    }

    let config = state.get_config();
    let outcome = transcribe_phrase(
        state.transcriber(),
        &request.audio_base64,
        &config.speech.language_code,
        config.speech.sample_rate_hertz,
    )
    .await;

    let analysis = match outcome {
        TranscriptOutcome::Recognized(transcription) => analyze_phrase(target_text, &transcription),
        TranscriptOutcome::Unavailable { reason } => {
            warn!(reason = %reason, "No transcript available, returning simulated analysis");
            simulate_analysis(target_text, &mut rand::thread_rng())
        }
    };

    state.record_practice(PracticeKind::PhraseAnalysis, analysis.simulated);
    info!(
        score = analysis.score,
        simulated = analysis.simulated,
        "Speech analysis complete"
    );

    Ok(HttpResponse::Ok().json(analysis))
}
