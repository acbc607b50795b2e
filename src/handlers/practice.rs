use crate::{
    analysis::{compare_words, summarize_session, ExerciseScore, Status, SyllableFeedback},
    error::{AppError, AppResult},
    speech::{synthesize_or_fallback, transcribe_word, SynthesisRequest},
    state::{AppState, PracticeKind},
};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use serde::Serialize;
use tracing::{info, warn};

/// Response of `POST /practice/word-check`.
#[derive(Debug, Serialize)]
pub struct WordPracticeFeedback {
    pub expected: String,
    pub spoken: String,
    pub feedback: String,
    pub syllable_feedback: Vec<SyllableFeedback>,
    pub score: u32,
    pub status: Status,
    /// URL of the reference pronunciation under `/static`
    pub tts_audio: String,
    /// False when the recording could not be transcribed and was scored as silence
    pub transcript_available: bool,
    /// True when `tts_audio` is placeholder audio rather than real synthesis
    pub tts_simulated: bool,
}

struct WordCheckForm {
    word: String,
    audio: Vec<u8>,
}

/// Score one spoken word against the expected word.
///
/// ## Endpoint: `POST /practice/word-check`
///
/// ## Request:
/// Multipart form with a text field `word` and a file field `audio`.
///
/// ## Response:
/// ```json
/// {
///   "expected": "cat",
///   "spoken": "bat",
///   "feedback": "Keep practicing! Focus on the highlighted syllables.",
///   "syllable_feedback": [{"syllable": "cat", "status": "needs_work", "score": 66}],
///   "score": 66,
///   "status": "needs_work",
///   "tts_audio": "/static/cat.mp3",
///   "transcript_available": true,
///   "tts_simulated": false
/// }
/// ```
pub async fn word_check(state: web::Data<AppState>, payload: Multipart) -> AppResult<HttpResponse> {
    let config = state.get_config();
    let form = read_word_check_form(payload, config.storage.max_upload_bytes).await?;
    info!(word = %form.word, audio_bytes = form.audio.len(), "Word check received");

    let language_code = &config.speech.language_code;
    let transcript = transcribe_word(state.transcriber(), &form.audio, language_code).await;
    let comparison = compare_words(&form.word, transcript.text())?;

    let reference = synthesize_or_fallback(
        state.synthesizer(),
        &SynthesisRequest::pronunciation(&form.word, language_code),
        state.audio_store.dir(),
    )
    .await;
    let tts_audio = if reference.simulated {
        state.audio_store.save_placeholder(&form.word, &reference.bytes).await?
    } else {
        state.audio_store.save(&form.word, &reference.bytes).await?
    };

    state.record_practice(
        PracticeKind::WordCheck,
        !transcript.is_recognized() || reference.simulated,
    );

    Ok(HttpResponse::Ok().json(WordPracticeFeedback {
        spoken: transcript.text().to_string(),
        transcript_available: transcript.is_recognized(),
        expected: form.word,
        feedback: comparison.message,
        syllable_feedback: comparison.syllable_feedback,
        score: comparison.score,
        status: comparison.status,
        tts_audio,
        tts_simulated: reference.simulated,
    }))
}

/// Summarize a finished session.
///
/// ## Endpoint: `POST /practice/session-complete`
///
/// Body is a JSON array of exercise results; only `score` is read.
pub async fn session_complete(results: web::Json<Vec<ExerciseScore>>) -> AppResult<HttpResponse> {
    let summary = summarize_session(&results)?;
    info!(
        num_exercises = summary.num_exercises,
        total_score = summary.total_score,
        "Session completed"
    );
    Ok(HttpResponse::Ok().json(summary))
}

async fn read_word_check_form(
    mut payload: Multipart,
    max_bytes: usize,
) -> AppResult<WordCheckForm> {
    let mut word: Option<String> = None;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field: Field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Missing field name".to_string()))?;

        match field_name.as_str() {
            "word" => {
                let bytes = read_field(&mut field, max_bytes).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| AppError::BadRequest("word must be valid UTF-8".to_string()))?;
                word = Some(text.trim().to_string());
            }
            "audio" => audio = Some(read_field(&mut field, max_bytes).await?),
            other => {
                warn!(field = other, "Ignoring unexpected multipart field");
                read_field(&mut field, max_bytes).await?;
            }
        }
    }

    let word = word
        .filter(|w| !w.is_empty())
        .ok_or_else(|| AppError::ValidationError("word must not be empty".to_string()))?;
    let audio = audio
        .ok_or_else(|| AppError::ValidationError("No audio file provided".to_string()))?;

    Ok(WordCheckForm { word, audio })
}

/// Drain one field, failing as soon as it grows past `max_bytes`.
async fn read_field(field: &mut Field, max_bytes: usize) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
        if bytes.len() + chunk.len() > max_bytes {
            return Err(AppError::ValidationError(format!(
                "Upload too large (max: {} bytes)",
                max_bytes
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
