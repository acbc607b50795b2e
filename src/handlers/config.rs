use crate::{config::AppConfig, error::AppError, state::AppState};
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Config as exposed over HTTP; the API key is reported as present or not.
fn config_view(config: &AppConfig) -> serde_json::Value {
    json!({
        "server": {
            "host": config.server.host,
            "port": config.server.port
        },
        "speech": {
            "api_key_configured": config.has_speech_credentials(),
            "language_code": config.speech.language_code,
            "speech_endpoint": config.speech.speech_endpoint,
            "tts_endpoint": config.speech.tts_endpoint,
            "default_voice": config.speech.default_voice,
            "sample_rate_hertz": config.speech.sample_rate_hertz,
            "request_timeout_secs": config.speech.request_timeout_secs
        },
        "storage": {
            "static_dir": config.storage.static_dir,
            "max_upload_bytes": config.storage.max_upload_bytes
        }
    })
}

pub async fn get_config(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let config = state.get_config();

    Ok(HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "config": config_view(&config)
    })))
}

pub async fn update_config(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let json_str = serde_json::to_string(&body.into_inner())?;

    let mut current_config = state.get_config();
    current_config
        .update_from_json(&json_str)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .update_config(current_config.clone())
        .map_err(AppError::ValidationError)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Configuration updated successfully",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "updated_config": config_view(&current_config)
    })))
}
