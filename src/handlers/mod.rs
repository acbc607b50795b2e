//! # HTTP Request Handlers
//!
//! Paths match what the NeuroSpeak frontend already calls, so practice and
//! speech routes sit at the root while operational endpoints live under
//! `/api/v1`.
//!
//! ## Available Endpoints:
//! - `POST /practice/word-check` - Score one spoken word (multipart upload)
//! - `POST /practice/session-complete` - Summarize a practice session
//! - `GET /speech/exercises` - List built-in exercises
//! - `POST /speech/progress` - Acknowledge an exercise result
//! - `POST /speech/analyze` - Score a spoken sentence (base64 JSON upload)
//! - `POST /tts` - Synthesize speech
//! - `GET /static/{file_name}` - Download stored reference audio
//! - `GET|PUT /api/v1/config` - Inspect or adjust runtime configuration

pub mod assets;
pub mod config;
pub mod practice;
pub mod speech;
pub mod tts;

#[cfg(test)]
pub(crate) mod testing;

use crate::health;
use actix_web::web;

/// Register every route on an app or test service.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health::health_check))
                .route("/metrics", web::get().to(health::detailed_metrics))
                .route("/config", web::get().to(config::get_config))
                .route("/config", web::put().to(config::update_config)),
        )
        .service(
            web::scope("/practice")
                .route("/word-check", web::post().to(practice::word_check))
                .route("/session-complete", web::post().to(practice::session_complete)),
        )
        .service(
            web::scope("/speech")
                .route("/exercises", web::get().to(speech::list_exercises))
                .route("/progress", web::post().to(speech::save_progress))
                .route("/analyze", web::post().to(speech::analyze_speech)),
        )
        .route("/tts", web::post().to(tts::text_to_speech))
        .route("/static/{file_name}", web::get().to(assets::serve_static));
}
