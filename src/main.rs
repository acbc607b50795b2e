//! # NeuroSpeak Backend - Main Application Entry Point
//!
//! This is the main entry point for the neurospeak-backend web server.
//! It sets up an Actix-web HTTP server for pronunciation practice:
//! learners upload a spoken word or sentence, the service transcribes it,
//! scores it against the target and answers with structured feedback plus a
//! reference pronunciation.
//!
//! ## Key Rust Concepts Used:
//! - **async/await**: The entire application is asynchronous, so slow speech
//!   provider calls never block other requests
//! - **modules**: Code is organized into separate modules (mod statements)
//! - **Result<T, E>**: Error handling using Rust's Result type
//! - **Arc & trait objects**: Speech providers are shared across workers as `Arc<dyn Trait>`
//! - **static**: Global variables that live for the entire program duration
//!
//! ## Application Architecture:
//! - **analysis**: Pure scoring engine (syllables, similarity, feedback tiers)
//! - **speech**: Speech-to-text / text-to-speech providers and their fallbacks
//! - **catalog**: Built-in practice exercises
//! - **config**: Handles application configuration (TOML files + environment variables)
//! - **state**: Manages shared application state and metrics
//! - **health**: Provides system health monitoring endpoints
//! - **middleware**: Custom request processing logic (logging, metrics)
//! - **handlers**: HTTP request handlers for API endpoints
//! - **error**: Custom error types and HTTP error responses

// Module declarations - These tell Rust about our other source files
mod analysis;    // Pronunciation scoring engine (analysis/ directory)
mod catalog;     // Exercise catalog (catalog.rs)
mod config;      // Configuration management (config.rs)
mod error;       // Error handling types (error.rs)
mod handlers;    // HTTP request handlers (handlers/ directory)
mod health;      // Health check endpoints (health.rs)
mod middleware;  // Custom middleware (middleware/ directory)
mod speech;      // Cloud speech providers (speech/ directory)
mod state;       // Application state management (state.rs)

// External crate imports - These are dependencies from Cargo.toml
use actix_cors::Cors;  // Cross-Origin Resource Sharing support
use actix_web::{web, App, HttpServer};  // Web framework
use anyhow::Result;    // Better error handling with context
use crate::config::AppConfig; // Our custom configuration struct
use crate::speech::{GoogleCloudSpeech, SpeechProviders};
use crate::state::AppState;   // Our custom application state
use std::sync::atomic::{AtomicBool, Ordering};  // Thread-safe boolean for shutdown
use tracing::{error, info, warn};  // Structured logging
use tracing_actix_web::TracingLogger;  // Per-request tracing spans
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};  // Logging setup

/// Global shutdown signal that can be accessed from anywhere in the program.
/// AtomicBool is thread-safe, meaning multiple threads can safely read/write to it.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

/// Extra room on top of the upload limit for base64 inflation (4/3) in JSON bodies.
const JSON_OVERHEAD_FACTOR: usize = 2;

/// The main application entry point.
///
/// ## What this function does:
/// 1. **Loads configuration** from files and environment variables
/// 2. **Sets up logging** for debugging and monitoring
/// 3. **Creates speech providers** when Google Cloud credentials are present
/// 4. **Creates shared application state** that all requests can access
/// 5. **Configures the HTTP server** with middleware and routes
/// 6. **Handles graceful shutdown** when receiving system signals
///
/// ## Running without credentials:
/// Without `GOOGLE_API_KEY` the server still starts. Word checks score an
/// empty transcript, sentence analysis is simulated and `/tts` returns
/// placeholder audio, each flagged in its response.
#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting neurospeak-backend v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);

    // Build the Google client once; every worker shares it through Arc
    let providers = match GoogleCloudSpeech::from_config(&config.speech)? {
        Some(client) => {
            info!("Google Cloud speech providers configured ({})", config.speech.language_code);
            SpeechProviders::google(client)
        }
        None => {
            warn!("GOOGLE_API_KEY not set - running with simulated speech responses");
            SpeechProviders::default()
        }
    };

    let app_state = AppState::new(config.clone(), providers);
    app_state.audio_store.ensure_dir().await?;
    info!("Serving reference audio from {}", app_state.audio_store.dir().display());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let json_limit = config.storage.max_upload_bytes * JSON_OVERHEAD_FACTOR;

    // Set up signal handlers for graceful shutdown (Ctrl+C, SIGTERM, etc.)
    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        // The frontend is served from a different origin during development
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            // Sentence recordings arrive base64-encoded inside JSON
            .app_data(web::JsonConfig::default().limit(json_limit))
            // Middleware executes in reverse order for responses
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::MetricsMiddleware)
            .wrap(middleware::RequestLogging)
            .configure(handlers::configure_routes)
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    // Wait for either the server to finish OR a shutdown signal
    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;  // Let in-flight provider calls finish
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Initialize the tracing (logging) system for the application.
///
/// ## Environment Variables:
/// - `RUST_LOG`: Controls what gets logged (e.g., "debug", "neurospeak_backend=trace")
/// - If not set, defaults to "neurospeak_backend=debug,actix_web=info"
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neurospeak_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Set up signal handlers for graceful shutdown.
///
/// Listens for SIGTERM and SIGINT and sets the global shutdown flag when
/// either arrives. If a handler cannot be installed the server keeps running
/// and can only be stopped by killing the process.
fn setup_signal_handlers() {
    tokio::spawn(async {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

/// Wait for the shutdown signal to be set.
///
/// Polls the flag every 100ms instead of busy-waiting.
async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
