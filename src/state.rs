//! # Application State Management
//!
//! Shared state handed to every HTTP request handler through `web::Data`.
//!
//! ## Key Rust Concepts:
//!
//! ### Arc (Atomically Reference Counted)
//! - **Purpose**: Lets every actix worker hold the same configuration, metrics and providers
//! - **Cheap clones**: Cloning `AppState` only bumps reference counts
//!
//! ### RwLock (Reader-Writer Lock)
//! - **Purpose**: Many handlers read the config at once; a config update writes alone
//! - **Poisoning**: A panic while holding a lock poisons it. We recover the inner
//!   value instead of propagating the panic, since every write here is a
//!   single assignment or counter bump that cannot leave data half-updated.
//!
//! ### Trait objects
//! - **`Arc<dyn Transcriber>`**: Handlers call the speech capability without knowing
//!   whether it is Google Cloud, a test double, or absent altogether.

use crate::config::AppConfig;
use crate::speech::{ReferenceAudioStore, SpeechProviders, Synthesizer, Transcriber};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// The main application state that's shared across all HTTP request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration (parts of it can be updated at runtime)
    pub config: Arc<RwLock<AppConfig>>,

    /// Request and practice metrics, updated by middleware and handlers
    pub metrics: Arc<RwLock<AppMetrics>>,

    /// Speech capabilities injected at startup (either may be absent)
    pub providers: SpeechProviders,

    /// Where synthesized reference audio is written and served from
    pub audio_store: ReferenceAudioStore,

    /// When the server started
    pub start_time: Instant,
}

/// Metrics collected across all HTTP requests.
///
/// ## Why these metrics matter:
/// - **request_count / error_count**: Load and reliability monitoring
/// - **word_checks / phrase_analyses / tts_requests**: How much practice traffic
///   the service sees
/// - **fallback_responses**: How many of those requests got degraded output
///   because a speech provider was missing or failing
/// - **endpoint_metrics**: Per-route latency and error rates
#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    pub request_count: u64,
    pub error_count: u64,
    pub word_checks: u64,
    pub phrase_analyses: u64,
    pub tts_requests: u64,
    /// At most one per counted practice request
    pub fallback_responses: u64,
    /// Key: route pattern (e.g., "POST /practice/word-check")
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Detailed performance metrics for a specific API endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

/// Kinds of practice request counted separately from raw HTTP traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeKind {
    WordCheck,
    PhraseAnalysis,
    Tts,
}

impl AppState {
    /// Create a new AppState with the given configuration and speech providers.
    ///
    /// The audio store directory is taken from `config.storage.static_dir`.
    pub fn new(config: AppConfig, providers: SpeechProviders) -> Self {
        let audio_store = ReferenceAudioStore::new(config.storage.static_dir.clone());
        Self {
            config: Arc::new(RwLock::new(config)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            providers,
            audio_store,
            start_time: Instant::now(),
        }
    }

    fn read_metrics(&self) -> RwLockReadGuard<'_, AppMetrics> {
        self.metrics.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_metrics(&self) -> RwLockWriteGuard<'_, AppMetrics> {
        self.metrics.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Get a copy of the current configuration.
    ///
    /// ## Why clone:
    /// Cloning releases the lock immediately, so a handler awaiting a slow
    /// provider call never blocks a config update.
    pub fn get_config(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the configuration after validating it.
    pub fn update_config(&self, new_config: AppConfig) -> Result<(), String> {
        new_config.validate().map_err(|e| e.to_string())?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = new_config;
        Ok(())
    }

    pub fn transcriber(&self) -> Option<&dyn Transcriber> {
        self.providers.transcriber.as_deref()
    }

    pub fn synthesizer(&self) -> Option<&dyn Synthesizer> {
        self.providers.synthesizer.as_deref()
    }

    /// Increment the total request counter (called by middleware for every request).
    pub fn increment_request_count(&self) {
        self.write_metrics().request_count += 1;
    }

    /// Increment the total error counter (4xx and 5xx responses).
    pub fn increment_error_count(&self) {
        self.write_metrics().error_count += 1;
    }

    /// Record one practice request and whether it had to use a fallback.
    pub fn record_practice(&self, kind: PracticeKind, used_fallback: bool) {
        let mut metrics = self.write_metrics();
        match kind {
            PracticeKind::WordCheck => metrics.word_checks += 1,
            PracticeKind::PhraseAnalysis => metrics.phrase_analyses += 1,
            PracticeKind::Tts => metrics.tts_requests += 1,
        }
        if used_fallback {
            metrics.fallback_responses += 1;
        }
    }

    /// Record detailed metrics for a specific endpoint.
    ///
    /// The first request to an endpoint creates its entry with `or_default()`.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.write_metrics();
        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();

        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;

        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Get a snapshot of current metrics (used for the /metrics endpoint).
    ///
    /// Cloning keeps the lock out of JSON serialization.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.read_metrics().clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl AppMetrics {
    /// Share of practice requests answered from a fallback (0.0 to 1.0).
    pub fn fallback_rate(&self) -> f64 {
        let practice = self.word_checks + self.phrase_analyses + self.tts_requests;
        if practice > 0 {
            self.fallback_responses as f64 / practice as f64
        } else {
            0.0
        }
    }

    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}

impl EndpointMetric {
    /// Average = Total Duration ÷ Number of Requests
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Error Rate = Number of Errors ÷ Total Requests
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
