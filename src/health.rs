use crate::state::{AppMetrics, AppState};
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Landing route kept for the frontend's connectivity check.
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to NeuroSpeak API",
        "status": "online"
    }))
}

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let config = state.get_config();
    let uptime_seconds = state.get_uptime_seconds();

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "service": {
            "name": "neurospeak-backend",
            "version": env!("CARGO_PKG_VERSION"),
            "host": config.server.host,
            "port": config.server.port
        },
        "metrics": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "error_rate": metrics.error_rate(),
            "word_checks": metrics.word_checks,
            "phrase_analyses": metrics.phrase_analyses,
            "tts_requests": metrics.tts_requests
        },
        "memory": get_memory_info(),
        "providers": {
            "speech_to_text": provider_status(state.transcriber().is_some()),
            "text_to_speech": provider_status(state.synthesizer().is_some()),
            "language_code": config.speech.language_code
        },
        "system": get_system_status(&metrics)
    }))
}

pub async fn detailed_metrics(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let uptime_seconds = state.get_uptime_seconds();

    let mut endpoint_stats: Vec<_> = metrics
        .endpoint_metrics
        .iter()
        .map(|(endpoint, metric)| {
            json!({
                "endpoint": endpoint,
                "request_count": metric.request_count,
                "error_count": metric.error_count,
                "error_rate": metric.error_rate(),
                "average_duration_ms": metric.average_duration_ms(),
                "total_duration_ms": metric.total_duration_ms
            })
        })
        .collect();
    endpoint_stats.sort_by(|a, b| a["endpoint"].as_str().cmp(&b["endpoint"].as_str()));

    HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "overall": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "error_rate": metrics.error_rate(),
            "requests_per_second": if uptime_seconds > 0 {
                metrics.request_count as f64 / uptime_seconds as f64
            } else {
                0.0
            }
        },
        "practice": {
            "word_checks": metrics.word_checks,
            "phrase_analyses": metrics.phrase_analyses,
            "tts_requests": metrics.tts_requests,
            "fallback_responses": metrics.fallback_responses,
            "fallback_rate": metrics.fallback_rate()
        },
        "endpoints": endpoint_stats,
        "memory": get_memory_info()
    }))
}

fn provider_status(configured: bool) -> serde_json::Value {
    json!({
        "status": if configured { "configured" } else { "fallback" },
        "available": configured
    })
}

fn get_memory_info() -> serde_json::Value {
    #[cfg(target_os = "linux")]
    {
        let pid = std::process::id();
        if let Ok(status) = std::fs::read_to_string(format!("/proc/{}/status", pid)) {
            let mut vm_rss = 0;
            let mut vm_size = 0;

            for line in status.lines() {
                if line.starts_with("VmRSS:") {
                    if let Some(kb_str) = line.split_whitespace().nth(1) {
                        vm_rss = kb_str.parse::<u64>().unwrap_or(0) * 1024;
                    }
                } else if line.starts_with("VmSize:") {
                    if let Some(kb_str) = line.split_whitespace().nth(1) {
                        vm_size = kb_str.parse::<u64>().unwrap_or(0) * 1024;
                    }
                }
            }

            return json!({
                "resident_memory_bytes": vm_rss,
                "virtual_memory_bytes": vm_size,
                "available": true
            });
        }
    }

    json!({
        "resident_memory_bytes": 0,
        "virtual_memory_bytes": 0,
        "available": false,
        "note": "Memory info not available on this platform"
    })
}

/// Degraded when most practice requests are answered from fallbacks.
fn get_system_status(metrics: &AppMetrics) -> serde_json::Value {
    let fallback_rate = metrics.fallback_rate();

    let status = if fallback_rate > 0.5 {
        "degraded"
    } else if fallback_rate > 0.1 {
        "partially_degraded"
    } else {
        "normal"
    };

    json!({
        "status": status,
        "fallback_rate_percent": (fallback_rate * 100.0).round(),
        "fallback_responses": metrics.fallback_responses,
        "warnings": if fallback_rate > 0.1 {
            vec![
                "Speech providers are failing or unconfigured; \
                 learners receive simulated feedback",
            ]
        } else {
            vec![]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_status_thresholds() {
        let mut metrics = AppMetrics::default();
        assert_eq!(get_system_status(&metrics)["status"], "normal");

        metrics.word_checks = 10;
        metrics.fallback_responses = 2;
        assert_eq!(get_system_status(&metrics)["status"], "partially_degraded");

        metrics.fallback_responses = 8;
        let status = get_system_status(&metrics);
        assert_eq!(status["status"], "degraded");
        assert_eq!(status["fallback_rate_percent"], 80.0);
    }

    #[test]
    fn test_provider_status() {
        assert_eq!(provider_status(false)["status"], "fallback");
        assert_eq!(provider_status(true)["available"], true);
    }
}
