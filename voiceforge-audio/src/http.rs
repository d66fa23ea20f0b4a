//! HTTP synthesis adapter
//!
//! POSTs a [`SynthesisRequest`] as JSON to `{base_url}/synthesize` and reads
//! back `{ "sampleRate": u32, "channels": [[f32]] }`.
//!
//! Env overrides:
//! - VF_SYNTH_BASE_URL (default http://localhost:8080)
//! - VF_SYNTH_API_KEY (sent as a bearer token when set)
//! - VF_SYNTH_TIMEOUT_MS (default 30000)

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use voiceforge_core::{Result, SynthesisRequest, VfError};

use crate::pcm::PcmBuffer;
use crate::synth::SpeechSynthesizer;

#[derive(Debug, Clone)]
pub struct HttpSynthesizerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpSynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("VF_SYNTH_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            api_key: std::env::var("VF_SYNTH_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            timeout_ms: std::env::var("VF_SYNTH_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(30_000),
            user_agent: "voiceforge/0.1".to_string(),
        }
    }
}

impl HttpSynthesizerConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/synthesize", self.base_url.trim_end_matches('/'))
    }
}

pub struct HttpSynthesizer {
    config: HttpSynthesizerConfig,
    http_client: reqwest::Client,
}

impl Default for HttpSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSynthesizer {
    pub fn new() -> Self {
        Self::with_config(HttpSynthesizerConfig::default())
    }

    pub fn with_config(config: HttpSynthesizerConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &HttpSynthesizerConfig {
        &self.config
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    fn name(&self) -> String {
        format!("http:{}", self.config.base_url)
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<PcmBuffer> {
        let mut builder = self.http_client.post(self.config.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(trace_id) = &request.trace_id {
            builder = builder.header("x-trace-id", trace_id);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| VfError::Synthesis(format!("Synthesis request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VfError::Synthesis(format!(
                "Synthesis API error: {} {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let buffer: PcmBuffer = resp.json().await.map_err(|e| {
            VfError::Synthesis(format!("Failed to parse synthesis response: {}", e))
        })?;
        debug!(
            target: "dispatch",
            trace_id = ?request.trace_id,
            sample_rate = buffer.sample_rate(),
            frames = buffer.len(),
            "HTTP synthesis response"
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_path() {
        let config = HttpSynthesizerConfig {
            base_url: "http://tts.local:9000/".to_string(),
            api_key: None,
            timeout_ms: 1_000,
            user_agent: "test".to_string(),
        };
        assert_eq!(config.endpoint(), "http://tts.local:9000/synthesize");
        let synth = HttpSynthesizer::with_config(config);
        assert_eq!(synth.name(), "http:http://tts.local:9000/");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_synthesis_error() {
        let synth = HttpSynthesizer::with_config(HttpSynthesizerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout_ms: 500,
            user_agent: "test".to_string(),
        });
        let req = voiceforge_core::VoiceSelection::new("compact", "v", "en").request_for("hi", 1.0);
        let err = synth.synthesize(req).await.unwrap_err();
        assert!(matches!(err, VfError::Synthesis(_)));
    }
}
