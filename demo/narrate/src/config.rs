use std::fs;
use std::path::Path;
use std::time::Duration;

use voiceforge_audio::HttpSynthesizerConfig;
use voiceforge_core::{
    ChunkingProfile, LanguageBucket, PipelineConfig, ProfileTable, SpeedBounds, VoiceSelection,
    ENGINE_COMPACT,
};

#[derive(Debug, Clone)]
pub struct VoiceDefaults {
    pub engine: String,
    pub voice_id: String,
    pub language: String,
    pub speed: Option<f32>,
    pub emotion: Option<String>,
    pub style: Option<String>,
}

impl Default for VoiceDefaults {
    fn default() -> Self {
        Self {
            engine: std::env::var("NARRATE_ENGINE")
                .unwrap_or_else(|_| ENGINE_COMPACT.to_string()),
            voice_id: std::env::var("NARRATE_VOICE_ID")
                .unwrap_or_else(|_| "default".to_string()),
            language: std::env::var("NARRATE_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            speed: None,
            emotion: None,
            style: None,
        }
    }
}

impl VoiceDefaults {
    pub fn selection(&self) -> VoiceSelection {
        VoiceSelection {
            engine: self.engine.clone(),
            voice_id: self.voice_id.clone(),
            language: self.language.clone(),
            speed: self.speed,
            emotion: self.emotion.clone(),
            style: self.style.clone(),
        }
    }
}

/// One extra (engine, language bucket) row, plus optional speed bounds.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProfileRow {
    pub engine: String,
    pub language: String,
    pub hard_char_cap: usize,
    pub target_char_cap: usize,
    pub max_words_per_chunk: usize,
    pub join_crossfade_ms: u32,
    pub speed_min: Option<f32>,
    pub speed_max: Option<f32>,
    pub speed_default: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct NarrateConfig {
    pub pipeline: PipelineConfig,
    pub http: HttpSynthesizerConfig,
    pub voice: VoiceDefaults,
    pub profiles: Vec<ProfileRow>,
    pub attempt_timeout_ms: Option<u64>,
}

impl NarrateConfig {
    /// Load configuration from a TOML file (path via `explicit`, NARRATE_CONFIG
    /// or ./narrate.toml), overlaying values onto env-driven defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let default = Self::default();
        let path = explicit
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| std::env::var("NARRATE_CONFIG").ok())
            .unwrap_or_else(|| "narrate.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(
                target: "narrate",
                path = %path,
                "No TOML config found; using defaults/env"
            );
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<NarrateToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(
                        target: "narrate",
                        error = %e,
                        "Failed to parse TOML; using defaults"
                    );
                    default
                }
            },
            Err(e) => {
                tracing::warn!(
                    target: "narrate",
                    error = %e,
                    "Failed to read TOML; using defaults"
                );
                default
            }
        }
    }

    /// Built-in profiles plus every `[[profiles]]` row.
    pub fn profile_table(&self) -> voiceforge_core::Result<ProfileTable> {
        let mut table = ProfileTable::builtin();
        for row in &self.profiles {
            let profile = ChunkingProfile {
                hard_char_cap: row.hard_char_cap,
                target_char_cap: row.target_char_cap,
                max_words_per_chunk: row.max_words_per_chunk,
                join_crossfade_ms: row.join_crossfade_ms,
            };
            let bucket = LanguageBucket::from_language(&row.language);
            table = table.with_profile(row.engine.clone(), bucket, profile)?;
            if let (Some(min), Some(max)) = (row.speed_min, row.speed_max) {
                let default = row.speed_default.unwrap_or_else(|| 1.0f32.max(min).min(max));
                table = table.with_speed_bounds(
                    row.engine.clone(),
                    SpeedBounds::new(min, max, default),
                )?;
            }
        }
        Ok(table)
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct NarrateToml {
    pub pipeline: Option<PipelineToml>,
    pub http: Option<HttpToml>,
    pub voice: Option<VoiceToml>,
    #[serde(default)]
    pub profiles: Vec<ProfileRow>,
}

impl NarrateToml {
    fn overlay(self, mut base: NarrateConfig) -> NarrateConfig {
        if let Some(p) = self.pipeline {
            if let Some(v) = p.attempt_timeout_ms {
                base.attempt_timeout_ms = Some(v);
            }
            p.apply(&mut base.pipeline);
        }
        if let Some(h) = self.http {
            h.apply(&mut base.http);
        }
        if let Some(v) = self.voice {
            v.apply(&mut base.voice);
        }
        base.profiles.extend(self.profiles);
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct PipelineToml {
    pub max_words_per_request: Option<usize>,
    pub max_words_per_window: Option<usize>,
    pub retry_attempts: Option<u32>,
    pub retry_backoff_ms: Option<Vec<u64>>,
    pub max_concurrency: Option<usize>,
    pub attempt_timeout_ms: Option<u64>,
}
impl PipelineToml {
    fn apply(self, p: &mut PipelineConfig) {
        if let Some(v) = self.max_words_per_request {
            p.max_words_per_request = v;
        }
        if let Some(v) = self.max_words_per_window {
            p.max_words_per_window = v;
        }
        if let Some(v) = self.retry_attempts {
            p.retry_attempts = v;
        }
        if let Some(v) = self.retry_backoff_ms {
            if !v.is_empty() {
                p.retry_backoff_ms = v;
            }
        }
        if let Some(v) = self.max_concurrency {
            p.max_concurrency = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct HttpToml {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
}
impl HttpToml {
    fn apply(self, h: &mut HttpSynthesizerConfig) {
        if let Some(v) = self.base_url {
            h.base_url = v;
        }
        if let Some(v) = self.api_key.filter(|s| !s.is_empty()) {
            h.api_key = Some(v);
        }
        if let Some(v) = self.timeout_ms {
            h.timeout_ms = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct VoiceToml {
    pub engine: Option<String>,
    pub voice_id: Option<String>,
    pub language: Option<String>,
    pub speed: Option<f32>,
    pub emotion: Option<String>,
    pub style: Option<String>,
}
impl VoiceToml {
    fn apply(self, v: &mut VoiceDefaults) {
        if let Some(x) = self.engine {
            v.engine = x;
        }
        if let Some(x) = self.voice_id {
            v.voice_id = x;
        }
        if let Some(x) = self.language {
            v.language = x;
        }
        if let Some(x) = self.speed {
            v.speed = Some(x);
        }
        if let Some(x) = self.emotion {
            v.emotion = Some(x);
        }
        if let Some(x) = self.style {
            v.style = Some(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../narrate.toml");

    fn parse(s: &str) -> NarrateConfig {
        let t: NarrateToml = toml::from_str(s).expect("valid toml");
        t.overlay(NarrateConfig {
            pipeline: PipelineConfig::standard(),
            ..NarrateConfig::default()
        })
    }

    #[test]
    fn sample_file_overlays_defaults() {
        let cfg = parse(SAMPLE);
        assert_eq!(cfg.pipeline.max_concurrency, 2);
        assert_eq!(cfg.pipeline.retry_backoff_ms, vec![500, 1200]);
        assert_eq!(cfg.attempt_timeout(), Some(Duration::from_millis(45_000)));
        assert_eq!(cfg.http.base_url, "http://localhost:8080");
        assert_eq!(cfg.voice.voice_id, "narrator-1");
        assert_eq!(cfg.profiles.len(), 2);
    }

    #[test]
    fn profile_rows_extend_builtin_table() {
        let cfg = parse(SAMPLE);
        let table = cfg.profile_table().unwrap();
        let studio_hi = table.resolve("studio", "hi-IN").unwrap();
        assert_eq!(studio_hi.hard_char_cap, 300);
        let studio_en = table.resolve("studio", "en").unwrap();
        assert_eq!(studio_en.join_crossfade_ms, 12);
        assert_eq!(table.speed_bounds("studio").max, 1.2);
        // builtins untouched
        assert_eq!(table.resolve("compact", "hi").unwrap().hard_char_cap, 160);
    }

    #[test]
    fn invalid_profile_row_is_an_error() {
        let cfg = parse(
            r#"
            [[profiles]]
            engine = "broken"
            language = "default"
            hard_char_cap = 100
            target_char_cap = 200
            max_words_per_chunk = 10
            join_crossfade_ms = 5
            "#,
        );
        assert!(cfg.profile_table().is_err());
    }

    #[test]
    fn inverted_speed_range_is_an_error() {
        let cfg = parse(
            r#"
            [[profiles]]
            engine = "studio"
            language = "default"
            hard_char_cap = 300
            target_char_cap = 200
            max_words_per_chunk = 40
            join_crossfade_ms = 5
            speed_min = 1.5
            speed_max = 1.0
            "#,
        );
        let err = cfg.profile_table().unwrap_err();
        assert!(err.to_string().contains("speed_max"));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = parse("[voice]\nlanguage = \"hi\"\n");
        assert_eq!(cfg.voice.language, "hi");
        assert_eq!(cfg.pipeline, PipelineConfig::standard());
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.attempt_timeout(), None);
    }
}
