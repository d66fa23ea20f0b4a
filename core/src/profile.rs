//! Chunking profiles keyed by (engine, language bucket)
//!
//! The table is plain data: adding an engine or a language bucket means adding
//! rows, not branches. `ProfileTable::builtin()` carries the shipped engines:
//!
//! | engine   | bucket  | hard | target | words | crossfade ms |
//! |----------|---------|------|--------|-------|--------------|
//! | compact  | hi      | 160  | 130    | 30    | 15           |
//! | compact  | default | 220  | 180    | 45    | 15           |
//! | extended | hi      | 620  | 420    | 80    | 10           |
//! | extended | default | 620  | 420    | 80    | 10           |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Result, VfError};

/// Engine family with tight per-call limits.
pub const ENGINE_COMPACT: &str = "compact";
/// Engine family accepting long per-call text.
pub const ENGINE_EXTENDED: &str = "extended";

/// Size limits and join crossfade for one engine/language combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingProfile {
    pub hard_char_cap: usize,
    pub target_char_cap: usize,
    pub max_words_per_chunk: usize,
    pub join_crossfade_ms: u32,
}

impl ChunkingProfile {
    pub fn validate(&self) -> Result<()> {
        if self.hard_char_cap == 0 {
            return Err(VfError::invalid("hard_char_cap", "must be greater than zero"));
        }
        if self.target_char_cap == 0 {
            return Err(VfError::invalid("target_char_cap", "must be greater than zero"));
        }
        if self.target_char_cap > self.hard_char_cap {
            return Err(VfError::invalid(
                "target_char_cap",
                format!(
                    "{} exceeds hard_char_cap {}",
                    self.target_char_cap, self.hard_char_cap
                ),
            ));
        }
        if self.max_words_per_chunk == 0 {
            return Err(VfError::invalid(
                "max_words_per_chunk",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageBucket {
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "default")]
    Default,
}

impl LanguageBucket {
    /// `hi`, `hi-IN`, `hi_IN` (any case) select the Hindi bucket.
    pub fn from_language(language: &str) -> Self {
        let primary = language
            .trim()
            .split(|c: char| c == '-' || c == '_')
            .next()
            .unwrap_or("");
        if primary.eq_ignore_ascii_case("hi") {
            LanguageBucket::Hindi
        } else {
            LanguageBucket::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageBucket::Hindi => "hi",
            LanguageBucket::Default => "default",
        }
    }
}

/// Accepted playback speed range of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBounds {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self::new(0.5, 2.0, 1.0)
    }
}

impl SpeedBounds {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Bounds must be finite with `min <= default <= max`.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || self.min <= 0.0 {
            return Err(VfError::invalid(
                "speed_min",
                format!("expected a positive finite number, got {}", self.min),
            ));
        }
        if !self.max.is_finite() || self.max < self.min {
            return Err(VfError::invalid(
                "speed_max",
                format!("{} is below speed_min {}", self.max, self.min),
            ));
        }
        if !self.default.is_finite() || self.default < self.min || self.default > self.max {
            return Err(VfError::invalid(
                "speed_default",
                format!("{} is outside {}..={}", self.default, self.min, self.max),
            ));
        }
        Ok(())
    }

    /// Clamp a requested speed; `None` selects the engine default.
    /// Non-finite values and malformed bounds are rejected.
    pub fn clamp(&self, requested: Option<f32>) -> Result<f32> {
        self.validate()?;
        match requested {
            None => Ok(self.default),
            Some(v) if !v.is_finite() => Err(VfError::invalid(
                "speed",
                format!("expected a finite number, got {v}"),
            )),
            Some(v) => Ok(v.clamp(self.min, self.max)),
        }
    }
}

/// Immutable lookup of chunking profiles and speed bounds.
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    profiles: HashMap<(String, LanguageBucket), ChunkingProfile>,
    speeds: HashMap<String, SpeedBounds>,
}

impl ProfileTable {
    /// Empty table; populate with `with_profile` / `with_speed_bounds`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let compact_hi = ChunkingProfile {
            hard_char_cap: 160,
            target_char_cap: 130,
            max_words_per_chunk: 30,
            join_crossfade_ms: 15,
        };
        let compact_default = ChunkingProfile {
            hard_char_cap: 220,
            target_char_cap: 180,
            max_words_per_chunk: 45,
            join_crossfade_ms: 15,
        };
        let extended = ChunkingProfile {
            hard_char_cap: 620,
            target_char_cap: 420,
            max_words_per_chunk: 80,
            join_crossfade_ms: 10,
        };

        let mut table = Self::new();
        table.insert(ENGINE_COMPACT, LanguageBucket::Hindi, compact_hi);
        table.insert(ENGINE_COMPACT, LanguageBucket::Default, compact_default);
        table.insert(ENGINE_EXTENDED, LanguageBucket::Hindi, extended);
        table.insert(ENGINE_EXTENDED, LanguageBucket::Default, extended);
        table
            .speeds
            .insert(ENGINE_COMPACT.to_string(), SpeedBounds::new(0.70, 1.30, 1.00));
        table
            .speeds
            .insert(ENGINE_EXTENDED.to_string(), SpeedBounds::new(0.75, 1.35, 1.00));
        table
    }

    /// Add or replace one row, validating the profile first.
    pub fn with_profile(
        mut self,
        engine: impl Into<String>,
        bucket: LanguageBucket,
        profile: ChunkingProfile,
    ) -> Result<Self> {
        profile.validate()?;
        self.insert(engine, bucket, profile);
        Ok(self)
    }

    /// Add or replace an engine's speed bounds, validating them first.
    pub fn with_speed_bounds(
        mut self,
        engine: impl Into<String>,
        bounds: SpeedBounds,
    ) -> Result<Self> {
        bounds.validate()?;
        self.speeds.insert(engine.into(), bounds);
        Ok(self)
    }

    fn insert(
        &mut self,
        engine: impl Into<String>,
        bucket: LanguageBucket,
        profile: ChunkingProfile,
    ) {
        self.profiles.insert((engine.into(), bucket), profile);
    }

    pub fn get(&self, engine: &str, bucket: LanguageBucket) -> Option<ChunkingProfile> {
        self.profiles.get(&(engine.to_string(), bucket)).copied()
    }

    /// Profile for an engine and a language code.
    pub fn resolve(&self, engine: &str, language: &str) -> Result<ChunkingProfile> {
        let bucket = LanguageBucket::from_language(language);
        self.get(engine, bucket)
            .ok_or_else(|| VfError::UnknownEngine(format!("{engine} ({})", bucket.as_str())))
    }

    /// Speed bounds of an engine; engines without their own bounds get the
    /// generic 0.5-2.0 range.
    pub fn speed_bounds(&self, engine: &str) -> SpeedBounds {
        self.speeds.get(engine).copied().unwrap_or_default()
    }

    /// Registered engine names, sorted.
    pub fn engines(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().map(|(e, _)| e.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}
