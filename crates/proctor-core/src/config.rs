use crate::error::{ProctorError, Result};
use crate::scoring::ScoringPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration injected at session construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timer: TimerConfig,
    pub integrity: IntegrityConfig,
    pub classifier: ClassifierConfig,
    pub scoring: ScoringPolicy,
    pub questions: QuestionRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Countdown length for every question
    pub question_duration_secs: u32,
    /// How often the countdown decrements, in milliseconds
    pub tick_millis: u64,
    /// Remaining seconds at or below which the countdown is highlighted
    pub low_time_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            question_duration_secs: 60,
            tick_millis: 1000,
            low_time_secs: 10,
        }
    }
}

impl TimerConfig {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    pub frame_interval_millis: u64,
    /// Upper bound for one classification round trip
    pub classifier_timeout_millis: u64,
    /// Cheating score above which the live view shows an alert banner
    pub alert_threshold: f64,
    /// Clear server-side classifier statistics when a session starts
    pub reset_classifier_on_start: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            frame_interval_millis: 500,
            classifier_timeout_millis: 2000,
            alert_threshold: 0.7,
            reset_classifier_on_start: true,
        }
    }
}

impl IntegrityConfig {
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_millis)
    }

    #[must_use]
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub frame_path: String,
    pub health_path: String,
    pub reset_path: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:5000"),
            frame_path: String::from("/process-frame"),
            health_path: String::from("/health"),
            reset_path: String::from("/reset-session"),
        }
    }
}

impl ClassifierConfig {
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Question count the question generator produces per round
pub const BASELINE_QUESTION_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionRules {
    /// When set, a question set of any other length is rejected
    pub required_count: Option<usize>,
}

impl Default for QuestionRules {
    fn default() -> Self {
        Self {
            required_count: Some(BASELINE_QUESTION_COUNT),
        }
    }
}

impl QuestionRules {
    /// Rules accepting a non-empty set of any length
    #[must_use]
    pub const fn any_count() -> Self {
        Self {
            required_count: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed,
    /// or if the parsed values fail validation.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProctorError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| {
            ProctorError::configuration(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        log::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise from the default location.
    /// A missing default file yields the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an existing file is invalid, or if an
    /// explicitly requested file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Render as TOML
    ///
    /// # Errors
    ///
    /// Returns a configuration error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ProctorError::configuration(format!("cannot serialize config: {e}")))
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.timer.question_duration_secs == 0 {
            return Err(ProctorError::configuration(
                "timer.question_duration_secs must be greater than zero",
            ));
        }
        if self.timer.tick_millis == 0 {
            return Err(ProctorError::configuration(
                "timer.tick_millis must be greater than zero",
            ));
        }
        if self.integrity.frame_interval_millis == 0 {
            return Err(ProctorError::configuration(
                "integrity.frame_interval_millis must be greater than zero",
            ));
        }
        if self.integrity.classifier_timeout_millis == 0 {
            return Err(ProctorError::configuration(
                "integrity.classifier_timeout_millis must be greater than zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.integrity.alert_threshold) {
            return Err(ProctorError::configuration(
                "integrity.alert_threshold must be within [0, 1]",
            ));
        }
        if self.questions.required_count == Some(0) {
            return Err(ProctorError::configuration(
                "questions.required_count must be greater than zero",
            ));
        }
        self.scoring.validate()
    }
}

/// Get the configuration directory for proctor.
#[must_use]
pub fn get_config_dir() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("proctor");
    Some(path)
}

#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}
