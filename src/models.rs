use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

pub const TOPIC_MIN_CHARS: usize = 3;
pub const TOPIC_MAX_CHARS: usize = 200;

/// A trimmed, length-checked blog topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    /// Checks run in order and the first failure wins.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if len == 0 {
            return Err(ValidationError::EmptyTopic);
        }
        if len < TOPIC_MIN_CHARS {
            return Err(ValidationError::TooShort);
        }
        if len > TOPIC_MAX_CHARS {
            return Err(ValidationError::TooLong);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The most recent successful generation, held for the current session only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBlog {
    pub topic: String,
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedBlog {
    pub fn new(topic: String, content: String) -> Self {
        Self {
            topic,
            content,
            generated_at: Utc::now(),
        }
    }
}

/// A blog stored by the backend, as listed by `/api/blogs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedBlog {
    pub id: i64,
    pub topic: String,
    pub content: String,
    #[serde(default, deserialize_with = "backend_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "backend_timestamp")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub preview: Option<String>,
}

impl SavedBlog {
    /// Server preview when present, otherwise the first 200 characters.
    pub fn preview_text(&self) -> String {
        if let Some(preview) = &self.preview {
            return preview.clone();
        }
        if self.content.chars().count() > 200 {
            let head: String = self.content.chars().take(200).collect();
            format!("{head}...")
        } else {
            self.content.clone()
        }
    }
}

const BACKEND_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn backend_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDateTime::parse_from_str(&s, BACKEND_TIME_FORMAT)
                .map_err(serde::de::Error::custom)
        })
        .transpose()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_alert_timeout")]
    pub alert_timeout_secs: u64,
    #[serde(default = "default_saved_ack")]
    pub saved_ack_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub theme: ThemeConfig,
}

const fn default_timeout() -> u64 {
    600
}

const fn default_alert_timeout() -> u64 {
    5
}

const fn default_saved_ack() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            request_timeout: default_timeout(),
            alert_timeout_secs: default_alert_timeout(),
            saved_ack_secs: default_saved_ack(),
            log_level: default_log_level(),
            theme: ThemeConfig::default(),
        }
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub header_color: String,
    pub accent_color: String,
    pub border_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            header_color: "blue".to_string(),
            accent_color: "yellow".to_string(),
            border_color: "cyan".to_string(),
        }
    }
}
