use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub language: Language,
    pub request_timeout: Duration,
    pub file_timeout: Duration,
    pub user_agent: String,
    pub theme_path: PathBuf,
}

/// Languages the remote engine accepts. The UI exposes one today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Python => "Python",
        }
    }
}

/// Body of `POST /execute`. Built fresh for every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: String,
    pub input_data: Option<String>,
}

impl ExecutionRequest {
    /// Blank stdin is sent as `null`, otherwise verbatim.
    pub fn new(code: &str, language: Language, input: &str) -> Self {
        Self {
            code: code.to_string(),
            language: language.as_str().to_string(),
            input_data: if input.trim().is_empty() {
                None
            } else {
                Some(input.to_string())
            },
        }
    }
}

/// 2xx body of `POST /execute`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_time: Option<f64>,
}

/// Non-2xx body. `detail` is usually a string but validation failures send a list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// How a finished run is shown. Output and error never coexist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { output: String },
    ProgramError { error: String },
    ValidationError { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub execution_time_seconds: Option<f64>,
}

impl ExecutionResult {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::ValidationError {
                message: message.into(),
            },
            execution_time_seconds: None,
        }
    }

    /// Classify a 2xx payload: a non-null `error` wins over `output`.
    pub fn from_response(resp: ExecutionResponse) -> Self {
        let outcome = match resp.error {
            Some(error) if !error.is_empty() => Outcome::ProgramError { error },
            _ => Outcome::Success {
                output: resp.output.unwrap_or_default(),
            },
        };
        Self {
            outcome,
            execution_time_seconds: resp.execution_time,
        }
    }

    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { output } => Some(output),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::ProgramError { error } => Some(error),
            Outcome::ValidationError { message } => Some(message),
            Outcome::Success { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

/// One row of `GET /files`. Only ever produced by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub filename: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub modified: String,
}

impl FileEntry {
    pub fn size_display(&self) -> String {
        format_file_size(self.size_bytes)
    }

    /// Server timestamps are ISO-8601 with or without an offset.
    pub fn modified_display(&self) -> String {
        let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let parsed = OffsetDateTime::parse(&self.modified, &Rfc3339)
            .map(|t| PrimitiveDateTime::new(t.date(), t.time()))
            .or_else(|_| PrimitiveDateTime::parse(&self.modified, &Iso8601::DEFAULT));
        match parsed {
            Ok(t) => t.format(&fmt).unwrap_or_else(|_| self.modified.clone()),
            Err(_) => self.modified.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedFile {
    #[serde(default)]
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadedFile {
    #[serde(default)]
    pub code: String,
    pub filename: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// `MM:SS`; minutes keep counting past 59.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
