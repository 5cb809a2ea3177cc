//! Domain and wire types shared by the API client, session and screens.
//!
//! The backend serializes decimals as strings (`"7.50"`), may send `null` for
//! unscored assessments, and labels user chat turns `human`. The lenient
//! deserializers here absorb those quirks so the rest of the crate works with
//! plain `Option<f64>` and enums.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

// ============================================
// Users
// ============================================

/// `user_type` value the backend uses for shop administrators.
pub const ADMIN_USER_TYPE: i64 = 2;

/// Identity record returned by `GET /api/user/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub registration_date: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub user_type: Option<i64>,
}

impl UserInfo {
    /// Admin access is derived, never stored: superuser, staff, or admin user type.
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.is_staff || self.user_type == Some(ADMIN_USER_TYPE)
    }
}

/// Profile data returned by `GET /api/user-profile/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub registration_date: String,
}

/// Login form payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Account creation payload.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

// ============================================
// Assessments
// ============================================

/// Categorical urgency assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 3] = [
        UrgencyLevel::Low,
        UrgencyLevel::Medium,
        UrgencyLevel::High,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
        }
    }

    /// Capitalized display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::High => "High",
        }
    }

    /// Case-insensitive parse; `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(UrgencyLevel::Low),
            "medium" => Some(UrgencyLevel::Medium),
            "high" => Some(UrgencyLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown urgency level: {s}"))
    }
}

/// One row of the admin dashboard feed. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssessmentRecord {
    pub id: i64,
    #[serde(default)]
    pub truck_id: String,
    #[serde(deserialize_with = "de_datetime")]
    pub assessment_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub severity_score: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub estimated_repair_cost: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_urgency")]
    pub urgency_level: Option<UrgencyLevel>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub priority_score: Option<f64>,
}

/// Response of `GET /api/admin-dashboard/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct DashboardFeed {
    #[serde(default)]
    pub assessments: Vec<AssessmentRecord>,
    #[serde(default)]
    pub total_assessments: i64,
    #[serde(default)]
    pub high_priority_assessments: i64,
}

/// A damage region found by the detection model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectedDamage {
    pub area: String,
    #[serde(deserialize_with = "de_display_string")]
    pub confidence: String,
}

/// Response of `POST /assess_damage/`. Scores arrive pre-formatted for display.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DamageAssessment {
    /// Annotated JPEG, base64-encoded
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub damages: Vec<DetectedDamage>,
    #[serde(default)]
    pub assessment: String,
    #[serde(default, deserialize_with = "de_display_string")]
    pub severity_score: String,
    #[serde(default, deserialize_with = "de_display_string")]
    pub estimated_repair_cost: String,
    #[serde(default, deserialize_with = "de_display_string")]
    pub urgency_level: String,
    #[serde(default, deserialize_with = "de_display_string")]
    pub priority_score: String,
    #[serde(default)]
    pub priority_explanation: String,
}

impl DamageAssessment {
    /// Decode the annotated image bytes.
    pub fn decode_image(&self) -> Result<Vec<u8>> {
        if self.image.is_empty() {
            return Err(Error::Decode("assessment has no image".to_string()));
        }
        base64::engine::general_purpose::STANDARD
            .decode(self.image.trim())
            .map_err(|e| Error::Decode(format!("invalid base64 image: {e}")))
    }

    /// Write the annotated image to `path`, creating parent directories.
    pub fn save_image(&self, path: &Path) -> Result<()> {
        let bytes = self.decode_image()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// An image file ready for multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk. Rejects empty files and non-image extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime = image_mime(path).ok_or_else(|| {
            Error::Decode(format!("{} is not a supported image", path.display()))
        })?;
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(Error::Decode(format!("{} is empty", path.display())));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }
}

/// MIME type for the image extensions the upload accepts.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

// ============================================
// Chat
// ============================================

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ChatRole {
    #[serde(rename = "human", alias = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One turn of the recommendation conversation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// ============================================
// Lenient deserializers
// ============================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn de_opt_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => parse_number_text(&s),
        None => None,
    })
}

/// Parse `"1234.50"`, `"₱ 1,234.50"`; anything else (e.g. `"None"`) is absent.
pub(crate) fn parse_number_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E' | '+'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn de_opt_urgency<'de, D>(deserializer: D) -> std::result::Result<Option<UrgencyLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(UrgencyLevel::parse))
}

fn de_display_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn de_datetime<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {raw}")))
}

/// Accept RFC 3339 or a naive ISO datetime (interpreted as UTC).
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
