//! HTTP client for the TruckMate backend REST API
//!
//! One method per endpoint. Token-protected calls take the token explicitly
//! and send it as `Authorization: Token <value>`. There is no retry and no
//! backoff: a failure is reported once and the caller decides what to do.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::{
    ChatMessage, Credentials, DamageAssessment, DashboardFeed, ImageUpload, Registration,
    UserInfo, UserProfile,
};

use super::endpoints::{self, Endpoints};

/// Response from POST /api/login/
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Response carrying only a human-readable message
#[derive(Debug, Deserialize, Default)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Request body for POST /api/verify-otp/
#[derive(Serialize)]
struct VerifyOtpRequest<'a> {
    otp: &'a str,
}

/// Request body for POST /api/change-password/
#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// Request body for POST /api/chatbot/
#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    chat_history: &'a [ChatMessage],
}

/// Response from POST /api/chatbot/
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    chat_history: Vec<ChatMessage>,
}

/// Async HTTP client for the TruckMate backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoints: Endpoints::new(&config.base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoints.base_url()
    }

    /// Exchange credentials for a session token
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let request = self
            .http_client
            .post(self.endpoints.url(endpoints::LOGIN))
            .json(credentials);
        let response = send(request, endpoints::LOGIN).await?;
        let body: LoginResponse = read_json(response).await?;
        Ok(body.token)
    }

    /// Create an account; the backend emails an OTP. Only 201 counts as success.
    pub async fn register(&self, registration: &Registration) -> Result<String> {
        let request = self
            .http_client
            .post(self.endpoints.url(endpoints::REGISTER))
            .json(registration);
        let response = send(request, endpoints::REGISTER).await?;
        if response.status() != StatusCode::CREATED {
            return Err(Error::Api {
                status: response.status().as_u16(),
                message: "Sign-up failed. Please try again.".to_string(),
            });
        }
        let body: MessageResponse = read_json(response).await?;
        const REGISTERED: &str = "User registered successfully. Please verify your email.";
        Ok(body.message.unwrap_or_else(|| REGISTERED.to_string()))
    }

    /// Confirm an email address with the emailed OTP. Only 200 counts as success.
    pub async fn verify_otp(&self, otp: &str) -> Result<String> {
        let request = self
            .http_client
            .post(self.endpoints.url(endpoints::VERIFY_OTP))
            .json(&VerifyOtpRequest { otp });
        let response = send(request, endpoints::VERIFY_OTP).await?;
        if response.status() != StatusCode::OK {
            return Err(Error::Api {
                status: response.status().as_u16(),
                message: "Invalid OTP. Please try again.".to_string(),
            });
        }
        let body: MessageResponse = read_json(response).await.unwrap_or_default();
        Ok(body
            .message
            .unwrap_or_else(|| "OTP verification successful.".to_string()))
    }

    /// Identity of the token's owner
    pub async fn user_info(&self, token: &str) -> Result<UserInfo> {
        let request = authorized(self.http_client.get(self.endpoints.url(endpoints::USER)), token);
        let response = send(request, endpoints::USER).await?;
        read_json(response).await
    }

    /// Email and registration date of the token's owner
    pub async fn user_profile(&self, token: &str) -> Result<UserProfile> {
        let request = authorized(
            self.http_client.get(self.endpoints.url(endpoints::USER_PROFILE)),
            token,
        );
        let response = send(request, endpoints::USER_PROFILE).await?;
        read_json(response).await
    }

    pub async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let request = authorized(
            self.http_client.post(self.endpoints.url(endpoints::CHANGE_PASSWORD)),
            token,
        )
        .json(&ChangePasswordRequest {
            current_password,
            new_password,
        });
        send(request, endpoints::CHANGE_PASSWORD).await?;
        Ok(())
    }

    /// Full assessment feed for the admin dashboard
    pub async fn admin_dashboard(&self, token: &str) -> Result<DashboardFeed> {
        let request = authorized(
            self.http_client.get(self.endpoints.url(endpoints::ADMIN_DASHBOARD)),
            token,
        );
        let response = send(request, endpoints::ADMIN_DASHBOARD).await?;
        read_json(response).await
    }

    /// Upload a truck photo for damage detection and cost estimation
    pub async fn assess_damage(&self, upload: &ImageUpload) -> Result<DamageAssessment> {
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime)
            .map_err(|e| Error::Decode(format!("invalid image MIME type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let request = self
            .http_client
            .post(self.endpoints.url(endpoints::ASSESS_DAMAGE))
            .multipart(form);
        let response = send(request, endpoints::ASSESS_DAMAGE).await?;
        read_json(response).await
    }

    /// Send one chat turn; returns the backend's complete history
    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<Vec<ChatMessage>> {
        let request = self
            .http_client
            .post(self.endpoints.url(endpoints::CHATBOT))
            .json(&ChatRequest {
                message,
                chat_history: history,
            });
        let response = send(request, endpoints::CHATBOT).await?;
        let body: ChatResponse = read_json(response).await?;
        Ok(body.chat_history)
    }
}

fn authorized(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(AUTHORIZATION, format!("Token {token}"))
}

/// Send a request; non-2xx statuses become [`Error::Api`].
async fn send(request: RequestBuilder, endpoint: &str) -> Result<Response> {
    let response = request.send().await.map_err(|e| {
        tracing::warn!(endpoint, error = %e, "Request failed without a response");
        Error::Network(format!("HTTP request failed: {}", e))
    })?;

    let status = response.status();
    if status.is_success() {
        tracing::debug!(endpoint, status = status.as_u16(), "Request succeeded");
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::warn!(endpoint, status = status.as_u16(), %message, "Server returned an error");
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;
    Ok(serde_json::from_str(&text)?)
}

/// Best human-readable message from an error body.
///
/// Looks at `message`, `error`, `detail`, then `non_field_errors` and the
/// first per-field error list; falls back to the status reason phrase.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    };

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return fallback(),
    };

    for key in ["message", "error", "detail"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }

    if let Some(first) = value
        .get("non_field_errors")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str())
    {
        return first.to_string();
    }

    if let Some(obj) = value.as_object() {
        for (field, errors) in obj {
            let first = errors
                .as_array()
                .and_then(|a| a.first())
                .and_then(|v| v.as_str());
            if let Some(first) = first {
                return format!("{field}: {first}");
            }
        }
    }

    if let Some(first) = value.as_array().and_then(|a| a.first()).and_then(|v| v.as_str()) {
        return first.to_string();
    }

    fallback()
}
