//! Backend access
//!
//! [`ApiClient`] is the async reqwest client. UIs talk to the [`Backend`]
//! trait instead, which is synchronous: [`HttpBackend`] owns a
//! current-thread tokio runtime and blocks on each call, so the TUI event
//! loop and the CLI never need an executor of their own.

mod client;
pub mod endpoints;

pub use client::ApiClient;
pub use endpoints::Endpoints;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::{
    ChatMessage, Credentials, DamageAssessment, DashboardFeed, ImageUpload, Registration,
    UserInfo, UserProfile,
};

/// Blocking interface to the TruckMate backend.
pub trait Backend {
    fn login(&self, credentials: &Credentials) -> Result<String>;
    fn register(&self, registration: &Registration) -> Result<String>;
    fn verify_otp(&self, otp: &str) -> Result<String>;
    fn user_info(&self, token: &str) -> Result<UserInfo>;
    fn user_profile(&self, token: &str) -> Result<UserProfile>;
    fn change_password(&self, token: &str, current_password: &str, new_password: &str)
        -> Result<()>;
    fn admin_dashboard(&self, token: &str) -> Result<DashboardFeed>;
    fn assess_damage(&self, upload: &ImageUpload) -> Result<DamageAssessment>;
    fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<Vec<ChatMessage>>;
}

/// [`Backend`] over HTTP.
pub struct HttpBackend {
    client: ApiClient,
    runtime: tokio::runtime::Runtime,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to build tokio runtime: {e}")))?;
        Ok(Self {
            client: ApiClient::new(config)?,
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

impl Backend for HttpBackend {
    fn login(&self, credentials: &Credentials) -> Result<String> {
        self.runtime.block_on(self.client.login(credentials))
    }

    fn register(&self, registration: &Registration) -> Result<String> {
        self.runtime.block_on(self.client.register(registration))
    }

    fn verify_otp(&self, otp: &str) -> Result<String> {
        self.runtime.block_on(self.client.verify_otp(otp))
    }

    fn user_info(&self, token: &str) -> Result<UserInfo> {
        self.runtime.block_on(self.client.user_info(token))
    }

    fn user_profile(&self, token: &str) -> Result<UserProfile> {
        self.runtime.block_on(self.client.user_profile(token))
    }

    fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        self.runtime.block_on(
            self.client
                .change_password(token, current_password, new_password),
        )
    }

    fn admin_dashboard(&self, token: &str) -> Result<DashboardFeed> {
        self.runtime.block_on(self.client.admin_dashboard(token))
    }

    fn assess_damage(&self, upload: &ImageUpload) -> Result<DamageAssessment> {
        self.runtime.block_on(self.client.assess_damage(upload))
    }

    fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<Vec<ChatMessage>> {
        self.runtime.block_on(self.client.chat(message, history))
    }
}

/// Create the default HTTP-backed backend.
pub fn create_backend(config: &ApiConfig) -> Result<Box<dyn Backend>> {
    Ok(Box::new(HttpBackend::new(config)?))
}
