//! Backend REST paths.

pub const LOGIN: &str = "/api/login/";
pub const REGISTER: &str = "/api/register/";
pub const VERIFY_OTP: &str = "/api/verify-otp/";
pub const USER: &str = "/api/user/";
pub const USER_PROFILE: &str = "/api/user-profile/";
pub const CHANGE_PASSWORD: &str = "/api/change-password/";
pub const ADMIN_DASHBOARD: &str = "/api/admin-dashboard/";
pub const ASSESS_DAMAGE: &str = "/assess_damage/";
pub const CHATBOT: &str = "/api/chatbot/";

/// Absolute endpoint URLs for one configured base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
