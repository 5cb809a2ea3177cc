//! Session context: the durable auth token plus the identity derived from it.
//!
//! The context is an explicit value owned by the UI and passed to whatever
//! needs it. Every update replaces the whole state, so the last write wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::router::{landing_after_login, Route};
use crate::types::{Credentials, UserInfo};

/// Durable token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, or `None` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    /// Remove the token; a missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Who the client is acting as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated { username: String, is_admin: bool },
}

impl AuthState {
    pub fn from_user(user: &UserInfo) -> Self {
        AuthState::Authenticated {
            username: user.username.clone(),
            is_admin: user.is_admin(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthState::Authenticated { is_admin: true, .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated { username, .. } => Some(username),
        }
    }
}

/// Token and identity for the running client.
#[derive(Debug)]
pub struct SessionContext {
    store: TokenStore,
    token: Option<String>,
    state: AuthState,
}

impl SessionContext {
    /// Anonymous context over `store`; call [`SessionContext::restore`] to
    /// pick up a saved token.
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            token: None,
            state: AuthState::Anonymous,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Token or [`Error::NotAuthenticated`].
    pub fn require_token(&self) -> Result<&str> {
        self.token().ok_or(Error::NotAuthenticated)
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Startup validation of a saved token.
    ///
    /// Any identity-fetch failure clears the saved token and leaves the
    /// context anonymous; the failure is logged, not returned.
    pub fn restore(&mut self, backend: &dyn Backend) -> Result<&AuthState> {
        let Some(token) = self.store.load()? else {
            self.reset();
            return Ok(&self.state);
        };

        match backend.user_info(&token) {
            Ok(user) => {
                tracing::info!(
                    username = %user.username,
                    admin = user.is_admin(),
                    "Session restored"
                );
                self.token = Some(token);
                self.state = AuthState::from_user(&user);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saved token rejected, clearing session");
                self.store.clear()?;
                self.reset();
            }
        }
        Ok(&self.state)
    }

    /// Authenticate, persist the token, then fetch the identity.
    ///
    /// Returns the screen a fresh login lands on. If the identity fetch
    /// fails the token is discarded again and the error returned.
    pub fn login(&mut self, backend: &dyn Backend, credentials: &Credentials) -> Result<Route> {
        let token = backend.login(credentials)?;
        self.store.save(&token)?;

        match backend.user_info(&token) {
            Ok(user) => {
                tracing::info!(username = %user.username, admin = user.is_admin(), "Logged in");
                self.token = Some(token);
                self.state = AuthState::from_user(&user);
                Ok(landing_after_login(&self.state))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Identity fetch failed after login");
                self.store.clear()?;
                self.reset();
                Err(e)
            }
        }
    }

    /// Forget the token both in memory and on disk.
    pub fn logout(&mut self) -> Result<()> {
        self.reset();
        self.store.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    fn reset(&mut self) {
        self.token = None;
        self.state = AuthState::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ChatMessage, DamageAssessment, DashboardFeed, ImageUpload, Registration, UserProfile,
    };
    use tempfile::TempDir;

    /// Accepts one password and knows one token per user.
    struct FakeBackend {
        staff: bool,
    }

    impl FakeBackend {
        fn unsupported<T>() -> Result<T> {
            Err(Error::Network("not used in this test".to_string()))
        }
    }

    impl Backend for FakeBackend {
        fn login(&self, credentials: &Credentials) -> Result<String> {
            if credentials.password == "Abcd1234" {
                Ok(format!("tok-{}", credentials.username))
            } else {
                Err(Error::Api {
                    status: 400,
                    message: "Unable to log in with provided credentials.".to_string(),
                })
            }
        }

        fn register(&self, _registration: &Registration) -> Result<String> {
            Self::unsupported()
        }

        fn verify_otp(&self, _otp: &str) -> Result<String> {
            Self::unsupported()
        }

        fn user_info(&self, token: &str) -> Result<UserInfo> {
            match token.strip_prefix("tok-") {
                Some(username) if username != "ghost" => Ok(UserInfo {
                    username: username.to_string(),
                    email: None,
                    registration_date: None,
                    is_superuser: false,
                    is_staff: self.staff,
                    user_type: Some(1),
                }),
                _ => Err(Error::Api {
                    status: 401,
                    message: "Invalid token.".to_string(),
                }),
            }
        }

        fn user_profile(&self, _token: &str) -> Result<UserProfile> {
            Self::unsupported()
        }

        fn change_password(&self, _token: &str, _current: &str, _new: &str) -> Result<()> {
            Self::unsupported()
        }

        fn admin_dashboard(&self, _token: &str) -> Result<DashboardFeed> {
            Self::unsupported()
        }

        fn assess_damage(&self, _upload: &ImageUpload) -> Result<DamageAssessment> {
            Self::unsupported()
        }

        fn chat(&self, _message: &str, _history: &[ChatMessage]) -> Result<Vec<ChatMessage>> {
            Self::unsupported()
        }
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn context(dir: &TempDir) -> SessionContext {
        SessionContext::new(TokenStore::new(dir.path().join("nested").join("token")))
    }

    #[test]
    fn test_token_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        assert_eq!(store.load().unwrap(), None);

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.save("abc123").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_staff_login_lands_on_admin() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        let route = session
            .login(&FakeBackend { staff: true }, &creds("boss", "Abcd1234"))
            .unwrap();

        assert_eq!(route, Route::Admin);
        assert!(session.state().is_admin());
        assert_eq!(session.token(), Some("tok-boss"));
        assert_eq!(session.store().load().unwrap().as_deref(), Some("tok-boss"));
    }

    #[test]
    fn test_regular_login_lands_on_home() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        let route = session
            .login(&FakeBackend { staff: false }, &creds("driver", "Abcd1234"))
            .unwrap();

        assert_eq!(route, Route::Home);
        assert_eq!(session.state().username(), Some("driver"));
        assert!(!session.state().is_admin());
    }

    #[test]
    fn test_failed_login_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        let err = session
            .login(&FakeBackend { staff: false }, &creds("driver", "wrong"))
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(session.state(), &AuthState::Anonymous);
        assert_eq!(session.store().load().unwrap(), None);
    }

    #[test]
    fn test_identity_failure_after_login_clears_token() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        let err = session
            .login(&FakeBackend { staff: false }, &creds("ghost", "Abcd1234"))
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(session.token().is_none());
        assert_eq!(session.store().load().unwrap(), None);
    }

    #[test]
    fn test_logout_clears_everything() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        session
            .login(&FakeBackend { staff: true }, &creds("boss", "Abcd1234"))
            .unwrap();

        session.logout().unwrap();
        assert_eq!(session.state(), &AuthState::Anonymous);
        assert!(session.token().is_none());
        assert!(matches!(session.require_token(), Err(Error::NotAuthenticated)));
        assert_eq!(session.store().load().unwrap(), None);
    }

    #[test]
    fn test_restore_with_valid_token() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        session.store().save("tok-driver").unwrap();

        let state = session.restore(&FakeBackend { staff: false }).unwrap();
        assert_eq!(state.username(), Some("driver"));
        assert_eq!(session.token(), Some("tok-driver"));
    }

    #[test]
    fn test_restore_with_rejected_token_clears_it() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        session.store().save("stale").unwrap();

        let state = session.restore(&FakeBackend { staff: false }).unwrap();
        assert_eq!(state, &AuthState::Anonymous);
        assert_eq!(session.store().load().unwrap(), None);
    }

    #[test]
    fn test_restore_without_token_stays_anonymous() {
        let dir = TempDir::new().unwrap();
        let mut session = context(&dir);
        assert_eq!(
            session.restore(&FakeBackend { staff: true }).unwrap(),
            &AuthState::Anonymous
        );
    }
}
