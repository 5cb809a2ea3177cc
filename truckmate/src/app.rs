//! Application state for the TUI.

mod admin;
mod assessment;
mod confirmation;
mod home;
mod profile;
mod recommendation;
mod services;
#[cfg(test)]
pub(crate) mod tests;

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use truckmate_core::api::Backend;
use truckmate_core::dashboard::DashboardQuery;
use truckmate_core::router::{self, NavItem, Route};
use truckmate_core::session::{AuthState, SessionContext};
use truckmate_core::validation::{self, PasswordChangeForm, SignupForm};
use truckmate_core::{
    ChatMessage, Credentials, DamageAssessment, DashboardFeed, Error, ImageUpload, Registration,
    UserProfile,
};

use crate::input::{FieldCursor, TextInput};

pub use admin::AdminState;
pub use assessment::AssessmentState;
pub use confirmation::ConfirmationState;
pub use home::{AuthMode, HomeState};
pub use profile::ProfileState;
pub use recommendation::RecommendationState;
pub use services::{ServiceCard, ServicesState};

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    /// Navigation bar at the top
    Nav,
    /// The current screen
    #[default]
    Content,
}

/// A backend call queued for the next tick.
///
/// The loop draws one frame with the pending label before running the call,
/// so the screen shows `Loading...` while the request blocks.
#[derive(Debug, Clone)]
pub enum PendingAction {
    RestoreSession,
    Login(Credentials),
    Register(Registration),
    VerifyOtp(String),
    LoadProfile,
    ChangePassword { current: String, new: String },
    LoadDashboard,
    Assess(ImageUpload),
    Chat(String),
}

impl PendingAction {
    pub fn label(&self) -> &'static str {
        match self {
            PendingAction::RestoreSession => "Checking session...",
            PendingAction::Chat(_) => "Thinking...",
            _ => "Loading...",
        }
    }
}

/// Main application state.
pub struct App {
    /// Shop backend
    backend: Box<dyn Backend>,
    /// Token plus identity
    pub session: SessionContext,
    /// Screen currently shown
    pub route: Route,
    /// Nav bar or screen
    pub focus: Focus,
    /// Selected nav bar entry
    pub nav_index: usize,
    /// Backend call waiting for the next tick
    pending: Option<PendingAction>,
    /// One-shot message shown in the footer
    pub notice: Option<String>,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Where saved assessment images go
    images_dir: PathBuf,

    // ========== Screen State ==========
    pub home: HomeState,
    pub confirmation: ConfirmationState,
    pub services: ServicesState,
    pub assessment: AssessmentState,
    pub recommendation: RecommendationState,
    pub profile: ProfileState,
    pub admin: AdminState,
}

impl App {
    /// Create the app on the Home screen with a session check queued.
    pub fn new(backend: Box<dyn Backend>, session: SessionContext, images_dir: PathBuf) -> Self {
        Self {
            backend,
            session,
            route: Route::Home,
            focus: Focus::Content,
            nav_index: 0,
            pending: Some(PendingAction::RestoreSession),
            notice: None,
            should_quit: false,
            images_dir,
            home: HomeState::default(),
            confirmation: ConfirmationState::default(),
            services: ServicesState::default(),
            assessment: AssessmentState::default(),
            recommendation: RecommendationState::default(),
            profile: ProfileState::default(),
            admin: AdminState::default(),
        }
    }

    pub fn auth(&self) -> &AuthState {
        self.session.state()
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        router::nav_items(self.auth())
    }

    pub fn pending_label(&self) -> Option<&'static str> {
        self.pending.as_ref().map(PendingAction::label)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue a backend call. A newer call replaces one not yet started.
    fn queue(&mut self, action: PendingAction) {
        if let Some(previous) = self.pending.replace(action) {
            tracing::debug!(replaced = previous.label(), "Replacing queued backend call");
        }
    }

    // ========== Navigation ==========

    /// Go to `route` after applying the session gates.
    pub fn navigate(&mut self, route: Route) {
        let resolved = router::resolve(route, self.auth());
        if resolved != route {
            tracing::debug!(requested = %route, resolved = %resolved, "Route redirected");
        }
        self.route = resolved;
        self.focus = Focus::Content;
        self.sync_nav_index();

        match resolved {
            Route::Profile => self.open_profile(),
            Route::Admin => self.open_admin(),
            Route::Assessment => self.open_assessment(),
            Route::Confirmation => self.confirmation.error = None,
            _ => {}
        }
    }

    fn sync_nav_index(&mut self) {
        let items = self.nav_items();
        if let Some(idx) = items
            .iter()
            .position(|item| *item == NavItem::Go(self.route))
        {
            self.nav_index = idx;
        } else if self.nav_index >= items.len() {
            self.nav_index = 0;
        }
    }

    /// Clear the session and every view that depended on it.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            tracing::warn!(error = %e, "Failed to remove saved token");
        }
        self.profile = ProfileState::default();
        self.admin = AdminState::default();
        self.home = HomeState::default();
        self.notice = Some("You have been logged out.".to_string());
        self.navigate(Route::Home);
    }

    fn activate_nav_item(&mut self) {
        let items = self.nav_items();
        match items.get(self.nav_index) {
            Some(NavItem::Go(route)) => self.navigate(*route),
            Some(NavItem::Logout) => self.logout(),
            None => {}
        }
    }

    // ========== Backend Calls ==========

    /// Run the queued backend call, if any.
    pub fn run_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };

        match action {
            PendingAction::RestoreSession => self.finish_restore(),
            PendingAction::Login(credentials) => self.finish_login(&credentials),
            PendingAction::Register(registration) => self.finish_register(&registration),
            PendingAction::VerifyOtp(otp) => self.finish_verify(&otp),
            PendingAction::LoadProfile => self.finish_load_profile(),
            PendingAction::ChangePassword { current, new } => {
                self.finish_change_password(&current, &new)
            }
            PendingAction::LoadDashboard => self.finish_load_dashboard(),
            PendingAction::Assess(upload) => self.finish_assess(&upload),
            PendingAction::Chat(message) => self.finish_chat(&message),
        }
    }

    fn finish_restore(&mut self) {
        if let Err(e) = self.session.restore(self.backend.as_ref()) {
            tracing::warn!(error = %e, "Could not read saved token");
        }
        self.navigate(Route::Root);
    }

    // ========== Keyboard ==========

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.focus == Focus::Nav {
            self.handle_nav_key(key);
            return;
        }

        if key.code == KeyCode::Esc {
            self.focus = Focus::Nav;
            self.sync_nav_index();
            return;
        }

        self.notice = None;
        match self.route {
            Route::Root | Route::Home => self.handle_home_key(key),
            Route::About => self.handle_about_key(key),
            Route::Services => self.handle_services_key(key),
            Route::Recommendation => self.handle_recommendation_key(key),
            Route::Profile => self.handle_profile_key(key),
            Route::Confirmation => self.handle_confirmation_key(key),
            Route::Assessment => self.handle_assessment_key(key),
            Route::Admin => self.handle_admin_key(key),
        }
    }

    /// Handle keyboard input in the navigation bar.
    fn handle_nav_key(&mut self, key: KeyEvent) {
        let count = self.nav_items().len();
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                if count > 0 {
                    self.nav_index = (self.nav_index + count - 1) % count;
                }
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                if count > 0 {
                    self.nav_index = (self.nav_index + 1) % count;
                }
            }
            KeyCode::Enter => {
                self.activate_nav_item();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.focus = Focus::Content;
            }
            _ => {}
        }
    }

    /// The about screen is static; any key other than Esc is ignored.
    fn handle_about_key(&mut self, _key: KeyEvent) {}
}

/// Inline message for a failed backend call.
fn describe_error(error: &Error) -> String {
    match error {
        Error::Api { message, .. } => message.clone(),
        Error::Network(_) => "Unable to reach the server. Please try again.".to_string(),
        Error::NotAuthenticated => "Please log in first.".to_string(),
        Error::Validation(errors) => errors.to_string(),
        other => other.to_string(),
    }
}
