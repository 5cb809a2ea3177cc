use super::*;

/// Which guest form is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// Home screen: login and sign-up forms for guests.
#[derive(Debug, Clone)]
pub struct HomeState {
    pub mode: AuthMode,
    pub login_username: TextInput,
    pub login_password: TextInput,
    pub signup_username: TextInput,
    pub signup_email: TextInput,
    pub signup_password: TextInput,
    pub signup_confirm: TextInput,
    pub cursor: FieldCursor,
    pub error: Option<String>,
    /// Password requirements panel is open
    pub show_requirements: bool,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            login_username: TextInput::new(),
            login_password: TextInput::masked(),
            signup_username: TextInput::new(),
            signup_email: TextInput::new(),
            signup_password: TextInput::masked(),
            signup_confirm: TextInput::masked(),
            cursor: FieldCursor::new(2),
            error: None,
            show_requirements: false,
        }
    }
}

impl HomeState {
    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        self.cursor = FieldCursor::new(match self.mode {
            AuthMode::Login => 2,
            AuthMode::Signup => 4,
        });
        self.error = None;
        self.show_requirements = false;
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match (self.mode, self.cursor.index()) {
            (AuthMode::Login, 0) => &mut self.login_username,
            (AuthMode::Login, _) => &mut self.login_password,
            (AuthMode::Signup, 0) => &mut self.signup_username,
            (AuthMode::Signup, 1) => &mut self.signup_email,
            (AuthMode::Signup, 2) => &mut self.signup_password,
            (AuthMode::Signup, _) => &mut self.signup_confirm,
        }
    }

    /// Sign-up password field has the cursor.
    pub fn editing_signup_password(&self) -> bool {
        self.mode == AuthMode::Signup && self.cursor.index() == 2
    }

    pub fn signup_form(&self) -> SignupForm {
        SignupForm {
            username: self.signup_username.value().trim().to_string(),
            email: self.signup_email.value().trim().to_string(),
            password: self.signup_password.value().to_string(),
            confirm_password: self.signup_confirm.value().to_string(),
        }
    }
}

impl App {
    // ========== Home Screen Methods ==========

    /// Handle keyboard input on the home screen.
    pub(super) fn handle_home_key(&mut self, key: KeyEvent) {
        if self.auth().is_authenticated() {
            if key.code == KeyCode::Enter {
                self.navigate(Route::Services);
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
            self.home.toggle_mode();
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.home.cursor.next(),
            KeyCode::BackTab | KeyCode::Up => self.home.cursor.previous(),
            KeyCode::Enter => match self.home.mode {
                AuthMode::Login => self.submit_login(),
                AuthMode::Signup => self.submit_signup(),
            },
            _ => {
                self.home.focused_input().handle_key(key);
            }
        }
    }

    fn submit_login(&mut self) {
        if self.home.login_username.is_blank() || self.home.login_password.value().is_empty() {
            self.home.error = Some("Please enter your username and password.".to_string());
            return;
        }
        self.home.error = None;
        self.queue(PendingAction::Login(Credentials {
            username: self.home.login_username.value().trim().to_string(),
            password: self.home.login_password.value().to_string(),
        }));
    }

    fn submit_signup(&mut self) {
        let form = self.home.signup_form();
        if let Err(errors) = validation::validate_signup(&form) {
            self.home.show_requirements = errors.weak_password().is_some();
            self.home.error = Some(describe_error(&errors.into()));
            return;
        }
        self.home.error = None;
        self.home.show_requirements = false;
        self.queue(PendingAction::Register(Registration {
            username: form.username,
            email: form.email,
            password: form.password,
        }));
    }

    pub(super) fn finish_login(&mut self, credentials: &Credentials) {
        match self.session.login(self.backend.as_ref(), credentials) {
            Ok(landing) => {
                self.home = HomeState::default();
                self.navigate(landing);
            }
            Err(e) => {
                tracing::info!(error = %e, "Login failed");
                self.home.login_password.clear();
                self.home.error = Some(match e {
                    Error::Network(_) => describe_error(&e),
                    _ => "Invalid username or password.".to_string(),
                });
            }
        }
    }

    pub(super) fn finish_register(&mut self, registration: &Registration) {
        match self.backend.register(registration) {
            Ok(message) => {
                self.home = HomeState::default();
                self.confirmation = ConfirmationState::with_message(message);
                self.navigate(Route::Confirmation);
            }
            Err(e) => {
                tracing::info!(error = %e, "Sign-up failed");
                self.home.error = Some(describe_error(&e));
            }
        }
    }
}
