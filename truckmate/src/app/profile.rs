use super::*;

/// Profile screen: account details plus the change-password form.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub profile: Option<UserProfile>,
    pub load_error: Option<String>,
    pub current_password: TextInput,
    pub new_password: TextInput,
    pub confirm_password: TextInput,
    pub cursor: FieldCursor,
    pub form_error: Option<String>,
    pub success: Option<String>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            load_error: None,
            current_password: TextInput::masked(),
            new_password: TextInput::masked(),
            confirm_password: TextInput::masked(),
            cursor: FieldCursor::new(3),
            form_error: None,
            success: None,
        }
    }
}

impl ProfileState {
    fn focused_input(&mut self) -> &mut TextInput {
        match self.cursor.index() {
            0 => &mut self.current_password,
            1 => &mut self.new_password,
            _ => &mut self.confirm_password,
        }
    }

    /// New-password field has the cursor.
    pub fn editing_new_password(&self) -> bool {
        self.cursor.index() == 1
    }

    fn clear_form(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
        self.cursor.reset();
    }
}

impl App {
    // ========== Profile Methods ==========

    pub(super) fn open_profile(&mut self) {
        self.profile.success = None;
        self.profile.form_error = None;
        self.queue(PendingAction::LoadProfile);
    }

    /// Handle keyboard input on the profile screen.
    pub(super) fn handle_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.profile.cursor.next(),
            KeyCode::BackTab | KeyCode::Up => self.profile.cursor.previous(),
            KeyCode::Enter => self.submit_password_change(),
            _ => {
                self.profile.focused_input().handle_key(key);
            }
        }
    }

    fn submit_password_change(&mut self) {
        let form = PasswordChangeForm {
            current_password: self.profile.current_password.value().to_string(),
            new_password: self.profile.new_password.value().to_string(),
            confirm_password: self.profile.confirm_password.value().to_string(),
        };
        self.profile.success = None;
        if let Err(errors) = validation::validate_password_change(&form) {
            self.profile.form_error = Some(describe_error(&errors.into()));
            return;
        }
        self.profile.form_error = None;
        self.queue(PendingAction::ChangePassword {
            current: form.current_password,
            new: form.new_password,
        });
    }

    pub(super) fn finish_load_profile(&mut self) {
        let result = self
            .session
            .require_token()
            .and_then(|token| self.backend.user_profile(token));
        match result {
            Ok(profile) => {
                self.profile.profile = Some(profile);
                self.profile.load_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load profile");
                self.profile.load_error = Some(describe_error(&e));
            }
        }
    }

    pub(super) fn finish_change_password(&mut self, current: &str, new: &str) {
        let result = self
            .session
            .require_token()
            .and_then(|token| self.backend.change_password(token, current, new));
        match result {
            Ok(()) => {
                tracing::info!("Password changed");
                self.profile.clear_form();
                self.profile.success = Some("Password changed successfully.".to_string());
            }
            Err(e) => {
                tracing::info!(error = %e, "Password change failed");
                self.profile.form_error = Some(describe_error(&e));
            }
        }
    }
}
