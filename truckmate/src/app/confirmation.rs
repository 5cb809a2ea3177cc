use super::*;

/// Email confirmation screen: OTP entry after sign-up.
#[derive(Debug, Clone)]
pub struct ConfirmationState {
    /// Message from the sign-up response
    pub message: Option<String>,
    pub otp: TextInput,
    pub error: Option<String>,
}

impl Default for ConfirmationState {
    fn default() -> Self {
        Self {
            message: None,
            otp: TextInput::new().with_max_len(validation::MAX_OTP_LEN),
            error: None,
        }
    }
}

impl ConfirmationState {
    pub fn with_message(message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::default()
        }
    }
}

impl App {
    /// Handle keyboard input on the confirmation screen.
    pub(super) fn handle_confirmation_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_otp(),
            _ => {
                self.confirmation.otp.handle_key(key);
            }
        }
    }

    fn submit_otp(&mut self) {
        let otp = self.confirmation.otp.value().trim().to_string();
        if let Err(errors) = validation::validate_otp(&otp) {
            self.confirmation.error = Some(describe_error(&errors.into()));
            return;
        }
        self.confirmation.error = None;
        self.queue(PendingAction::VerifyOtp(otp));
    }

    pub(super) fn finish_verify(&mut self, otp: &str) {
        match self.backend.verify_otp(otp) {
            Ok(message) => {
                tracing::info!("Email verified");
                self.confirmation = ConfirmationState::default();
                self.navigate(Route::Home);
                self.notice = Some(format!("{message} You can now log in."));
            }
            Err(e) => {
                tracing::info!(error = %e, "OTP verification failed");
                self.confirmation.otp.clear();
                self.confirmation.error = Some(match e {
                    Error::Api { .. } | Error::Network(_) => describe_error(&e),
                    _ => "Invalid OTP. Please try again.".to_string(),
                });
            }
        }
    }
}
