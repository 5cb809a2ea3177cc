//! Client-side form validation.
//!
//! All password checks go through [`check_password`]; the sign-up and
//! change-password flows layer required-field and confirmation checks on top.
//! A failed validation never reaches the network.

use std::collections::BTreeSet;
use std::fmt;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum OTP length accepted by the backend.
pub const MAX_OTP_LEN: usize = 6;

/// One password requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
}

impl PasswordRule {
    pub const ALL: [PasswordRule; 4] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Digit,
    ];

    /// Requirement text shown in the requirements panel.
    pub fn requirement(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "At least 8 characters long",
            PasswordRule::Uppercase => "Contains uppercase letters",
            PasswordRule::Lowercase => "Contains lowercase letters",
            PasswordRule::Digit => "Contains numbers",
        }
    }

    fn is_met(&self, password: &str) -> bool {
        match self {
            PasswordRule::MinLength => password.chars().count() >= MIN_PASSWORD_LEN,
            PasswordRule::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRule::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
        }
    }
}

/// Outcome of checking a password: the set of rules it fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordCheck {
    failed: BTreeSet<PasswordRule>,
}

impl PasswordCheck {
    pub fn is_valid(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed(&self) -> &BTreeSet<PasswordRule> {
        &self.failed
    }

    /// Every rule paired with whether it is met, in display order.
    pub fn requirements(&self) -> Vec<(PasswordRule, bool)> {
        PasswordRule::ALL
            .iter()
            .map(|rule| (*rule, !self.failed.contains(rule)))
            .collect()
    }
}

/// Check a password against every [`PasswordRule`].
pub fn check_password(password: &str) -> PasswordCheck {
    PasswordCheck {
        failed: PasswordRule::ALL
            .iter()
            .filter(|rule| !rule.is_met(password))
            .copied()
            .collect(),
    }
}

/// A single form-level failure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormError {
    /// Required field left blank
    Missing(&'static str),
    /// Email lacks the `local@domain` shape
    InvalidEmail,
    /// Password fails one or more rules
    WeakPassword(Vec<PasswordRule>),
    /// Password and confirmation differ
    PasswordMismatch,
    /// OTP longer than the backend accepts
    OtpTooLong,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing(field) => write!(f, "{field} is required"),
            FormError::InvalidEmail => f.write_str("Enter a valid email address"),
            FormError::WeakPassword(rules) => {
                let unmet: Vec<&str> = rules.iter().map(|r| r.requirement()).collect();
                write!(f, "Password does not meet requirements: {}", unmet.join(", "))
            }
            FormError::PasswordMismatch => f.write_str("Passwords do not match"),
            FormError::OtpTooLong => write!(f, "OTP is at most {MAX_OTP_LEN} characters"),
        }
    }
}

/// Set of form failures; empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeSet<FormError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, error: &FormError) -> bool {
        self.errors.contains(error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormError> {
        self.errors.iter()
    }

    /// The password check embedded in this result, if a password failed.
    pub fn weak_password(&self) -> Option<&[PasswordRule]> {
        self.errors.iter().find_map(|e| match e {
            FormError::WeakPassword(rules) => Some(rules.as_slice()),
            _ => None,
        })
    }

    fn push(&mut self, error: FormError) {
        self.errors.insert(error);
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Sign-up form contents.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Change-password form contents.
#[derive(Debug, Clone, Default)]
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

fn check_new_password(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    let check = check_password(password);
    if !check.is_valid() {
        errors.push(FormError::WeakPassword(check.failed().iter().copied().collect()));
    }
    if password != confirm {
        errors.push(FormError::PasswordMismatch);
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Validate the sign-up form before calling `/api/register/`.
pub fn validate_signup(form: &SignupForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.username.trim().is_empty() {
        errors.push(FormError::Missing("Username"));
    }
    if form.email.trim().is_empty() {
        errors.push(FormError::Missing("Email"));
    } else if !looks_like_email(form.email.trim()) {
        errors.push(FormError::InvalidEmail);
    }
    check_new_password(&mut errors, &form.password, &form.confirm_password);

    errors.into_result()
}

/// Validate the change-password form before calling the backend.
pub fn validate_password_change(form: &PasswordChangeForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.current_password.is_empty() {
        errors.push(FormError::Missing("Current password"));
    }
    check_new_password(&mut errors, &form.new_password, &form.confirm_password);

    errors.into_result()
}

/// Validate an OTP entry.
pub fn validate_otp(otp: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let otp = otp.trim();
    if otp.is_empty() {
        errors.push(FormError::Missing("OTP"));
    } else if otp.chars().count() > MAX_OTP_LEN {
        errors.push(FormError::OtpTooLong);
    }
    errors.into_result()
}
