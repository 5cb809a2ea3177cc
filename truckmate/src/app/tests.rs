use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use truckmate_core::session::TokenStore;
use truckmate_core::{AssessmentRecord, ChatRole, DetectedDamage, UrgencyLevel, UserInfo};

use super::*;

type Calls = Rc<RefCell<Vec<&'static str>>>;

/// Shop backend double: `Abcd1234` is the only valid password, `boss` is staff.
struct FakeShop {
    calls: Calls,
    chat_fails: bool,
}

impl FakeShop {
    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }
}

fn rejected(status: u16, message: &str) -> Error {
    Error::Api {
        status,
        message: message.to_string(),
    }
}

impl Backend for FakeShop {
    fn login(&self, credentials: &Credentials) -> truckmate_core::Result<String> {
        self.record("login");
        if credentials.password == "Abcd1234" {
            Ok(format!("tok-{}", credentials.username))
        } else {
            Err(rejected(400, "Unable to log in with provided credentials."))
        }
    }

    fn register(&self, registration: &Registration) -> truckmate_core::Result<String> {
        self.record("register");
        if registration.username == "taken" {
            Err(rejected(400, "Username already exists"))
        } else {
            Ok("User registered successfully. Please verify your email.".to_string())
        }
    }

    fn verify_otp(&self, otp: &str) -> truckmate_core::Result<String> {
        self.record("verify_otp");
        if otp == "123456" {
            Ok("OTP verified successfully.".to_string())
        } else {
            Err(rejected(400, "Invalid OTP."))
        }
    }

    fn user_info(&self, token: &str) -> truckmate_core::Result<UserInfo> {
        self.record("user_info");
        let username = token
            .strip_prefix("tok-")
            .ok_or_else(|| rejected(401, "Invalid token."))?;
        Ok(UserInfo {
            username: username.to_string(),
            email: None,
            registration_date: None,
            is_superuser: false,
            is_staff: username == "boss",
            user_type: Some(1),
        })
    }

    fn user_profile(&self, token: &str) -> truckmate_core::Result<UserProfile> {
        self.record("user_profile");
        let username = token.trim_start_matches("tok-");
        Ok(UserProfile {
            email: format!("{username}@example.com"),
            registration_date: "2024-03-01".to_string(),
        })
    }

    fn change_password(
        &self,
        _token: &str,
        current_password: &str,
        _new_password: &str,
    ) -> truckmate_core::Result<()> {
        self.record("change_password");
        if current_password == "Abcd1234" {
            Ok(())
        } else {
            Err(rejected(400, "Current password is incorrect."))
        }
    }

    fn admin_dashboard(&self, token: &str) -> truckmate_core::Result<DashboardFeed> {
        self.record("admin_dashboard");
        if token != "tok-boss" {
            return Err(rejected(403, "You do not have permission to access this page."));
        }
        let now = Utc::now();
        let record = |id: i64, days: i64, priority: Option<f64>, urgency| AssessmentRecord {
            id,
            truck_id: format!("TRK-{id}"),
            assessment_date: now - Duration::days(days),
            severity_score: Some(5.0),
            estimated_repair_cost: Some(1000.0),
            urgency_level: urgency,
            priority_score: priority,
        };
        Ok(DashboardFeed {
            assessments: vec![
                record(1, 1, Some(2.0), Some(UrgencyLevel::Low)),
                record(2, 10, Some(5.0), Some(UrgencyLevel::Medium)),
                record(3, 40, Some(8.0), Some(UrgencyLevel::High)),
            ],
            total_assessments: 3,
            high_priority_assessments: 1,
        })
    }

    fn assess_damage(&self, upload: &ImageUpload) -> truckmate_core::Result<DamageAssessment> {
        self.record("assess_damage");
        Ok(DamageAssessment {
            image: "aGVsbG8=".to_string(),
            damages: vec![DetectedDamage {
                area: "door".to_string(),
                confidence: "0.88".to_string(),
            }],
            assessment: format!("Door\n- Dent on {}", upload.file_name),
            severity_score: "5".to_string(),
            estimated_repair_cost: "₱ 2500.00".to_string(),
            urgency_level: "Medium".to_string(),
            priority_score: "5.10".to_string(),
            priority_explanation: "This score indicates medium priority.".to_string(),
        })
    }

    fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> truckmate_core::Result<Vec<ChatMessage>> {
        self.record("chat");
        if self.chat_fails {
            return Err(Error::Network("connection refused".to_string()));
        }
        let mut updated = history.to_vec();
        updated.push(ChatMessage::user(message));
        updated.push(ChatMessage::assistant(format!("Echo: {message}")));
        Ok(updated)
    }
}

pub(crate) struct Harness {
    pub(crate) app: App,
    calls: Calls,
    dir: TempDir,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_chat_failing(false)
    }

    fn with_chat_failing(chat_fails: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let calls = Calls::default();
        let backend = FakeShop {
            calls: Rc::clone(&calls),
            chat_fails,
        };
        let session = SessionContext::new(TokenStore::new(dir.path().join("token")));
        let mut app = App::new(Box::new(backend), session, dir.path().join("images"));
        app.run_pending();
        Self { app, calls, dir }
    }

    pub(crate) fn press(&mut self, code: KeyCode) {
        self.app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn chord(&mut self, c: char) {
        self.app
            .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    pub(crate) fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    fn login(&mut self, username: &str, password: &str) {
        self.type_text(username);
        self.press(KeyCode::Tab);
        self.type_text(password);
        self.press(KeyCode::Enter);
        self.app.run_pending();
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

#[test]
fn starts_anonymous_on_home_without_network() {
    let h = Harness::new();
    assert_eq!(h.app.route, Route::Home);
    assert!(!h.app.auth().is_authenticated());
    assert!(h.calls().is_empty());
}

#[test]
fn saved_token_is_restored_at_startup() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("token"));
    store.save("tok-boss").unwrap();

    let backend = FakeShop {
        calls: Calls::default(),
        chat_fails: false,
    };
    let mut app = App::new(
        Box::new(backend),
        SessionContext::new(store),
        dir.path().join("images"),
    );
    assert_eq!(app.pending_label(), Some("Checking session..."));
    app.run_pending();

    assert!(app.auth().is_admin());
    assert_eq!(app.route, Route::Admin);
}

#[test]
fn admin_login_lands_on_dashboard() {
    let mut h = Harness::new();
    h.login("boss", "Abcd1234");

    assert_eq!(h.app.route, Route::Admin);
    assert_eq!(h.app.pending_label(), Some("Loading..."));
    h.app.run_pending();

    let feed = h.app.admin.feed.as_ref().unwrap();
    assert_eq!(feed.total_assessments, 3);
    assert_eq!(h.app.admin_row_count(), 3);
    assert_eq!(h.calls(), vec!["login", "user_info", "admin_dashboard"]);
}

#[test]
fn regular_login_lands_on_home_with_welcome() {
    let mut h = Harness::new();
    h.login("driver", "Abcd1234");

    assert_eq!(h.app.route, Route::Home);
    assert_eq!(h.app.auth().username(), Some("driver"));
    assert!(!h.app.has_pending());
}

#[test]
fn failed_login_shows_inline_error() {
    let mut h = Harness::new();
    h.login("driver", "wrong");

    assert_eq!(h.app.route, Route::Home);
    assert_eq!(
        h.app.home.error.as_deref(),
        Some("Invalid username or password.")
    );
    assert!(h.app.home.login_password.value().is_empty());
}

#[test]
fn empty_login_is_not_sent() {
    let mut h = Harness::new();
    h.press(KeyCode::Enter);
    assert!(!h.app.has_pending());
    assert!(h.app.home.error.is_some());
}

#[test]
fn admin_screen_is_gated() {
    let mut h = Harness::new();
    h.app.navigate(Route::Admin);
    assert_eq!(h.app.route, Route::Home);

    h.login("driver", "Abcd1234");
    h.app.navigate(Route::Admin);
    assert_eq!(h.app.route, Route::Home);
    h.app.navigate(Route::Profile);
    assert_eq!(h.app.route, Route::Profile);
}

#[test]
fn logout_resets_dependent_views() {
    let mut h = Harness::new();
    h.login("boss", "Abcd1234");
    h.app.run_pending();
    assert!(h.app.admin.feed.is_some());

    h.press(KeyCode::Esc);
    assert_eq!(h.app.focus, Focus::Nav);
    let logout_idx = h
        .app
        .nav_items()
        .iter()
        .position(|item| *item == NavItem::Logout)
        .unwrap();
    h.app.nav_index = logout_idx;
    h.press(KeyCode::Enter);

    assert_eq!(h.app.route, Route::Home);
    assert!(!h.app.auth().is_authenticated());
    assert!(h.app.admin.feed.is_none());
    assert!(h.app.profile.profile.is_none());
    assert!(!h.dir.path().join("token").exists());
    assert_eq!(h.app.nav_items().len(), 3);
}

#[test]
fn signup_with_weak_password_opens_requirements() {
    let mut h = Harness::new();
    h.chord('t');
    assert_eq!(h.app.home.mode, AuthMode::Signup);

    h.type_text("newbie");
    h.press(KeyCode::Tab);
    h.type_text("newbie@example.com");
    h.press(KeyCode::Tab);
    h.type_text("abcd1234");
    h.press(KeyCode::Tab);
    h.type_text("abcd1234");
    h.press(KeyCode::Enter);

    assert!(h.app.home.show_requirements);
    assert_eq!(
        h.app.home.error.as_deref(),
        Some("Password does not meet requirements: Contains uppercase letters")
    );
    assert!(!h.app.has_pending());
    assert!(h.calls().is_empty());
}

#[test]
fn signup_then_confirm_email() {
    let mut h = Harness::new();
    h.chord('t');
    h.type_text("newbie");
    h.press(KeyCode::Tab);
    h.type_text("newbie@example.com");
    h.press(KeyCode::Tab);
    h.type_text("Abcd1234");
    h.press(KeyCode::Tab);
    h.type_text("Abcd1234");
    h.press(KeyCode::Enter);
    h.app.run_pending();

    assert_eq!(h.app.route, Route::Confirmation);
    assert!(h
        .app
        .confirmation
        .message
        .as_deref()
        .unwrap()
        .contains("verify your email"));

    h.type_text("000000");
    h.press(KeyCode::Enter);
    h.app.run_pending();
    assert_eq!(h.app.route, Route::Confirmation);
    assert_eq!(h.app.confirmation.error.as_deref(), Some("Invalid OTP."));

    h.type_text("123456");
    h.press(KeyCode::Enter);
    h.app.run_pending();
    assert_eq!(h.app.route, Route::Home);
    assert!(h.app.notice.as_deref().unwrap().contains("log in"));
}

#[test]
fn chat_replaces_history_and_ignores_blank_input() {
    let mut h = Harness::new();
    h.app.navigate(Route::Recommendation);

    h.type_text("   ");
    h.press(KeyCode::Enter);
    assert!(!h.app.has_pending());

    h.type_text("My brakes squeal");
    h.press(KeyCode::Enter);
    assert_eq!(h.app.pending_label(), Some("Thinking..."));
    h.app.run_pending();

    let history = &h.app.recommendation.history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[1].content, "Echo: My brakes squeal");
    assert_eq!(h.app.recommendation.input.value(), "");
}

#[test]
fn chat_failure_leaves_history_untouched() {
    let mut h = Harness::with_chat_failing(true);
    h.app.navigate(Route::Recommendation);
    h.type_text("hello");
    h.press(KeyCode::Enter);
    h.app.run_pending();

    assert!(h.app.recommendation.history.is_empty());
    assert!(h.app.recommendation.error.is_some());
    // Typed text survives so the user can resend it
    assert_eq!(h.app.recommendation.input.value(), "hello");
}

#[test]
fn services_upload_runs_assessment_once() {
    let mut h = Harness::new();
    let image = h.dir.path().join("truck.jpg");
    std::fs::write(&image, b"jpeg bytes").unwrap();

    h.app.navigate(Route::Services);
    h.type_text(image.to_str().unwrap());
    h.press(KeyCode::Enter);
    assert_eq!(h.app.route, Route::Assessment);
    h.app.run_pending();

    let result = h.app.assessment.result.as_ref().unwrap();
    assert_eq!(result.damages.len(), 1);
    assert!(!h.app.has_pending());

    h.press(KeyCode::Char('s'));
    let saved = h.app.assessment.saved_to.clone().unwrap();
    assert_eq!(std::fs::read(saved).unwrap(), b"hello");
    assert_eq!(
        h.calls().iter().filter(|c| **c == "assess_damage").count(),
        1
    );
}

#[test]
fn services_rejects_missing_file() {
    let mut h = Harness::new();
    h.app.navigate(Route::Services);
    h.press(KeyCode::Enter);
    assert_eq!(
        h.app.services.error.as_deref(),
        Some("Please choose an image to upload.")
    );

    h.type_text("/definitely/not/here.png");
    h.press(KeyCode::Enter);
    assert_eq!(h.app.route, Route::Services);
    assert!(h.app.services.error.is_some());
}

#[test]
fn profile_loads_and_changes_password() {
    let mut h = Harness::new();
    h.login("driver", "Abcd1234");
    h.app.navigate(Route::Profile);
    h.app.run_pending();
    assert_eq!(
        h.app.profile.profile.as_ref().unwrap().email,
        "driver@example.com"
    );

    h.type_text("Abcd1234");
    h.press(KeyCode::Tab);
    h.type_text("Newpass99");
    h.press(KeyCode::Tab);
    h.type_text("Mismatch99");
    h.press(KeyCode::Enter);
    assert!(!h.app.has_pending());
    assert!(h.app.profile.form_error.is_some());

    for _ in 0.."Mismatch99".len() {
        h.press(KeyCode::Backspace);
    }
    h.type_text("Newpass99");
    h.press(KeyCode::Enter);
    h.app.run_pending();
    assert_eq!(
        h.app.profile.success.as_deref(),
        Some("Password changed successfully.")
    );
}

#[test]
fn admin_filter_keys_narrow_rows() {
    let mut h = Harness::new();
    h.login("boss", "Abcd1234");
    h.app.run_pending();
    assert_eq!(h.app.admin_row_count(), 3);

    // All -> Low
    h.press(KeyCode::Char('p'));
    assert_eq!(h.app.admin_row_count(), 1);
    h.press(KeyCode::Char('p'));
    h.press(KeyCode::Char('p'));
    h.press(KeyCode::Char('p'));
    assert_eq!(h.app.admin_row_count(), 3);

    // All -> Week
    h.press(KeyCode::Char('t'));
    assert_eq!(h.app.admin_row_count(), 1);
    // Week -> Month
    h.press(KeyCode::Char('t'));
    assert_eq!(h.app.admin_row_count(), 2);
}

#[test]
fn nav_bar_moves_and_quits() {
    let mut h = Harness::new();
    h.press(KeyCode::Esc);
    h.press(KeyCode::Right);
    h.press(KeyCode::Enter);
    assert_eq!(h.app.route, Route::About);
    assert_eq!(h.app.focus, Focus::Content);

    h.press(KeyCode::Esc);
    h.press(KeyCode::Char('q'));
    assert!(h.app.should_quit);
}
