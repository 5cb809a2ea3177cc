use std::ffi::OsString;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::mpsc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

// ========== Fake shop backend ==========

type Reply = (StatusCode, Json<Value>);

fn user_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Token tok-")
        .map(str::to_string)
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid token."})),
    )
}

async fn login(Json(body): Json<Value>) -> Reply {
    let username = body["username"].as_str().unwrap_or_default();
    if body["password"] == "Abcd1234" {
        (StatusCode::OK, Json(json!({"token": format!("tok-{username}")})))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": ["Unable to log in with provided credentials."]})),
        )
    }
}

async fn user(headers: HeaderMap) -> Reply {
    match user_from(&headers) {
        Some(name) => (
            StatusCode::OK,
            Json(json!({
                "username": name,
                "is_superuser": false,
                "is_staff": name == "boss",
                "user_type": 1
            })),
        ),
        None => unauthorized(),
    }
}

async fn admin_dashboard(headers: HeaderMap) -> Reply {
    let days_ago = |d: i64| (Utc::now() - Duration::days(d)).to_rfc3339();
    match user_from(&headers).as_deref() {
        Some("boss") => (
            StatusCode::OK,
            Json(json!({
                "assessments": [
                    {"id": 11, "truck_id": "TRK-LOW", "assessment_date": days_ago(1),
                     "severity_score": "2.00", "estimated_repair_cost": "800.00",
                     "urgency_level": "low", "priority_score": "2.00"},
                    {"id": 12, "truck_id": "TRK-MID", "assessment_date": days_ago(10),
                     "severity_score": "5.00", "estimated_repair_cost": "5000.00",
                     "urgency_level": "medium", "priority_score": "5.00"},
                    {"id": 13, "truck_id": "TRK-HIGH", "assessment_date": days_ago(40),
                     "severity_score": "9.00", "estimated_repair_cost": "25000.00",
                     "urgency_level": "high", "priority_score": "8.00"}
                ],
                "total_assessments": 3,
                "high_priority_assessments": 1
            })),
        ),
        Some(_) => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "You do not have permission to access this page."})),
        ),
        None => unauthorized(),
    }
}

async fn chatbot(Json(body): Json<Value>) -> Reply {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    let mut history = body["chat_history"].as_array().cloned().unwrap_or_default();
    let turn = history.len() / 2 + 1;
    history.push(json!({"role": "human", "content": message}));
    history.push(json!({"role": "assistant", "content": format!("Reply {turn}: {message}")}));
    (StatusCode::OK, Json(json!({"chat_history": history})))
}

fn fake_shop() -> Router {
    Router::new()
        .route("/api/login/", post(login))
        .route("/api/user/", get(user))
        .route("/api/admin-dashboard/", get(admin_dashboard))
        .route("/api/chatbot/", post(chatbot))
}

fn spawn_shop() -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, fake_shop()).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

// ========== Harness ==========

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    base_url: String,
}

impl CliTestEnv {
    fn new() -> Self {
        Self::with_base_url(spawn_shop())
    }

    fn with_base_url(base_url: String) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
            base_url,
        }
    }

    fn token_path(&self) -> PathBuf {
        self.xdg_data.join("truckmate/token")
    }

    fn chat_history_path(&self) -> PathBuf {
        self.xdg_data.join("truckmate/chat_history.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("truckmate-cli"));
        Command::new(bin_path)
            .args(args)
            .env("HOME", &self.home)
            .env("XDG_DATA_HOME", &self.xdg_data)
            .env("XDG_CONFIG_HOME", &self.xdg_config)
            .env("XDG_STATE_HOME", &self.xdg_state)
            .env("TRUCKMATE_API_BASE_URL", &self.base_url)
            .output()
            .unwrap_or_else(|e| panic!("failed to execute truckmate-cli: {e}"))
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_success(args, &output);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "truckmate-cli {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

// ========== Tests ==========

#[test]
fn status_reports_anonymous_session() {
    let env = CliTestEnv::new();

    let stdout = env.run_ok(&["status"]);
    assert!(stdout.contains(&format!("Backend: {}", env.base_url)));
    assert!(stdout.contains("Session: not logged in"), "got:\n{stdout}");
}

#[test]
fn whoami_fails_when_anonymous() {
    let env = CliTestEnv::new();

    let output = env.run(&["whoami"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not logged in"), "got:\n{stderr}");
}

#[test]
fn login_persists_token_and_whoami_reads_it() {
    let env = CliTestEnv::new();

    let stdout = env.run_ok(&["login", "-u", "driver", "-p", "Abcd1234"]);
    assert!(stdout.contains("Logged in as driver"));
    assert!(stdout.contains("Landing page: /home"), "got:\n{stdout}");

    let token = fs::read_to_string(env.token_path()).expect("token file");
    assert_eq!(token.trim(), "tok-driver");

    assert_eq!(env.run_ok(&["whoami"]).trim(), "driver");

    env.run_ok(&["logout"]);
    assert!(!env.token_path().exists());
    assert!(!env.run(&["whoami"]).status.success());
}

#[test]
fn login_with_bad_password_exits_non_zero() {
    let env = CliTestEnv::new();

    let output = env.run(&["login", "-u", "driver", "-p", "wrong"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid username or password."),
        "got:\n{stderr}"
    );
    assert!(!env.token_path().exists());
}

#[test]
fn stale_token_is_cleared_on_status() {
    let env = CliTestEnv::new();
    fs::create_dir_all(env.token_path().parent().unwrap()).unwrap();
    fs::write(env.token_path(), "garbage").unwrap();

    let stdout = env.run_ok(&["status"]);
    assert!(stdout.contains("Session: not logged in"));
    assert!(!env.token_path().exists());
}

#[test]
fn admin_dashboard_filters_and_sorts() {
    let env = CliTestEnv::new();
    let stdout = env.run_ok(&["login", "-u", "boss", "-p", "Abcd1234"]);
    assert!(stdout.contains("Logged in as boss (admin)"));
    assert!(stdout.contains("Landing page: /admin"));

    let stdout = env.run_ok(&["dashboard"]);
    assert!(stdout.contains("Total assessments: 3"));
    assert!(stdout.contains("Low: 1  Medium: 1  High: 1"), "got:\n{stdout}");
    // Newest first by default
    let low = stdout.find("TRK-LOW").unwrap();
    let high = stdout.find("TRK-HIGH").unwrap();
    assert!(low < high);

    let stdout = env.run_ok(&["dashboard", "--sort", "priority", "--asc"]);
    let low = stdout.find("TRK-LOW").unwrap();
    let mid = stdout.find("TRK-MID").unwrap();
    let high = stdout.find("TRK-HIGH").unwrap();
    assert!(low < mid && mid < high);

    let stdout = env.run_ok(&["dashboard", "--within", "month"]);
    assert!(stdout.contains("Showing 2 of 3"));
    assert!(!stdout.contains("TRK-HIGH"));

    let stdout = env.run_ok(&["dashboard", "--priority", "high", "--urgency", "high"]);
    assert!(stdout.contains("Showing 1 of 3"));
    assert!(stdout.contains("Low: 0  Medium: 0  High: 1"));

    let output = env.run(&["dashboard", "--within", "fortnight"]);
    assert!(!output.status.success());
}

#[test]
fn dashboard_requires_admin() {
    let env = CliTestEnv::new();
    env.run_ok(&["login", "-u", "driver", "-p", "Abcd1234"]);

    let output = env.run(&["dashboard"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Admin access required."), "got:\n{stderr}");
}

#[test]
fn chat_keeps_history_between_runs() {
    let env = CliTestEnv::new();

    let stdout = env.run_ok(&["chat", "brakes squeal"]);
    assert!(stdout.contains("Reply 1: brakes squeal"));

    let stdout = env.run_ok(&["chat", "and now?"]);
    assert!(stdout.contains("Reply 2: and now?"));

    let saved: Value =
        serde_json::from_str(&fs::read_to_string(env.chat_history_path()).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 4);

    let stdout = env.run_ok(&["chat", "--reset", "start over"]);
    assert!(stdout.contains("Reply 1: start over"));
}

#[test]
fn weak_signup_password_is_rejected_locally() {
    // Nothing listens here; validation must fail before any request.
    let env = CliTestEnv::with_base_url("http://127.0.0.1:1".to_string());

    let output = env.run(&[
        "register", "-u", "newbie", "-e", "newbie@example.com", "-p", "abcd1234",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Unable to reach the server"), "got:\n{stderr}");
    assert!(
        stderr.contains("Password does not meet requirements: Contains uppercase letters"),
        "got:\n{stderr}"
    );
    assert!(!stderr.contains("validation failed"), "got:\n{stderr}");
}

#[test]
fn unreachable_backend_reports_network_error() {
    let env = CliTestEnv::with_base_url("http://127.0.0.1:1".to_string());

    let output = env.run(&["chat", "hello"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unable to reach the server. Please try again."),
        "got:\n{stderr}"
    );
}
