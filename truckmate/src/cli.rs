//! truckmate-cli - scriptable access to the TruckMate backend
//!
//! Every subcommand shares the TUI's token file, so `truckmate-cli login`
//! followed by `truckmate` starts the TUI signed in.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Token: $XDG_DATA_HOME/truckmate/token (~/.local/share/truckmate/token)
//! - Chat history: $XDG_DATA_HOME/truckmate/chat_history.json
//! - Logs: $XDG_STATE_HOME/truckmate/truckmate-cli.log
//! - Config: $XDG_CONFIG_HOME/truckmate/config.toml

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use truckmate_core::api::{create_backend, Backend};
use truckmate_core::dashboard::{
    parse_filter, DashboardQuery, DashboardView, PriorityCategory, SortOrder,
};
use truckmate_core::format::{
    assessment_sections, format_currency, format_date, format_priority_explanation,
    format_score, format_urgency, AssessmentSection,
};
use truckmate_core::logging::{self, LogTarget};
use truckmate_core::session::{AuthState, SessionContext, TokenStore};
use truckmate_core::validation::{
    validate_otp, validate_password_change, validate_signup, PasswordChangeForm, SignupForm,
};
use truckmate_core::{
    ChatMessage, ChatRole, Config, Credentials, Error, ImageUpload, Registration,
};

#[derive(Parser)]
#[command(name = "truckmate-cli")]
#[command(about = "Command-line client for the TruckMate repair shop")]
#[command(version)]
struct Args {
    /// Verbose output (backend URL and file locations on stderr)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the backend, token file and who is signed in
    Status,

    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Print the signed-in username
    Whoami,

    /// Create an account (an OTP is emailed for `verify`)
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Defaults to --password
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Confirm an email address with the emailed OTP
    Verify { otp: String },

    /// Show the account profile
    Profile,

    /// Change the account password
    ChangePassword {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,

        /// Defaults to --new
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Admin dashboard: filtered, sorted assessments and priority buckets
    Dashboard {
        /// all, low, medium, high
        #[arg(long, default_value = "all")]
        priority: String,

        /// all, low, medium, high
        #[arg(long, default_value = "all")]
        urgency: String,

        /// all, week, month
        #[arg(long, default_value = "all")]
        within: String,

        /// date, priority
        #[arg(long, default_value = "date")]
        sort: String,

        /// Ascending order (default descending)
        #[arg(long)]
        asc: bool,
    },

    /// Upload a truck photo for damage assessment
    Assess {
        image: PathBuf,

        /// Write the annotated image here
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// Ask the repair recommendation assistant
    Chat {
        message: String,

        /// Start a new conversation
        #[arg(long)]
        reset: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard = logging::init(&config.logging, LogTarget::Cli)
        .context("failed to initialize logging")?;

    if args.verbose {
        eprintln!("Backend: {}", config.api.base_url);
        eprintln!("Token file: {}", config.token_path().display());
        eprintln!("Log file: {}", LogTarget::Cli.path().display());
    }

    let backend = create_backend(&config.api).context("failed to create API client")?;
    let mut session = SessionContext::new(TokenStore::new(config.token_path()));

    match args.command {
        Command::Status => cmd_status(&config, backend.as_ref(), &mut session),
        Command::Login { username, password } => {
            cmd_login(backend.as_ref(), &mut session, username, password)
        }
        Command::Logout => cmd_logout(&mut session),
        Command::Whoami => cmd_whoami(backend.as_ref(), &mut session),
        Command::Register {
            username,
            email,
            password,
            confirm,
        } => {
            let form = SignupForm {
                username,
                email,
                confirm_password: confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            cmd_register(backend.as_ref(), form)
        }
        Command::Verify { otp } => cmd_verify(backend.as_ref(), &otp),
        Command::Profile => cmd_profile(backend.as_ref(), &mut session),
        Command::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let form = PasswordChangeForm {
                current_password: current,
                confirm_password: confirm.unwrap_or_else(|| new.clone()),
                new_password: new,
            };
            cmd_change_password(backend.as_ref(), &mut session, form)
        }
        Command::Dashboard {
            priority,
            urgency,
            within,
            sort,
            asc,
        } => {
            let query = DashboardQuery {
                priority: parse_filter(&priority).map_err(anyhow::Error::msg)?,
                urgency: parse_filter(&urgency).map_err(anyhow::Error::msg)?,
                window: within.parse().map_err(anyhow::Error::msg)?,
                sort_by: sort.parse().map_err(anyhow::Error::msg)?,
                order: if asc { SortOrder::Asc } else { SortOrder::Desc },
            };
            cmd_dashboard(backend.as_ref(), &mut session, &query)
        }
        Command::Assess { image, save_image } => {
            cmd_assess(backend.as_ref(), &image, save_image.as_deref())
        }
        Command::Chat { message, reset } => cmd_chat(backend.as_ref(), &message, reset),
    }
}

/// Turn a backend failure into the message a user sees.
fn inline(err: Error) -> anyhow::Error {
    let message = match err {
        Error::Api { message, .. } => message,
        Error::Network(_) => "Unable to reach the server. Please try again.".to_string(),
        Error::NotAuthenticated => "Not logged in. Run `truckmate-cli login` first.".to_string(),
        Error::Validation(errors) => errors.to_string(),
        other => other.to_string(),
    };
    anyhow::anyhow!(message)
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .with_context(|| format!("failed to read {label}"))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("invalid progress template")?,
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Validate any saved token; anonymous when there is none.
fn restore(backend: &dyn Backend, session: &mut SessionContext) -> Result<AuthState> {
    let state = session
        .restore(backend)
        .context("failed to read session token")?;
    Ok(state.clone())
}

fn cmd_status(config: &Config, backend: &dyn Backend, session: &mut SessionContext) -> Result<()> {
    println!("Backend: {}", config.api.base_url);
    println!("Token file: {}", session.store().path().display());

    match restore(backend, session)? {
        AuthState::Anonymous => println!("Session: not logged in"),
        AuthState::Authenticated { username, is_admin } => {
            let role = if is_admin { " (admin)" } else { "" };
            println!("Session: logged in as {username}{role}");
        }
    }
    Ok(())
}

fn cmd_login(
    backend: &dyn Backend,
    session: &mut SessionContext,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };
    if username.trim().is_empty() || password.is_empty() {
        anyhow::bail!("Please enter both username and password.");
    }

    let credentials = Credentials { username, password };
    let landing = session.login(backend, &credentials).map_err(|e| match e {
        Error::Network(_) => inline(e),
        _ => anyhow::anyhow!("Invalid username or password."),
    })?;

    let state = session.state();
    println!(
        "Logged in as {}{}",
        state.username().unwrap_or_default(),
        if state.is_admin() { " (admin)" } else { "" }
    );
    println!("Landing page: {}", landing.path());
    Ok(())
}

fn cmd_logout(session: &mut SessionContext) -> Result<()> {
    session.logout().context("failed to clear session token")?;
    println!("Logged out.");
    Ok(())
}

fn cmd_whoami(backend: &dyn Backend, session: &mut SessionContext) -> Result<()> {
    match restore(backend, session)? {
        AuthState::Anonymous => Err(inline(Error::NotAuthenticated)),
        AuthState::Authenticated { username, is_admin } => {
            if is_admin {
                println!("{username} (admin)");
            } else {
                println!("{username}");
            }
            Ok(())
        }
    }
}

fn cmd_register(backend: &dyn Backend, form: SignupForm) -> Result<()> {
    validate_signup(&form).map_err(|e| inline(e.into()))?;

    let registration = Registration {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password,
    };
    let message = backend.register(&registration).map_err(inline)?;
    println!("{message}");
    println!("Check your email, then run `truckmate-cli verify <otp>`.");
    Ok(())
}

fn cmd_verify(backend: &dyn Backend, otp: &str) -> Result<()> {
    validate_otp(otp).map_err(|e| inline(e.into()))?;
    let message = backend.verify_otp(otp.trim()).map_err(inline)?;
    println!("{message} You can now log in.");
    Ok(())
}

fn cmd_profile(backend: &dyn Backend, session: &mut SessionContext) -> Result<()> {
    let state = restore(backend, session)?;
    let token = session.require_token().map_err(inline)?;
    let profile = backend.user_profile(token).map_err(inline)?;

    println!("Username:     {}", state.username().unwrap_or_default());
    println!("Email:        {}", profile.email);
    println!("Member since: {}", profile.registration_date);
    Ok(())
}

fn cmd_change_password(
    backend: &dyn Backend,
    session: &mut SessionContext,
    form: PasswordChangeForm,
) -> Result<()> {
    validate_password_change(&form).map_err(|e| inline(e.into()))?;

    restore(backend, session)?;
    let token = session.require_token().map_err(inline)?;
    backend
        .change_password(token, &form.current_password, &form.new_password)
        .map_err(inline)?;
    println!("Password changed successfully.");
    Ok(())
}

fn cmd_dashboard(
    backend: &dyn Backend,
    session: &mut SessionContext,
    query: &DashboardQuery,
) -> Result<()> {
    let state = restore(backend, session)?;
    if !state.is_admin() {
        anyhow::bail!("Admin access required.");
    }
    let token = session.require_token().map_err(inline)?;
    let feed = backend.admin_dashboard(token).map_err(inline)?;
    let view = DashboardView::compute(&feed, query, Utc::now());

    println!("Total assessments: {}", view.total_assessments);
    println!("High priority:     {}", view.high_priority_assessments);
    println!(
        "Filters: {} | {} | {} | {} {}",
        query.priority_label(),
        query.urgency_label(),
        query.window.label(),
        query.sort_by.label(),
        query.order.arrow()
    );
    println!();

    println!(
        "{:<6} {:<14} {:<11} {:>9} {:>14} {:<8} {:>9}",
        "ID", "Truck", "Date", "Severity", "Est. Cost", "Urgency", "Priority"
    );
    for record in &view.rows {
        println!(
            "{:<6} {:<14} {:<11} {:>9} {:>14} {:<8} {:>9}",
            record.id,
            record.truck_id,
            format_date(record.assessment_date),
            format_score(record.severity_score),
            format_currency(record.estimated_repair_cost),
            format_urgency(record.urgency_level),
            format_score(record.priority_score),
        );
    }
    println!();

    let buckets: Vec<String> = PriorityCategory::ALL
        .iter()
        .map(|c| format!("{}: {}", c.display_name(), view.counts.get(*c)))
        .collect();
    println!("Showing {} of {}", view.rows.len(), feed.assessments.len());
    println!("{}", buckets.join("  "));
    Ok(())
}

fn cmd_assess(backend: &dyn Backend, image: &Path, save_image: Option<&Path>) -> Result<()> {
    let upload = ImageUpload::from_path(image)
        .with_context(|| format!("failed to read {}", image.display()))?;

    let pb = spinner("Analyzing image...")?;
    let result = backend.assess_damage(&upload);
    pb.finish_and_clear();
    let assessment = result.map_err(|e| {
        let err = inline(e);
        anyhow::anyhow!("Error processing image: {err}")
    })?;

    println!("Detected damages:");
    if assessment.damages.is_empty() {
        println!("  none");
    }
    for damage in &assessment.damages {
        println!(
            "  - {} (confidence {})",
            damage.area.replace('_', " "),
            damage.confidence
        );
    }
    println!();

    for section in assessment_sections(&assessment.assessment) {
        match section {
            AssessmentSection::Prose(text) => println!("{text}"),
            AssessmentSection::Damage { title, items } => {
                println!("{title}");
                for item in items {
                    println!("  - {item}");
                }
            }
        }
        println!();
    }

    println!("Severity score:        {}", assessment.severity_score);
    println!("Estimated repair cost: {}", assessment.estimated_repair_cost);
    println!("Urgency level:         {}", assessment.urgency_level);
    println!("Priority score:        {}", assessment.priority_score);
    if !assessment.priority_explanation.is_empty() {
        println!();
        println!(
            "{}",
            format_priority_explanation(&assessment.priority_explanation)
        );
    }

    if let Some(path) = save_image {
        assessment
            .save_image(path)
            .with_context(|| format!("failed to save image to {}", path.display()))?;
        println!();
        println!("Annotated image saved to {}", path.display());
    }
    Ok(())
}

fn load_history(path: &Path) -> Result<Vec<ChatMessage>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn save_history(path: &Path, history: &[ChatMessage]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(history)?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn cmd_chat(backend: &dyn Backend, message: &str, reset: bool) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message must not be empty.");
    }

    let path = Config::chat_history_path();
    let history = if reset { Vec::new() } else { load_history(&path)? };

    let pb = spinner("Thinking...")?;
    let result = backend.chat(message.trim(), &history);
    pb.finish_and_clear();
    let history = result.map_err(inline)?;

    save_history(&path, &history)?;

    match history
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::Assistant)
    {
        Some(reply) => println!("{}", reply.content),
        None => println!("(no reply)"),
    }
    Ok(())
}
