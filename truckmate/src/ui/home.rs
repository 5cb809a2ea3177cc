use truckmate_core::router::{home_view, HomeView};

use crate::app::AuthMode;

use super::*;

pub(super) fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    match home_view(app.auth()) {
        HomeView::Welcome { username } => render_welcome(frame, &username, area),
        HomeView::Guest => render_guest(frame, app, area),
    }
}

fn render_welcome(frame: &mut Frame, username: &str, area: Rect) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            format!("Welcome back, {username}!"),
            Style::default().fg(ACCENT).bold(),
        )),
        Line::raw(""),
        Line::raw("Upload a photo of your truck to get an instant damage assessment,"),
        Line::raw("repair cost estimate and priority rating, or ask our assistant"),
        Line::raw("for maintenance recommendations."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Get started with an assessment"),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(report_block("TruckMate"));
    frame.render_widget(paragraph, centered(area, 76, 12));
}

fn render_guest(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Percentage(45), // Banner
        Constraint::Percentage(55), // Form
    ])
    .split(area);

    let banner = vec![
        Line::raw(""),
        Line::from(Span::styled(
            "Keep your fleet on the road",
            Style::default().fg(ACCENT).bold(),
        )),
        Line::raw(""),
        Line::raw("AI-powered damage assessment for trucks."),
        Line::raw("Snap a photo, get a repair estimate and know"),
        Line::raw("which job needs the workshop first."),
        Line::raw(""),
        Line::from(Span::styled(
            "Log in or create an account to begin.",
            Style::default().fg(DIM),
        )),
    ];
    frame.render_widget(boxed_text(banner, report_block("TruckMate")), chunks[0]);

    let home = &app.home;
    let cursor = home.cursor.index();
    let mut lines = vec![Line::raw("")];
    let title = match home.mode {
        AuthMode::Login => {
            lines.push(field_line("Username", &home.login_username, cursor == 0));
            lines.push(field_line("Password", &home.login_password, cursor == 1));
            "Login"
        }
        AuthMode::Signup => {
            lines.push(field_line("Username", &home.signup_username, cursor == 0));
            lines.push(field_line("Email", &home.signup_email, cursor == 1));
            lines.push(field_line("Password", &home.signup_password, cursor == 2));
            lines.push(field_line("Confirm password", &home.signup_confirm, cursor == 3));
            "Sign Up"
        }
    };

    lines.push(Line::raw(""));
    if let Some(error) = &home.error {
        for part in error.split("; ") {
            lines.push(error_line(part));
        }
        lines.push(Line::raw(""));
    }

    if home.show_requirements || home.editing_signup_password() {
        lines.push(Line::from(Span::styled(
            "Password requirements",
            Style::default().fg(LABEL_COLOR).bold(),
        )));
        lines.extend(requirement_lines(home.signup_password.value()));
        lines.push(Line::raw(""));
    }

    let switch_hint = match home.mode {
        AuthMode::Login => "Don't have an account? Ctrl+T to sign up",
        AuthMode::Signup => "Already have an account? Ctrl+T to log in",
    };
    lines.push(Line::from(Span::styled(switch_hint, Style::default().fg(DIM))));

    frame.render_widget(boxed_text(lines, form_block(title)), chunks[1]);
}

pub(super) fn render_confirmation(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.confirmation;
    let mut lines = vec![Line::raw("")];
    if let Some(message) = &state.message {
        lines.push(success_line(message));
        lines.push(Line::raw(""));
    }
    lines.push(Line::raw(
        "Enter the one-time code we sent to your email address.",
    ));
    lines.push(Line::raw(""));
    lines.push(field_line("OTP", &state.otp, true));
    lines.push(Line::raw(""));
    if let Some(error) = &state.error {
        lines.push(error_line(error));
    }

    frame.render_widget(
        boxed_text(lines, form_block("Email Confirmation")),
        centered(area, 70, 12),
    );
}
