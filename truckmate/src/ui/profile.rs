use super::*;

pub(super) fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.profile;
    let chunks = Layout::vertical([
        Constraint::Length(7), // Account
        Constraint::Min(8),    // Change password
    ])
    .split(area);

    let username = app.auth().username().unwrap_or_default().to_string();
    let mut account = vec![label_value("Username", username)];
    match (&state.profile, &state.load_error) {
        (Some(profile), _) => {
            account.push(label_value("Email", profile.email.clone()));
            account.push(label_value("Member since", profile.registration_date.clone()));
        }
        (None, Some(error)) => account.push(error_line(error)),
        (None, None) => account.push(Line::from(Span::styled(
            app.pending_label().unwrap_or("Loading..."),
            Style::default().fg(Color::Yellow),
        ))),
    }
    frame.render_widget(boxed_text(account, report_block("Account")), chunks[0]);

    let cursor = state.cursor.index();
    let mut form = vec![
        field_line("Current password", &state.current_password, cursor == 0),
        field_line("New password", &state.new_password, cursor == 1),
        field_line("Confirm password", &state.confirm_password, cursor == 2),
        Line::raw(""),
    ];
    if let Some(error) = &state.form_error {
        for part in error.split("; ") {
            form.push(error_line(part));
        }
    }
    if let Some(success) = &state.success {
        form.push(success_line(success));
    }
    if state.editing_new_password() || state.form_error.is_some() {
        form.push(Line::raw(""));
        form.extend(requirement_lines(state.new_password.value()));
    }
    frame.render_widget(boxed_text(form, form_block("Change Password")), chunks[1]);
}
