//! UI rendering for the TUI.

mod admin;
mod assessment;
mod home;
mod info;
mod profile;
mod recommendation;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use truckmate_core::router::{NavItem, Route};
use truckmate_core::validation::check_password;

use crate::app::{App, Focus};
use crate::input::TextInput;

// ========== Palette ==========

/// Brand accent (nav bar, headers)
const ACCENT: Color = Color::Rgb(255, 140, 0);
/// Labels beside values
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Border color for form blocks
const BORDER_FORM: Color = Color::Rgb(0, 150, 150);
/// Border color for report blocks
const BORDER_REPORT: Color = Color::Rgb(80, 160, 80);
/// Inline error text
const ERROR_COLOR: Color = Color::Rgb(230, 80, 80);
/// Success / notice text
const SUCCESS_COLOR: Color = Color::Rgb(50, 205, 50);
/// Dim secondary text
const DIM: Color = Color::Rgb(128, 128, 128);

/// Priority bucket colors
const PRIORITY_LOW: Color = Color::Rgb(80, 180, 80);
const PRIORITY_MEDIUM: Color = Color::Rgb(230, 180, 0);
const PRIORITY_HIGH: Color = Color::Rgb(230, 80, 80);

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: nav bar, screen header, content, footer
    let chunks = Layout::vertical([
        Constraint::Length(3), // Nav bar
        Constraint::Length(2), // Screen header
        Constraint::Min(5),    // Content
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_nav_bar(frame, app, chunks[0]);
    render_header(frame, app.route.title(), chunks[1]);

    match app.route {
        Route::Root | Route::Home => home::render_home(frame, app, chunks[2]),
        Route::Confirmation => home::render_confirmation(frame, app, chunks[2]),
        Route::About => info::render_about(frame, chunks[2]),
        Route::Services => info::render_services(frame, app, chunks[2]),
        Route::Assessment => assessment::render_assessment(frame, app, chunks[2]),
        Route::Recommendation => recommendation::render_recommendation(frame, app, chunks[2]),
        Route::Profile => profile::render_profile(frame, app, chunks[2]),
        Route::Admin => admin::render_admin(frame, app, chunks[2]),
    }

    render_footer(frame, app, chunks[3]);
}

/// Render the navigation bar with the entries visible for this session.
fn render_nav_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Length(14), // App name
        Constraint::Min(1),     // Entries
        Constraint::Length(24), // Signed-in user
    ])
    .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if app.focus == Focus::Nav {
            ACCENT
        } else {
            DIM
        }));
    frame.render_widget(block, area);

    let inner = |r: Rect| Rect {
        x: r.x + 1,
        y: r.y + 1,
        width: r.width.saturating_sub(1),
        height: 1,
    };

    let app_name = Paragraph::new(" TruckMate").style(Style::default().fg(ACCENT).bold());
    frame.render_widget(app_name, inner(chunks[0]));

    let active_style = Style::default()
        .fg(ACCENT)
        .bold()
        .add_modifier(Modifier::UNDERLINED);
    let inactive_style = Style::default().fg(Color::Gray);

    let mut spans = Vec::new();
    for (idx, item) in app.nav_items().iter().enumerate() {
        let is_current = matches!(item, NavItem::Go(route) if *route == app.route);
        let mut style = if is_current {
            active_style
        } else {
            inactive_style
        };
        if app.focus == Focus::Nav && idx == app.nav_index {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!(" {} ", item.label()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner(chunks[1]));

    let who = match app.auth().username() {
        Some(name) if app.auth().is_admin() => format!("{name} (admin) "),
        Some(name) => format!("{name} "),
        None => "guest ".to_string(),
    };
    let user = Paragraph::new(who)
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Right);
    frame.render_widget(user, inner(chunks[2]));
}

/// Render a header with a title.
fn render_header(frame: &mut Frame, title: &str, area: Rect) {
    let header = Paragraph::new(format!(" {title}"))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

/// Render the footer: pending call, notice, or key hints.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(label) = app.pending_label() {
        let line = Line::from(Span::styled(
            format!(" {label}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    if let Some(notice) = &app.notice {
        let line = Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(SUCCESS_COLOR),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints: &[(&str, &str)] = match (app.focus, app.route) {
        (Focus::Nav, _) => &[
            ("←/→", "move"),
            ("Enter", "open"),
            ("↓", "screen"),
            ("q", "quit"),
        ],
        (_, Route::Root | Route::Home) if app.auth().is_authenticated() => {
            &[("Enter", "services"), ("Esc", "menu")]
        }
        (_, Route::Root | Route::Home) => &[
            ("Tab", "next field"),
            ("Enter", "submit"),
            ("Ctrl+T", "login/sign up"),
            ("Esc", "menu"),
        ],
        (_, Route::Confirmation) => &[("Enter", "verify"), ("Esc", "menu")],
        (_, Route::About) => &[("Esc", "menu")],
        (_, Route::Services) => &[("Tab", "switch service"), ("Enter", "go"), ("Esc", "menu")],
        (_, Route::Assessment) => &[
            ("j/k", "scroll"),
            ("s", "save image"),
            ("n", "new upload"),
            ("Esc", "menu"),
        ],
        (_, Route::Recommendation) => &[("Enter", "send"), ("↑/↓", "scroll"), ("Esc", "menu")],
        (_, Route::Profile) => &[
            ("Tab", "next field"),
            ("Enter", "change password"),
            ("Esc", "menu"),
        ],
        (_, Route::Admin) => &[
            ("p", "priority"),
            ("u", "urgency"),
            ("t", "date"),
            ("s", "sort"),
            ("o", "order"),
            ("r", "refresh"),
            ("Esc", "menu"),
        ],
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, action) in hints {
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {action}  ")));
    }
    spans.push(Span::styled("Ctrl+C", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" quit"));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ========== Shared Widgets ==========

/// A labelled form field; the focused one gets a caret.
fn field_line<'a>(label: &'a str, input: &TextInput, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(ACCENT).bold()
    } else {
        Style::default().fg(LABEL_COLOR)
    };
    let mut spans = vec![
        Span::styled(format!("{label:<18}"), label_style),
        Span::raw(input.display()),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(ACCENT)));
    }
    Line::from(spans)
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(ERROR_COLOR),
    ))
}

fn success_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(SUCCESS_COLOR),
    ))
}

/// Requirements panel: one line per password rule, met or not.
fn requirement_lines(password: &str) -> Vec<Line<'static>> {
    check_password(password)
        .requirements()
        .into_iter()
        .map(|(rule, met)| {
            let (mark, color) = if met {
                ("✓", SUCCESS_COLOR)
            } else {
                ("✗", ERROR_COLOR)
            };
            Line::from(vec![
                Span::styled(format!(" {mark} "), Style::default().fg(color)),
                Span::raw(rule.requirement()),
            ])
        })
        .collect()
}

fn label_value(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<18}"), Style::default().fg(LABEL_COLOR)),
        Span::raw(value),
    ])
}

fn form_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_FORM))
        .title(format!(" {title} "))
}

fn report_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_REPORT))
        .title(format!(" {title} "))
}

/// Wrapped paragraph inside a block.
fn boxed_text<'a>(lines: Vec<Line<'a>>, block: Block<'a>) -> Paragraph<'a> {
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false })
}

/// Rect of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Rows `lines` occupy once word-wrapped inside a bordered `area`.
fn wrapped_height(lines: &[Line<'_>], area: Rect) -> u16 {
    let rows = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(area.width.saturating_sub(2));
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Largest scroll offset that still leaves the bordered `area` full.
fn max_scroll(lines: &[Line<'_>], area: Rect) -> u16 {
    wrapped_height(lines, area).saturating_sub(area.height.saturating_sub(2))
}

#[cfg(test)]
fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}
