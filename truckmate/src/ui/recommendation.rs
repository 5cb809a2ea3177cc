use truckmate_core::ChatRole;

use super::*;

pub(super) fn render_recommendation(frame: &mut Frame, app: &mut App, area: Rect) {
    let pending = app.pending_label();
    let state = &mut app.recommendation;
    let chunks = Layout::vertical([
        Constraint::Min(5),    // Conversation
        Constraint::Length(3), // Input
    ])
    .split(area);

    let mut lines: Vec<Line> = Vec::new();
    if state.history.is_empty() && state.outgoing.is_none() {
        lines.push(Line::from(Span::styled(
            "Ask about a noise, a warning light or a maintenance schedule.",
            Style::default().fg(DIM),
        )));
    }
    for message in &state.history {
        let (who, color) = match message.role {
            ChatRole::User => ("You", LABEL_COLOR),
            ChatRole::Assistant => ("TruckMate", ACCENT),
        };
        lines.push(Line::from(Span::styled(
            format!("{who}:"),
            Style::default().fg(color).bold(),
        )));
        for text in message.content.lines() {
            lines.push(Line::raw(format!("  {text}")));
        }
        lines.push(Line::raw(""));
    }
    if let Some(outgoing) = &state.outgoing {
        lines.push(Line::from(Span::styled(
            "You:",
            Style::default().fg(LABEL_COLOR).bold(),
        )));
        lines.push(Line::raw(format!("  {outgoing}")));
        lines.push(Line::raw(""));
        if let Some(label) = pending {
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )));
        }
    }
    if let Some(error) = &state.error {
        lines.push(error_line(error));
    }

    // Keep the newest turn in view unless the user scrolled back.
    // Long replies wrap, so count rendered rows rather than lines.
    let bottom = max_scroll(&lines, chunks[0]);
    state.scroll_back = state.scroll_back.min(bottom);
    let offset = bottom - state.scroll_back;

    let conversation = Paragraph::new(lines)
        .block(report_block("Repair Recommendation"))
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(conversation, chunks[0]);

    let input = Paragraph::new(field_line("Message", &state.input, true)).block(form_block("Ask"));
    frame.render_widget(input, chunks[1]);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};
    use truckmate_core::router::Route;
    use truckmate_core::ChatMessage;

    use super::*;
    use crate::app::tests::Harness;

    fn long_reply_harness() -> Harness {
        let mut h = Harness::new();
        h.app.navigate(Route::Recommendation);
        h.app.recommendation.history = vec![
            ChatMessage::user("brakes?"),
            ChatMessage::assistant(format!("{}ENDMARK", "word ".repeat(120))),
        ];
        h
    }

    fn draw(h: &mut Harness) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal
            .draw(|frame| render_recommendation(frame, &mut h.app, frame.area()))
            .unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn wrapped_reply_ends_in_view() {
        let mut h = long_reply_harness();
        let screen = draw(&mut h);
        assert!(screen.contains("ENDMARK"), "{screen}");
    }

    #[test]
    fn scroll_back_stops_at_first_line() {
        let mut h = long_reply_harness();
        h.app.recommendation.scroll_back = 500;
        let screen = draw(&mut h);

        assert!(h.app.recommendation.scroll_back < 500);
        assert!(screen.contains("You:"), "{screen}");
        assert!(!screen.contains("ENDMARK"));

        // One step down from the top moves the view immediately
        h.press(crossterm::event::KeyCode::Down);
        let screen = draw(&mut h);
        assert!(!screen.contains("You:"), "{screen}");
    }
}
