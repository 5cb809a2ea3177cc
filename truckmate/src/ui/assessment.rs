use truckmate_core::format::{
    assessment_sections, format_priority_explanation, AssessmentSection, PRIORITY_SCALE,
    SEVERITY_SCALE,
};

use super::*;

pub(super) fn render_assessment(frame: &mut Frame, app: &mut App, area: Rect) {
    let pending = app.pending_label();
    let state = &mut app.assessment;

    let Some(result) = &state.result else {
        let mut lines = vec![Line::raw("")];
        match (&state.error, pending) {
            (Some(error), _) => lines.push(error_line(error)),
            (None, Some(label)) => lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(Color::Yellow),
            ))),
            (None, None) => lines.push(Line::raw("No assessment yet.")),
        }
        if let Some(upload) = &state.upload {
            lines.push(Line::raw(""));
            lines.push(label_value("Image", upload.file_name.clone()));
        }
        frame.render_widget(boxed_text(lines, report_block("Damage Assessment")), area);
        return;
    };

    let chunks = Layout::horizontal([
        Constraint::Percentage(62), // Report
        Constraint::Percentage(38), // Summary + scales
    ])
    .split(area);

    // === Report ===
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        "Detected Damages",
        Style::default().fg(ACCENT).bold(),
    )));
    if result.damages.is_empty() {
        lines.push(Line::from(Span::styled(
            "No damage detected.",
            Style::default().fg(DIM),
        )));
    }
    for damage in &result.damages {
        lines.push(Line::from(vec![
            Span::raw("• "),
            Span::raw(damage.area.replace('_', " ")),
            Span::styled(
                format!("  (confidence {})", damage.confidence),
                Style::default().fg(DIM),
            ),
        ]));
    }
    lines.push(Line::raw(""));

    lines.push(Line::from(Span::styled(
        "Assessment",
        Style::default().fg(ACCENT).bold(),
    )));
    for section in assessment_sections(&result.assessment) {
        match section {
            AssessmentSection::Prose(text) => {
                lines.push(Line::raw(text));
            }
            AssessmentSection::Damage { title, items } => {
                lines.push(Line::from(Span::styled(
                    title,
                    Style::default().fg(LABEL_COLOR).bold(),
                )));
                for item in items {
                    lines.push(Line::raw(format!("  - {item}")));
                }
            }
        }
        lines.push(Line::raw(""));
    }

    if !result.priority_explanation.is_empty() {
        lines.push(Line::from(Span::styled(
            "Priority Explanation",
            Style::default().fg(ACCENT).bold(),
        )));
        for line in format_priority_explanation(&result.priority_explanation).lines() {
            lines.push(Line::raw(line.to_string()));
        }
    }

    // j/PageDown stop once the last line reaches the bottom border
    state.scroll = state.scroll.min(max_scroll(&lines, chunks[0]));
    let report = Paragraph::new(lines)
        .block(report_block("Report"))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    frame.render_widget(report, chunks[0]);

    // === Summary ===
    let side = Layout::vertical([
        Constraint::Length(8), // Summary
        Constraint::Min(4),    // Scales
    ])
    .split(chunks[1]);

    let mut summary = vec![
        label_value("Severity", result.severity_score.clone()),
        label_value("Repair cost", result.estimated_repair_cost.clone()),
        label_value("Urgency", result.urgency_level.clone()),
        label_value("Priority", result.priority_score.clone()),
    ];
    if let Some(path) = &state.saved_to {
        summary.push(Line::raw(""));
        summary.push(success_line(&format!("Saved: {}", path.display())));
    } else if let Some(error) = &state.error {
        summary.push(Line::raw(""));
        summary.push(error_line(error));
    }
    frame.render_widget(boxed_text(summary, form_block("Summary")), side[0]);

    let mut scales = vec![Line::from(Span::styled(
        "Severity score",
        Style::default().fg(LABEL_COLOR).bold(),
    ))];
    for (range, meaning) in SEVERITY_SCALE {
        scales.push(Line::raw(format!("  {range:<5} {meaning}")));
    }
    scales.push(Line::raw(""));
    scales.push(Line::from(Span::styled(
        "Priority score",
        Style::default().fg(LABEL_COLOR).bold(),
    )));
    for ((range, meaning), color) in PRIORITY_SCALE
        .iter()
        .zip([PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH])
    {
        scales.push(Line::from(vec![
            Span::styled("  ■ ", Style::default().fg(color)),
            Span::raw(format!("{range:<5} {meaning}")),
        ]));
    }
    frame.render_widget(boxed_text(scales, form_block("Scales")), side[1]);
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};
    use truckmate_core::router::Route;

    use super::*;
    use crate::app::tests::Harness;

    #[test]
    fn report_scroll_is_clamped_to_content() {
        let image = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        std::fs::write(image.path(), b"jpeg bytes").unwrap();

        let mut h = Harness::new();
        h.app.navigate(Route::Services);
        h.type_text(image.path().to_str().unwrap());
        h.press(KeyCode::Enter);
        h.app.run_pending();
        assert!(h.app.assessment.result.is_some());

        for _ in 0..20 {
            h.press(KeyCode::PageDown);
        }
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        terminal
            .draw(|frame| render_assessment(frame, &mut h.app, frame.area()))
            .unwrap();

        let scroll = h.app.assessment.scroll;
        assert!(scroll > 0 && scroll < 20, "scroll = {scroll}");
        let screen = buffer_text(&terminal);
        assert!(screen.contains("medium priority"), "{screen}");

        // Scrolling up takes effect on the first key press
        h.press(KeyCode::Up);
        assert_eq!(h.app.assessment.scroll, scroll - 1);
    }
}
