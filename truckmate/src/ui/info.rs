use crate::app::ServiceCard;

use super::*;

pub(super) fn render_about(frame: &mut Frame, area: Rect) {
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(ACCENT).bold()))
    };
    let lines = vec![
        heading("Who we are"),
        Line::raw("TruckMate is a repair shop for heavy and light trucks. We combine"),
        Line::raw("experienced mechanics with AI-assisted damage assessment so fleet"),
        Line::raw("owners know what a repair involves before the truck arrives."),
        Line::raw(""),
        heading("What we do"),
        Line::raw("• Body and collision repair"),
        Line::raw("• Engine, brake and suspension servicing"),
        Line::raw("• Preventive maintenance plans for fleets"),
        Line::raw("• Photo-based damage assessment with repair cost estimates"),
        Line::raw(""),
        heading("How assessments work"),
        Line::raw("Upload a photo on the Services screen. The damage model marks every"),
        Line::raw("damaged area, scores its severity and estimates the repair cost. A"),
        Line::raw("priority score combines severity, cost and urgency so the most"),
        Line::raw("pressing jobs reach the workshop first."),
    ];
    frame.render_widget(boxed_text(lines, report_block("About Us")), area);
}

pub(super) fn render_services(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(10), // Assessment card
        Constraint::Length(6),  // Recommendation card
        Constraint::Min(0),
    ])
    .split(area);

    let state = &app.services;
    let selected = state.selected;

    let card_block = |title: &'static str, active: bool| {
        let block = if active {
            form_block(title).border_style(Style::default().fg(ACCENT))
        } else {
            form_block(title)
        };
        block.title_bottom(if active { " selected " } else { "" })
    };

    let mut assessment = vec![
        Line::raw("Upload a clear photo of the damaged area to get detected damages,"),
        Line::raw("a severity score, a repair cost estimate and a priority rating."),
        Line::raw(""),
        field_line(
            "Image path",
            &state.image_path,
            selected == ServiceCard::Assessment,
        ),
    ];
    if let Some(error) = &state.error {
        assessment.push(Line::raw(""));
        assessment.push(error_line(error));
    }
    frame.render_widget(
        boxed_text(
            assessment,
            card_block("Damage Assessment", selected == ServiceCard::Assessment),
        ),
        chunks[0],
    );

    let recommendation = vec![
        Line::raw("Describe a symptom or ask about maintenance and our assistant will"),
        Line::raw("suggest what to check and what to repair."),
        Line::raw(""),
        Line::from(Span::styled(
            "Press Enter to start a conversation",
            Style::default().fg(DIM),
        )),
    ];
    frame.render_widget(
        boxed_text(
            recommendation,
            card_block("Repair Recommendation", selected == ServiceCard::Recommendation),
        ),
        chunks[1],
    );
}
