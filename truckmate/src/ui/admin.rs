use chrono::Utc;
use ratatui::widgets::{Bar, BarChart, BarGroup, Cell, Row, Table};
use truckmate_core::dashboard::{DashboardView, PriorityCategory};
use truckmate_core::format::{format_currency, format_date, format_score, format_urgency};

use crate::app::AdminState;

use super::*;

fn priority_color(category: PriorityCategory) -> Color {
    match category {
        PriorityCategory::Low => PRIORITY_LOW,
        PriorityCategory::Medium => PRIORITY_MEDIUM,
        PriorityCategory::High => PRIORITY_HIGH,
    }
}

pub(super) fn render_admin(frame: &mut Frame, app: &mut App, area: Rect) {
    let pending = app.pending_label();
    let AdminState {
        feed,
        query,
        table_state,
        error,
    } = &mut app.admin;

    let Some(feed) = feed.as_ref() else {
        let line = match (error.as_deref(), pending) {
            (Some(error), _) => error_line(error),
            (None, Some(label)) => {
                Line::from(Span::styled(label, Style::default().fg(Color::Yellow)))
            }
            (None, None) => Line::raw("No data loaded. Press r to fetch the dashboard."),
        };
        frame.render_widget(boxed_text(vec![line], report_block("Dashboard")), area);
        return;
    };

    let view = DashboardView::compute(feed, query, Utc::now());

    let chunks = Layout::vertical([
        Constraint::Length(4),  // Totals + controls
        Constraint::Length(10), // Chart
        Constraint::Min(5),     // Table
    ])
    .split(area);

    // === Totals and controls ===
    let mut summary = vec![
        Line::from(vec![
            Span::styled("Total assessments ", Style::default().fg(LABEL_COLOR)),
            Span::styled(
                view.total_assessments.to_string(),
                Style::default().fg(Color::White).bold(),
            ),
            Span::raw("    "),
            Span::styled("High priority ", Style::default().fg(LABEL_COLOR)),
            Span::styled(
                view.high_priority_assessments.to_string(),
                Style::default().fg(PRIORITY_HIGH).bold(),
            ),
            Span::raw("    "),
            Span::styled("Showing ", Style::default().fg(LABEL_COLOR)),
            Span::raw(format!("{}/{}", view.rows.len(), feed.assessments.len())),
        ]),
        Line::from(vec![
            Span::styled("[p] ", Style::default().fg(Color::Yellow)),
            Span::raw(query.priority_label()),
            Span::raw("   "),
            Span::styled("[u] ", Style::default().fg(Color::Yellow)),
            Span::raw(query.urgency_label()),
            Span::raw("   "),
            Span::styled("[t] ", Style::default().fg(Color::Yellow)),
            Span::raw(query.window.label()),
            Span::raw("   "),
            Span::styled("[s/o] ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{} {}", query.sort_by.label(), query.order.arrow())),
        ]),
    ];
    if let Some(error) = error.as_deref() {
        summary.push(error_line(error));
    }
    frame.render_widget(boxed_text(summary, form_block("Overview")), chunks[0]);

    // === Priority chart ===
    let bars: Vec<Bar> = PriorityCategory::ALL
        .iter()
        .map(|category| {
            let count = view.counts.get(*category);
            Bar::default()
                .value(count)
                .label(Line::from(category.display_name()))
                .text_value(count.to_string())
                .style(Style::default().fg(priority_color(*category)))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(priority_color(*category)),
                )
        })
        .collect();
    let chart = BarChart::default()
        .block(report_block("Assessments by Priority"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(4);
    frame.render_widget(chart, chunks[1]);

    // === Table ===
    let header_cells = [
        "Truck",
        "Date",
        "Severity",
        "Est. Cost",
        "Urgency",
        "Priority",
    ]
    .into_iter()
    .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1);

    let rows = view.rows.iter().map(|record| {
        let category = PriorityCategory::of(record);
        Row::new([
            Cell::from(record.truck_id.clone()),
            Cell::from(format_date(record.assessment_date)),
            Cell::from(format_score(record.severity_score)),
            Cell::from(format_currency(record.estimated_repair_cost)),
            Cell::from(format_urgency(record.urgency_level)),
            Cell::from(format_score(record.priority_score))
                .style(Style::default().fg(priority_color(category))),
        ])
    });

    let widths = [
        Constraint::Fill(1),    // Truck
        Constraint::Length(12), // Date
        Constraint::Length(9),  // Severity
        Constraint::Length(14), // Cost
        Constraint::Length(8),  // Urgency
        Constraint::Length(9),  // Priority
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Assessments "),
        )
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Cyan),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, chunks[2], table_state);
}
