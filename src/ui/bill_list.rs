use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::app::App;

use super::{count_label, render_empty_list, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Bills ({}) ", count_label(&app.bills)));

    if app.bills.items().is_empty() {
        render_empty_list(frame, &app.bills, block, "No bills found", area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 31; // code(15) + space(1) + status(14) + space(1)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .bills
        .items()
        .iter()
        .enumerate()
        .map(|(i, bill)| {
            let style = if i == app.bill_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let filed = bill
                .filed_on
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "--/--/----".to_string());

            let title = Line::from(vec![
                Span::styled(
                    format!("{:<15}", truncate(&bill.code, 15)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<14}", truncate(&bill.status, 14)),
                    Style::default().fg(Color::Blue),
                ),
                Span::raw(" "),
                Span::styled(truncate(&bill.title, flex), style),
            ]);
            let meta = Line::from(vec![
                Span::raw(" ".repeat(16)),
                Span::styled(filed, Style::default().fg(Color::DarkGray)),
                Span::raw("  "),
                Span::styled(
                    format!("{:<12}", truncate(&bill.proponent, 12)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    truncate(&bill.authors, w.saturating_sub(41).max(10)),
                    Style::default().fg(Color::Gray),
                ),
            ]);

            ListItem::new(vec![title, meta])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.bill_index));

    frame.render_stateful_widget(list, area, &mut state);
}
