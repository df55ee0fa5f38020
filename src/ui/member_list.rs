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
        .title(format!(" Members ({}) ", count_label(&app.members)));

    if app.members.items().is_empty() {
        render_empty_list(frame, &app.members, block, "No members found", area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 62; // name(32) + space(1) + party(28) + space(1)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .members
        .items()
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let style = if i == app.member_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:<32}", truncate(&member.name, 32)), style),
                Span::raw(" "),
                Span::styled(
                    format!("{:<28}", truncate(&member.party, 28)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(truncate(&member.email, flex), Style::default().fg(Color::Gray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.member_index));

    frame.render_stateful_widget(list, area, &mut state);
}
