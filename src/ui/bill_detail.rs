use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, DetailState};
use crate::types::BillDetail;

use super::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Bill ");

    let detail = match &app.detail {
        Some(DetailState::Loaded(detail)) => detail,
        Some(DetailState::Loading) => {
            let loading = Paragraph::new("Loading...")
                .block(block)
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(loading, area);
            return;
        }
        Some(DetailState::NotFound) | None => {
            let empty = Paragraph::new("No details were found for this bill.")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(empty, area);
            return;
        }
        Some(DetailState::Failed(msg)) => {
            let failed = Paragraph::new(format!("Could not load bill details: {}", msg))
                .block(block)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(failed, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Percentage(40),
            Constraint::Min(0),
        ])
        .split(area);

    render_header(frame, detail, chunks[0]);
    render_summary(frame, detail, chunks[1]);
    render_signers(frame, app, detail, chunks[2]);
}

fn render_header(frame: &mut Frame, detail: &BillDetail, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let filed = detail
        .filed_on
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let lines = vec![
        Line::from(Span::styled(
            detail.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(
                detail.status.as_str(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![Span::styled("Filed: ", label), Span::raw(filed)]),
        Line::from(vec![
            Span::styled("Proponent: ", label),
            Span::raw(detail.proponent.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Group: ", label),
            Span::raw(detail.parliamentary_group.as_str()),
        ]),
    ];

    let header = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });
    frame.render_widget(header, area);
}

fn render_summary(frame: &mut Frame, detail: &BillDetail, area: Rect) {
    let text = if detail.summary.is_empty() {
        "No summary provided."
    } else {
        detail.summary.as_str()
    };

    let summary = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Summary "))
        .wrap(Wrap { trim: true });
    frame.render_widget(summary, area);
}

fn render_signers(frame: &mut Frame, app: &App, detail: &BillDetail, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Signers ({}) ", detail.signers.len()));

    if detail.signers.is_empty() {
        let empty = Paragraph::new("No signers listed")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 52; // name(36) + space(1) + sex(2) + dni(12) + space(1)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = detail
        .signers
        .iter()
        .enumerate()
        .map(|(i, signer)| {
            let style = if i == app.signer_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let page = signer
                .web_page
                .as_deref()
                .map(|u| truncate(u, flex))
                .unwrap_or_default();

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<36}", truncate(&signer.name, 36)), style),
                Span::raw(" "),
                Span::raw(format!("{} ", signer.sex)),
                Span::styled(
                    format!("DNI {:<8}", signer.dni),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
                Span::styled(page, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.signer_index));
    frame.render_stateful_widget(list, area, &mut state);
}
