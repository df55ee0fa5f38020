mod bill_detail;
mod bill_list;
mod member_list;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

use crate::action::ListTab;
use crate::app::{App, Screen};
use crate::paging::{FetchStatus, PagedList};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::List => render_list_screen(frame, app, chunks[1]),
        Screen::BillDetail => bill_detail::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::List => match app.tab {
            ListTab::Bills => "congreso - Bills".to_string(),
            ListTab::Members => "congreso - Members".to_string(),
        },
        Screen::BillDetail => match app.current_detail() {
            Some(detail) => format!("congreso - Bill {}", detail.number),
            None => "congreso - Bill".to_string(),
        },
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_list_screen(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_search_bar(frame, app, chunks[1]);

    match app.tab {
        ListTab::Bills => bill_list::render(frame, app, chunks[2]),
        ListTab::Members => member_list::render(frame, app, chunks[2]),
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = Tabs::new(vec!["[B] Bills", "[M] Members"])
        .block(Block::default().borders(Borders::ALL))
        .select(match app.tab {
            ListTab::Bills => 0,
            ListTab::Members => 1,
        })
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let query = app.current_query();
    let border = if app.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![Span::styled("/ ", Style::default().fg(Color::DarkGray))];
    if query.is_empty() && !app.searching {
        spans.push(Span::styled(
            "Search...",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(query.to_string()));
    }
    if app.searching {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Search "),
    );
    frame.render_widget(bar, area);
}

/// Placeholder shown instead of an empty list: loading, error or no results.
fn render_empty_list<T>(frame: &mut Frame, list: &PagedList<T>, block: Block, empty_text: &str, area: Rect) {
    let (text, style) = match list.status() {
        FetchStatus::LoadingInitial | FetchStatus::Refreshing => {
            ("Loading...".to_string(), Style::default().fg(Color::Yellow))
        }
        FetchStatus::Errored => (
            format!(
                "{} - press r to retry",
                list.error().unwrap_or("Request failed")
            ),
            Style::default().fg(Color::Red),
        ),
        _ => (empty_text.to_string(), Style::default().fg(Color::Gray)),
    };

    frame.render_widget(Paragraph::new(text).block(block).style(style), area);
}

/// "12 of 40" style counter for list titles; "+" marks more pages to fetch.
fn count_label<T>(list: &PagedList<T>) -> String {
    let loaded = list.items().len();
    match list.total_count() {
        Some(total) => format!("{} of {}", loaded, total),
        None if list.cursor().has_more => format!("{}+", loaded),
        None => loaded.to_string(),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let list_status = match app.screen {
        Screen::List => match app.tab {
            ListTab::Bills => (app.bills.status(), app.bills.error()),
            ListTab::Members => (app.members.status(), app.members.error()),
        },
        Screen::BillDetail => (FetchStatus::Idle, None),
    };

    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let (FetchStatus::Errored, Some(error)) = list_status {
        Line::from(vec![Span::styled(
            format!("Error: {} (r: retry)", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(loading) = loading_label(list_status.0) {
        Line::from(vec![Span::styled(
            loading,
            Style::default().fg(Color::Yellow),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else {
        let help = if app.searching {
            "type to search | Backspace: delete | Ctrl+u: clear | Enter/Esc: done"
        } else {
            match app.screen {
                Screen::List => {
                    "/: search | x: clear | Tab: switch | j/k/g/G: nav | n: more | r: refresh | Enter: open | q: quit"
                }
                Screen::BillDetail => {
                    "j/k: signers | o: open profile | y: copy profile URL | r: reload | q: back"
                }
            }
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

fn loading_label(status: FetchStatus) -> Option<&'static str> {
    match status {
        FetchStatus::LoadingInitial => Some("Loading..."),
        FetchStatus::LoadingMore => Some("Loading more..."),
        FetchStatus::Refreshing => Some("Refreshing..."),
        FetchStatus::Idle | FetchStatus::Errored => None,
    }
}

/// Shorten `text` to at most `width` characters, ending in "..." when cut.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut cut: String = text.chars().take(width - 3).collect();
    cut.push_str("...");
    cut
}
