use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::{bills_page, members_page, Action, ListTab};
use crate::api::{Congreso, MEMBERS_PAGE_SIZE};
use crate::debounce::Debouncer;
use crate::error::RequestError;
use crate::event::Event;
use crate::paging::{Applied, Page, PageRequest, PageSource, PagedList};
use crate::types::{Bill, BillDetail, Member, Signer};

/// How close to the end of a list the selection must be to fetch the next page
const LOAD_MORE_MARGIN: usize = 2;
const PAGE_JUMP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    BillDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(Box<BillDetail>),
    NotFound,
    Failed(String),
}

pub struct App {
    pub screen: Screen,
    pub tab: ListTab,
    pub bills: PagedList<Bill>,
    pub members: PagedList<Member>,
    pub bill_index: usize,
    pub member_index: usize,
    pub searching: bool,

    // Bill detail
    pub detail: Option<DetailState>,
    pub detail_bill: Option<u64>,
    pub signer_index: usize,

    pub notice: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
    detail_load_id: u64,
    api: Arc<Congreso>,
    bill_search: Debouncer<Action>,
    member_search: Debouncer<Action>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        api: Congreso,
        page_size: usize,
        debounce: Duration,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            screen: Screen::List,
            tab: ListTab::default(),
            bills: PagedList::new(page_size),
            members: PagedList::new(MEMBERS_PAGE_SIZE),
            bill_index: 0,
            member_index: 0,
            searching: false,
            detail: None,
            detail_bill: None,
            signer_index: 0,
            notice: None,
            error: None,
            should_quit: false,
            detail_load_id: 0,
            api: Arc::new(api),
            bill_search: Debouncer::new(debounce, action_tx.clone()),
            member_search: Debouncer::new(debounce, action_tx.clone()),
            action_tx,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Init,
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.searching {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => Action::ExitSearchMode,
                KeyCode::Backspace => Action::SearchBackspace,
                KeyCode::Char('u') if ctrl => Action::ClearSearch,
                KeyCode::Char(c) if !ctrl => Action::SearchInput(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => match self.screen {
                Screen::List => Action::Quit,
                Screen::BillDetail => Action::Back,
            },
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Enter => Action::Select,
            _ => match self.screen {
                Screen::List => match key.code {
                    KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => Action::NextTab,
                    KeyCode::Char('b') => Action::SwitchTab(ListTab::Bills),
                    KeyCode::Char('m') => Action::SwitchTab(ListTab::Members),
                    KeyCode::Char('/') => Action::EnterSearchMode,
                    KeyCode::Char('x') => Action::ClearSearch,
                    KeyCode::Char('n') => Action::LoadMore,
                    _ => Action::None,
                },
                Screen::BillDetail => match key.code {
                    KeyCode::Char('o') => Action::OpenInBrowser,
                    KeyCode::Char('y') => Action::YankUrl,
                    _ => Action::None,
                },
            },
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::None
                | Action::BillsPage { .. }
                | Action::MembersPage { .. }
                | Action::BillDetailLoaded { .. }
                | Action::QueryDebounced(..)
        ) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Init => {
                // Mounting a list is a reset with the (empty) settled query.
                self.start_query(ListTab::Bills, String::new());
                self.start_query(ListTab::Members, String::new());
            }
            Action::Quit => {
                self.shutdown();
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::List => {
                    self.shutdown();
                    self.should_quit = true;
                }
                Screen::BillDetail => self.close_detail(),
            },
            Action::ScrollUp => self.move_selection(-1),
            Action::ScrollDown => self.move_selection(1),
            Action::PageUp => self.move_selection(-(PAGE_JUMP as isize)),
            Action::PageDown => self.move_selection(PAGE_JUMP as isize),
            Action::GoToTop => self.move_selection(isize::MIN),
            Action::GoToBottom => self.move_selection(isize::MAX),
            Action::Select => {
                if self.screen == Screen::List && self.tab == ListTab::Bills {
                    match self.bills.items().get(self.bill_index).map(|b| b.number) {
                        Some(Some(number)) => self.open_detail(number),
                        Some(None) => {
                            self.notice = Some("This bill has no number to look up".to_string())
                        }
                        None => {}
                    }
                }
            }
            Action::NextTab => self.tab = self.tab.next(),
            Action::SwitchTab(tab) => self.tab = tab,

            Action::EnterSearchMode => {
                if self.screen == Screen::List {
                    self.searching = true;
                }
            }
            Action::ExitSearchMode => self.searching = false,
            Action::SearchInput(c) => {
                let mut query = self.current_query().to_string();
                query.push(c);
                self.edit_query(query);
            }
            Action::SearchBackspace => {
                let mut query = self.current_query().to_string();
                query.pop();
                self.edit_query(query);
            }
            Action::ClearSearch => {
                if !self.current_query().is_empty() {
                    self.edit_query(String::new());
                }
            }
            Action::QueryDebounced(tab, query) => self.start_query(tab, query),

            Action::LoadMore => self.load_more(self.tab),
            Action::Refresh => match self.screen {
                Screen::List => self.refresh(self.tab),
                Screen::BillDetail => {
                    if let Some(number) = self.detail_bill {
                        self.open_detail(number);
                    }
                }
            },
            Action::BillsPage { seq, result } => {
                if self.bills.apply(seq, result) == Applied::Replaced {
                    self.bill_index = 0;
                }
                self.bill_index = clamp_index(self.bill_index, self.bills.items().len());
            }
            Action::MembersPage { seq, result } => {
                if self.members.apply(seq, result) == Applied::Replaced {
                    self.member_index = 0;
                }
                self.member_index = clamp_index(self.member_index, self.members.items().len());
            }

            Action::BillDetailLoaded { load_id, result } => {
                if self.screen != Screen::BillDetail || load_id != self.detail_load_id {
                    debug!(load_id, current = self.detail_load_id, "discarding stale bill detail");
                    return;
                }
                self.signer_index = 0;
                self.detail = Some(match result {
                    Ok(Some(detail)) => DetailState::Loaded(Box::new(detail)),
                    Ok(None) => DetailState::NotFound,
                    Err(e) => DetailState::Failed(e.to_string()),
                });
            }
            Action::OpenInBrowser => {
                if let Some(url) = self.selected_signer_url() {
                    match open::that(&url) {
                        Ok(()) => self.notice = Some(format!("Opened {}", url)),
                        Err(e) => self.error = Some(format!("Could not open browser: {}", e)),
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_signer_url() {
                    match arboard::Clipboard::new().and_then(|mut c| c.set_text(url.clone())) {
                        Ok(()) => self.notice = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
                    }
                }
            }
            Action::None => {}
        }
    }

    pub fn current_query(&self) -> &str {
        match self.tab {
            ListTab::Bills => self.bills.query(),
            ListTab::Members => self.members.query(),
        }
    }

    pub fn current_detail(&self) -> Option<&BillDetail> {
        match &self.detail {
            Some(DetailState::Loaded(detail)) => Some(detail),
            _ => None,
        }
    }

    pub fn selected_signer(&self) -> Option<&Signer> {
        self.current_detail()?.signers.get(self.signer_index)
    }

    fn selected_signer_url(&mut self) -> Option<String> {
        if self.screen != Screen::BillDetail {
            return None;
        }
        let (name, url) = self
            .selected_signer()
            .map(|s| (s.name.clone(), s.web_page.clone()))?;
        if url.is_none() {
            self.notice = Some(format!("{} has no profile page", name));
        }
        url
    }

    /// Echo the typed text and restart the debounce timer for the active tab.
    fn edit_query(&mut self, query: String) {
        let tab = self.tab;
        match tab {
            ListTab::Bills => {
                self.bills.set_query(query.as_str());
                self.bill_search.push(Action::QueryDebounced(tab, query));
            }
            ListTab::Members => {
                self.members.set_query(query.as_str());
                self.member_search.push(Action::QueryDebounced(tab, query));
            }
        }
    }

    fn start_query(&mut self, tab: ListTab, query: String) {
        match tab {
            ListTab::Bills => {
                if let Some(request) = self.bills.on_debounced_query_change(&query) {
                    self.dispatch(request, bills_page);
                }
            }
            ListTab::Members => {
                if let Some(request) = self.members.on_debounced_query_change(&query) {
                    self.dispatch(request, members_page);
                }
            }
        }
    }

    fn load_more(&mut self, tab: ListTab) {
        match tab {
            ListTab::Bills => {
                if let Some(request) = self.bills.load_more() {
                    self.dispatch(request, bills_page);
                }
            }
            ListTab::Members => {
                if let Some(request) = self.members.load_more() {
                    self.dispatch(request, members_page);
                }
            }
        }
    }

    fn refresh(&mut self, tab: ListTab) {
        match tab {
            ListTab::Bills => {
                if let Some(request) = self.bills.refresh() {
                    self.dispatch(request, bills_page);
                }
            }
            ListTab::Members => {
                if let Some(request) = self.members.refresh() {
                    self.dispatch(request, members_page);
                }
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        match self.screen {
            Screen::List => {
                let tab = self.tab;
                let (index, len) = match tab {
                    ListTab::Bills => (&mut self.bill_index, self.bills.items().len()),
                    ListTab::Members => (&mut self.member_index, self.members.items().len()),
                };
                *index = step(*index, delta, len);
                if len > 0 && *index + LOAD_MORE_MARGIN >= len {
                    self.load_more(tab);
                }
            }
            Screen::BillDetail => {
                let len = self.current_detail().map_or(0, |d| d.signers.len());
                self.signer_index = step(self.signer_index, delta, len);
            }
        }
    }

    fn open_detail(&mut self, number: u64) {
        self.detail_load_id += 1;
        self.screen = Screen::BillDetail;
        self.detail = Some(DetailState::Loading);
        self.detail_bill = Some(number);
        self.signer_index = 0;
        self.searching = false;
        self.spawn_load_bill_detail(number);
    }

    /// Leaving the screen invalidates any detail fetch still running.
    fn close_detail(&mut self) {
        self.detail_load_id += 1;
        self.screen = Screen::List;
        self.detail = None;
        self.detail_bill = None;
        self.signer_index = 0;
    }

    fn shutdown(&mut self) {
        info!("closing list sessions");
        self.bill_search.cancel_pending();
        self.member_search.cancel_pending();
        self.bills.close();
        self.members.close();
        self.detail_load_id += 1;
    }

    fn dispatch<T>(&self, request: PageRequest, wrap: fn(u64, Result<Page<T>, RequestError>) -> Action)
    where
        T: Send + 'static,
        Congreso: PageSource<T>,
    {
        debug!(seq = request.seq, kind = ?request.kind, offset = request.offset, "dispatching page request");
        let tx = self.action_tx.clone();
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = <Congreso as PageSource<T>>::fetch_page(&*api, &request).await;
            tx.send(wrap(request.seq, result)).ok();
        });
    }

    fn spawn_load_bill_detail(&self, number: u64) {
        let tx = self.action_tx.clone();
        let api = Arc::clone(&self.api);
        let load_id = self.detail_load_id;
        tokio::spawn(async move {
            let result = api.get_bill(number).await;
            tx.send(Action::BillDetailLoaded { load_id, result }).ok();
        });
    }
}

fn step(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    if delta < 0 {
        index.saturating_sub(delta.unsigned_abs())
    } else {
        index.saturating_add(delta as usize).min(last)
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
