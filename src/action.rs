use crate::error::RequestError;
use crate::paging::Page;
use crate::types::{Bill, BillDetail, Member};

/// Which list the list screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListTab {
    #[default]
    Bills,
    Members,
}

impl ListTab {
    pub fn next(self) -> Self {
        match self {
            ListTab::Bills => ListTab::Members,
            ListTab::Members => ListTab::Bills,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Init,
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Select,
    NextTab,
    SwitchTab(ListTab),

    // Search
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    ClearSearch,
    QueryDebounced(ListTab, String),

    // Pagination
    LoadMore,
    Refresh,
    BillsPage {
        seq: u64,
        result: Result<Page<Bill>, RequestError>,
    },
    MembersPage {
        seq: u64,
        result: Result<Page<Member>, RequestError>,
    },

    // Bill detail
    BillDetailLoaded {
        load_id: u64,
        result: Result<Option<BillDetail>, RequestError>,
    },
    OpenInBrowser,
    YankUrl,

    None,
}

pub fn bills_page(seq: u64, result: Result<Page<Bill>, RequestError>) -> Action {
    Action::BillsPage { seq, result }
}

pub fn members_page(seq: u64, result: Result<Page<Member>, RequestError>) -> Action {
    Action::MembersPage { seq, result }
}
