use crate::app::AppState;
use crate::model::{Status, UserRecord};

/// Predicate for the users list: free-text search plus optional status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search_term: String,
    pub status: Option<Status>,
}

impl ListFilter {
    pub fn new(search_term: impl Into<String>, status: Option<Status>) -> Self {
        Self {
            search_term: search_term.into(),
            status,
        }
    }

    /// Case-insensitive substring match on name or email, then status.
    pub fn matches(&self, user: &UserRecord) -> bool {
        let q = self.search_term.to_lowercase();
        let text_ok = q.is_empty()
            || user.name.to_lowercase().contains(&q)
            || user.email.to_lowercase().contains(&q);
        let status_ok = self.status.is_none_or(|s| user.status == s);
        text_ok && status_ok
    }

    /// Matching records, keeping the input order.
    pub fn apply(&self, users: &[UserRecord]) -> Vec<UserRecord> {
        users.iter().filter(|u| self.matches(u)).cloned().collect()
    }
}

/// Re-derive the visible users list from `users_all`, the search query and
/// the status filter. Selection and page go back to the start.
pub fn apply_filters_and_search(app: &mut AppState) {
    let filter = ListFilter::new(app.search_query.clone(), app.status_filter);
    app.users = filter.apply(&app.users_all);
    app.selected_user_index = 0;
    app.current_page = 1;
}
