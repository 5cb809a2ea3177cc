use super::*;

/// Admin dashboard: fetched feed plus the transient filter/sort controls.
#[derive(Debug, Clone, Default)]
pub struct AdminState {
    pub feed: Option<DashboardFeed>,
    pub query: DashboardQuery,
    pub table_state: TableState,
    pub error: Option<String>,
}

impl App {
    // ========== Admin Dashboard Methods ==========

    pub(super) fn open_admin(&mut self) {
        if self.admin.feed.is_none() {
            self.queue(PendingAction::LoadDashboard);
        }
    }

    /// Number of rows the current query shows.
    pub fn admin_row_count(&self) -> usize {
        match &self.admin.feed {
            Some(feed) => truckmate_core::dashboard::apply(
                &feed.assessments,
                &self.admin.query,
                chrono::Utc::now(),
            )
            .len(),
            None => 0,
        }
    }

    /// Handle keyboard input on the admin dashboard.
    pub(super) fn handle_admin_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                self.queue(PendingAction::LoadDashboard);
            }
            KeyCode::Char('p') => {
                self.admin.query.cycle_priority();
                self.reset_admin_selection();
            }
            KeyCode::Char('u') => {
                self.admin.query.cycle_urgency();
                self.reset_admin_selection();
            }
            KeyCode::Char('t') => {
                self.admin.query.cycle_window();
                self.reset_admin_selection();
            }
            KeyCode::Char('s') => {
                self.admin.query.toggle_sort_key();
            }
            KeyCode::Char('o') => {
                self.admin.query.toggle_order();
            }
            KeyCode::Down | KeyCode::Char('j') => self.select_next_assessment(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_assessment(),
            KeyCode::Home | KeyCode::Char('g') => {
                if self.admin_row_count() > 0 {
                    self.admin.table_state.select(Some(0));
                }
            }
            KeyCode::End | KeyCode::Char('G') => {
                let count = self.admin_row_count();
                if count > 0 {
                    self.admin.table_state.select(Some(count - 1));
                }
            }
            _ => {}
        }
    }

    fn reset_admin_selection(&mut self) {
        let selected = (self.admin_row_count() > 0).then_some(0);
        self.admin.table_state.select(selected);
    }

    fn select_next_assessment(&mut self) {
        let count = self.admin_row_count();
        if count == 0 {
            return;
        }
        let i = match self.admin.table_state.selected() {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        };
        self.admin.table_state.select(Some(i));
    }

    fn select_previous_assessment(&mut self) {
        let count = self.admin_row_count();
        if count == 0 {
            return;
        }
        let i = match self.admin.table_state.selected() {
            Some(0) | None => count - 1,
            Some(i) => (i - 1).min(count - 1),
        };
        self.admin.table_state.select(Some(i));
    }

    pub(super) fn finish_load_dashboard(&mut self) {
        let result = self
            .session
            .require_token()
            .and_then(|token| self.backend.admin_dashboard(token));
        match result {
            Ok(feed) => {
                tracing::info!(
                    assessments = feed.assessments.len(),
                    total = feed.total_assessments,
                    "Dashboard loaded"
                );
                self.admin.feed = Some(feed);
                self.admin.error = None;
                self.reset_admin_selection();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load dashboard");
                self.admin.error = Some(describe_error(&e));
            }
        }
    }
}
