use std::time::{Duration, Instant};

use time::OffsetDateTime;
use timekeep::{QueryData, QueryKey, Route};

use crate::config::TimekeepConfig;

mod auth;
mod edit;
mod modal;
mod navigation;
mod projects;
mod state;
mod statistics;
mod timers;

pub use auth::{AuthField, AuthForm, AuthMode};
pub use edit::{CardMode, DraftField, TimerDraft};
pub use modal::{Confirm, ConfirmKind, Modal, NameForm, ProjectField, ProjectForm};
pub use projects::ProjectsScreen;
pub use state::{FormError, Notification, NotificationKind, TextInput};
pub use statistics::StatisticsScreen;
pub use timers::{TimerCard, TimersScreen};

pub struct App {
    pub running: bool,
    pub route: Route,
    pub authenticated: bool,

    // Transient status line
    pub notification: Option<Notification>,
    notification_ttl: Duration,

    // Loading indicator
    pub is_loading: bool,
    pub throbber_state: throbber_widgets_tui::ThrobberState,

    // Screens
    pub auth: AuthForm,
    pub projects: ProjectsScreen,
    pub timers: Option<TimersScreen>,
    pub statistics: StatisticsScreen,

    pub modal: Option<Modal>,
}

impl App {
    pub fn new(cfg: &TimekeepConfig, authenticated: bool) -> Self {
        let mut app = Self {
            running: true,
            route: Route::Login,
            authenticated,
            notification: None,
            notification_ttl: cfg.notification_ttl(),
            is_loading: false,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
            auth: AuthForm::new(AuthMode::Login),
            projects: ProjectsScreen::default(),
            timers: None,
            statistics: StatisticsScreen::default(),
            modal: None,
        };
        app.navigate(Route::Home);
        app
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::new(
            NotificationKind::Success,
            message,
            self.notification_ttl,
        ));
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::new(
            NotificationKind::Error,
            message,
            self.notification_ttl,
        ));
    }

    pub fn expire_notification(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.is_expired(now))
        {
            self.notification = None;
        }
    }

    /// Drop everything fetched under the previous session.
    pub fn signed_out(&mut self) {
        self.authenticated = false;
        self.projects = ProjectsScreen::default();
        self.timers = None;
        self.statistics = StatisticsScreen::default();
        self.modal = None;
        self.auth = AuthForm::new(AuthMode::Login);
        self.navigate(Route::Login);
    }

    pub fn signed_in(&mut self) {
        self.authenticated = true;
        self.auth.reset_password();
        self.auth.error = None;
        self.navigate(Route::Home);
    }

    /// Query keys the current screen renders.
    pub fn visible_keys(&self) -> Vec<QueryKey> {
        match &self.route {
            Route::Login | Route::Register => Vec::new(),
            Route::Home | Route::Projects => vec![
                QueryKey::Categories,
                QueryKey::Projects {
                    category: self.projects.category_filter.clone(),
                },
            ],
            Route::ProjectTimers(id) => vec![QueryKey::Project(id.clone())],
            Route::Statistics => vec![self.statistics.key()],
        }
    }

    /// Hand fetched data to the screen that asked for it. Results for keys
    /// the screens no longer show are dropped.
    pub fn apply(&mut self, key: &QueryKey, data: QueryData, wall: OffsetDateTime, mono: Instant) {
        match (key, data) {
            (QueryKey::Categories, QueryData::Categories(categories)) => {
                self.projects.set_categories(categories);
            }
            (QueryKey::Projects { category }, QueryData::Projects(projects)) => {
                if *category == self.projects.category_filter {
                    self.projects.set_projects(projects);
                }
            }
            (QueryKey::Project(id), QueryData::Project(detail)) => {
                if let Some(screen) = self.timers.as_mut().filter(|s| &s.project_id == id) {
                    screen.sync(detail, wall, mono);
                }
            }
            (key @ QueryKey::Statistics { .. }, QueryData::Statistics(stats)) => {
                if *key == self.statistics.key() {
                    self.statistics.data = Some(stats);
                }
            }
            (key, _) => {
                tracing::warn!(key = %key, "query data does not match its key");
            }
        }
    }

    /// Whether plain characters should go to a text field instead of
    /// triggering shortcuts.
    pub fn is_text_input_active(&self) -> bool {
        if matches!(self.modal, Some(Modal::Project(_) | Modal::Category(_) | Modal::Timer { .. })) {
            return true;
        }
        match &self.route {
            Route::Login | Route::Register => true,
            Route::Home | Route::Projects => self.projects.searching,
            Route::ProjectTimers(_) => self.timers.as_ref().is_some_and(|t| t.is_editing()),
            Route::Statistics => false,
        }
    }
}
