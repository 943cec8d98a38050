use timekeep::domain::ProjectId;
use timekeep::{guard, SessionState};

use super::*;

impl App {
    fn session_state(&self) -> SessionState {
        if self.authenticated {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Navigate through the session guard. Returns where we actually landed.
    pub fn navigate(&mut self, requested: Route) -> Route {
        let route = guard(requested, self.session_state());
        match &route {
            Route::Login => self.auth.mode = AuthMode::Login,
            Route::Register => self.auth.mode = AuthMode::Register,
            Route::ProjectTimers(id) => {
                if self.timers.as_ref().map(|t| &t.project_id) != Some(id) {
                    self.timers = Some(TimersScreen::new(id.clone()));
                }
            }
            Route::Home | Route::Projects | Route::Statistics => {}
        }
        self.modal = None;
        self.route = route.clone();
        route
    }

    pub fn open_project(&mut self, id: ProjectId) {
        self.projects.searching = false;
        self.navigate(Route::ProjectTimers(id));
    }

    /// Open the timers of the highlighted project card.
    pub fn open_selected_project(&mut self) -> bool {
        match self.projects.selected_project().map(|p| p.id.clone()) {
            Some(id) => {
                self.open_project(id);
                true
            }
            None => false,
        }
    }

    pub fn back_to_projects(&mut self) {
        self.navigate(Route::Projects);
    }

    pub fn toggle_auth_mode(&mut self) {
        self.auth.switch_mode();
        self.navigate(self.auth.mode.route());
    }

    pub fn open_project_form(&mut self) {
        self.modal = Some(Modal::Project(ProjectForm::create(
            self.projects.category_filter.clone(),
        )));
    }

    pub fn open_project_edit_form(&mut self) {
        if let Some(project) = self.projects.selected_project() {
            self.modal = Some(Modal::Project(ProjectForm::edit(project)));
        }
    }

    pub fn open_category_form(&mut self) {
        self.modal = Some(Modal::Category(NameForm::default()));
    }

    pub fn open_timer_form(&mut self) {
        if let Some(screen) = &self.timers {
            self.modal = Some(Modal::Timer {
                project_id: screen.project_id.clone(),
                form: NameForm::default(),
            });
        }
    }

    pub fn confirm(&mut self, kind: ConfirmKind, subject: impl Into<String>) {
        self.modal = Some(Modal::Confirm(Confirm {
            kind,
            subject: subject.into(),
        }));
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }
}
