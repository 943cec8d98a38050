use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use timekeep::Route;

use crate::app::{App, ConfirmKind};

use super::super::action_queue::{Action, ActionTx};
use super::{enqueue_action, reload_visible};

pub(super) fn handle_projects_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if app.projects.searching {
        handle_search_key(key, app);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Down | KeyCode::Char('j') => app.projects.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.projects.select_previous(),
        KeyCode::Left | KeyCode::Char('h') => {
            if app.projects.previous_category() {
                enqueue_action(action_tx, Action::LoadVisible);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.projects.next_category() {
                enqueue_action(action_tx, Action::LoadVisible);
            }
        }
        KeyCode::Char('/') => app.projects.searching = true,
        KeyCode::Enter => {
            if app.open_selected_project() {
                enqueue_action(action_tx, Action::LoadVisible);
            }
        }
        KeyCode::Char('n') => app.open_project_form(),
        KeyCode::Char('e') => app.open_project_edit_form(),
        KeyCode::Char('d') => {
            if let Some(project) = app.projects.selected_project() {
                let kind = ConfirmKind::DeleteProject(project.id.clone());
                let subject = format!("Проект «{}» и все его таймеры будут удалены.", project.name);
                app.confirm(kind, subject);
            }
        }
        KeyCode::Char('c') => app.open_category_form(),
        KeyCode::Char('D') => {
            if let Some(category) = app.projects.selected_category() {
                let kind = ConfirmKind::DeleteCategory(category.id.clone());
                let subject = format!("Категория «{}» будет удалена.", category.name);
                app.confirm(kind, subject);
            }
        }
        KeyCode::Char('s') => {
            app.navigate(Route::Statistics);
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Char('r') => reload_visible(app, action_tx),
        KeyCode::Char('X') => enqueue_action(action_tx, Action::Logout),
        _ => {}
    }
}

fn handle_search_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.projects.search_input_clear();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.projects.search_input_char(c);
        }
        KeyCode::Backspace => app.projects.search_input_backspace(),
        KeyCode::Down => app.projects.select_next(),
        KeyCode::Up => app.projects.select_previous(),
        KeyCode::Enter => app.projects.searching = false,
        KeyCode::Esc => {
            app.projects.searching = false;
            app.projects.search_input_clear();
        }
        _ => {}
    }
}
