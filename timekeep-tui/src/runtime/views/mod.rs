use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use timekeep::Route;

use crate::app::App;

use super::action_queue::{Action, ActionTx};

mod auth;
mod modal;
mod projects;
mod statistics;
mod timers;

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

fn reload_visible(app: &App, action_tx: &ActionTx) {
    for key in app.visible_keys() {
        enqueue_action(action_tx, Action::Reload(key));
    }
}

pub(super) fn handle_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.modal.is_some() {
        modal::handle_modal_key(key, app, action_tx);
        return;
    }

    match &app.route {
        Route::Login | Route::Register => auth::handle_auth_key(key, app, action_tx),
        Route::Home | Route::Projects => projects::handle_projects_key(key, app, action_tx),
        Route::ProjectTimers(_) => timers::handle_timers_key(key, app, action_tx),
        Route::Statistics => statistics::handle_statistics_key(key, app, action_tx),
    }
}
