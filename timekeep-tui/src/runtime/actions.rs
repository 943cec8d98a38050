use std::time::Instant;

use time::OffsetDateTime;
use timekeep::domain::{CategoryId, ProjectId, TimerId};
use timekeep::dto::{ProjectInput, TimerEdit};
use timekeep::{Error, QueryKey, Route, Store};

use crate::app::{App, AuthMode, CardMode};

use super::action_queue::{Action, TimerOp};

pub(super) async fn run_action(action: Action, app: &mut App, store: &Store) {
    match action {
        Action::SubmitAuth => submit_auth(app, store).await,
        Action::Logout => logout(app, store),
        Action::Reload(key) => reload(app, store, key).await,
        Action::LoadVisible => load_visible(app, store).await,
        Action::CreateCategory { name } => create_category(app, store, &name).await,
        Action::DeleteCategory(id) => delete_category(app, store, &id).await,
        Action::SaveProject { id, input } => save_project(app, store, id, &input).await,
        Action::DeleteProject(id) => delete_project(app, store, &id).await,
        Action::CreateTimer { project_id, name } => {
            create_timer(app, store, &project_id, &name).await
        }
        Action::TimerCommand {
            project_id,
            timer_id,
            op,
        } => timer_command(app, store, &project_id, &timer_id, op).await,
        Action::UpdateTimer {
            project_id,
            timer_id,
            edit,
        } => update_timer(app, store, &project_id, &timer_id, edit).await,
        Action::MarkAllPaid(id) => mark_all_paid(app, store, &id).await,
    }
}

/// The backend's message when it sent one, otherwise `fallback` with the cause.
fn user_message(err: &Error, fallback: &str) -> String {
    match err {
        Error::Unauthorized(message)
        | Error::Validation(message)
        | Error::NotFound(message)
        | Error::Conflict(message)
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => format!("{}: {}", fallback, err),
    }
}

async fn load(app: &mut App, store: &Store, key: QueryKey, force: bool) {
    app.is_loading = true;
    let result = if force {
        store.refresh(&key).await
    } else {
        store.query(&key).await
    };
    app.is_loading = false;

    match result {
        Ok(data) => app.apply(&key, data, OffsetDateTime::now_utc(), Instant::now()),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to load");
            app.notify_error(user_message(&e, "Не удалось загрузить данные"));
        }
    }
}

/// Load what the current screen shows. A second pass picks up keys that
/// changed because of the first one (e.g. a vanished category filter).
pub(super) async fn load_visible(app: &mut App, store: &Store) {
    for _ in 0..2 {
        let keys = app.visible_keys();
        for key in &keys {
            load(app, store, key.clone(), false).await;
        }
        if app.visible_keys() == keys {
            break;
        }
    }
}

async fn reload(app: &mut App, store: &Store, key: QueryKey) {
    let before = app.visible_keys();
    load(app, store, key, true).await;
    if app.visible_keys() != before {
        load_visible(app, store).await;
    }
}

async fn submit_auth(app: &mut App, store: &Store) {
    let (email, password) = match app.auth.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            app.auth.error = Some(e.to_string());
            return;
        }
    };

    let mode = app.auth.mode;
    app.auth.submitting = true;
    let result = match mode {
        AuthMode::Login => store.login(&email, &password).await,
        AuthMode::Register => store.register(&email, &password).await,
    };

    match result {
        Ok(()) => {
            tracing::info!(mode = ?mode, "signed in");
            app.signed_in();
            app.notify_success(mode.success_message());
            load_visible(app, store).await;
        }
        Err(e) => {
            tracing::warn!(mode = ?mode, error = %e, "authentication failed");
            let message = user_message(&e, mode.failure_message());
            app.auth.reset_password();
            app.auth.error = Some(message.clone());
            app.notify_error(message);
        }
    }
}

fn logout(app: &mut App, store: &Store) {
    match store.logout() {
        Ok(()) => {
            app.signed_out();
            app.notify_success("Вы вышли из системы");
        }
        Err(e) => app.notify_error(user_message(&e, "Не удалось выйти из системы")),
    }
}

async fn create_category(app: &mut App, store: &Store, name: &str) {
    match store.create_category(name).await {
        Ok(_) => {
            app.close_modal();
            app.notify_success("Категория создана");
        }
        Err(e) => app.notify_error(user_message(&e, "Не удалось создать категорию")),
    }
}

async fn delete_category(app: &mut App, store: &Store, id: &CategoryId) {
    app.close_modal();
    match store.delete_category(id).await {
        Ok(()) => app.notify_success("Категория удалена"),
        Err(e) => app.notify_error(user_message(&e, "Не удалось удалить категорию")),
    }
}

async fn save_project(app: &mut App, store: &Store, id: Option<ProjectId>, input: &ProjectInput) {
    let result = match &id {
        Some(id) => store.update_project(id, input).await,
        None => store.create_project(input).await,
    };
    match (result, id.is_some()) {
        (Ok(_), false) => {
            app.close_modal();
            app.notify_success("Проект создан");
        }
        (Ok(_), true) => {
            app.close_modal();
            app.notify_success("Проект обновлён");
        }
        (Err(e), false) => app.notify_error(user_message(&e, "Не удалось создать проект")),
        (Err(e), true) => app.notify_error(user_message(&e, "Не удалось обновить проект")),
    }
}

async fn delete_project(app: &mut App, store: &Store, id: &ProjectId) {
    app.close_modal();
    match store.delete_project(id).await {
        Ok(()) => {
            if app.route == Route::ProjectTimers(id.clone()) {
                app.back_to_projects();
                load_visible(app, store).await;
            }
            app.notify_success("Проект удалён");
        }
        Err(e) => app.notify_error(user_message(&e, "Не удалось удалить проект")),
    }
}

async fn create_timer(app: &mut App, store: &Store, project_id: &ProjectId, name: &str) {
    match store.create_timer(name, project_id).await {
        Ok(_) => {
            app.close_modal();
            app.notify_success("Таймер создан");
        }
        Err(e) => app.notify_error(user_message(&e, "Не удалось создать таймер")),
    }
}

async fn timer_command(
    app: &mut App,
    store: &Store,
    project_id: &ProjectId,
    timer_id: &TimerId,
    op: TimerOp,
) {
    let result = match op {
        TimerOp::Pause => store.pause_timer(project_id, timer_id).await.map(drop),
        TimerOp::Resume => store.resume_timer(project_id, timer_id).await.map(drop),
        TimerOp::Stop => store.stop_timer(project_id, timer_id).await.map(drop),
        TimerOp::Delete => {
            app.close_modal();
            store.delete_timer(project_id, timer_id).await
        }
    };
    match result {
        Ok(()) => {
            if op == TimerOp::Delete {
                app.notify_success("Таймер удалён");
            }
        }
        Err(e) => {
            let fallback = match op {
                TimerOp::Pause => "Не удалось поставить таймер на паузу",
                TimerOp::Resume => "Не удалось возобновить таймер",
                TimerOp::Stop => "Не удалось остановить таймер",
                TimerOp::Delete => "Не удалось удалить таймер",
            };
            app.notify_error(user_message(&e, fallback));
        }
    }
}

async fn update_timer(
    app: &mut App,
    store: &Store,
    project_id: &ProjectId,
    timer_id: &TimerId,
    edit: TimerEdit,
) {
    let from_draft = edit.name.is_some() || edit.description.is_some() || edit.elapsed.is_some();
    match store.update_timer(project_id, timer_id, edit).await {
        Ok(_) => {
            if from_draft {
                if let Some(card) = app.timers.as_mut().and_then(|t| t.card_mut(timer_id)) {
                    card.mode = CardMode::Viewing;
                }
                app.notify_success("Таймер сохранён");
            }
        }
        Err(e) => {
            let message = user_message(&e, "Не удалось сохранить таймер");
            if let Some(CardMode::Editing(draft)) = app
                .timers
                .as_mut()
                .and_then(|t| t.card_mut(timer_id))
                .map(|c| &mut c.mode)
            {
                draft.error = Some(message.clone());
            }
            app.notify_error(message);
        }
    }
}

async fn mark_all_paid(app: &mut App, store: &Store, project_id: &ProjectId) {
    app.close_modal();
    match store.mark_all_paid(project_id).await {
        Ok(()) => app.notify_success("Все таймеры отмечены как оплаченные"),
        Err(e) => app.notify_error(user_message(&e, "Не удалось отметить таймеры как оплаченные")),
    }
}
