use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use time::OffsetDateTime;
use timekeep::domain::TimerStatus;
use timekeep::dto::TimerEdit;
use timekeep::Route;

use crate::app::{App, ConfirmKind};

use super::super::action_queue::{Action, ActionTx, TimerOp};
use super::{enqueue_action, reload_visible};

pub(super) fn handle_timers_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    let Some(screen) = app.timers.as_mut() else {
        app.back_to_projects();
        return;
    };

    if screen.is_editing() {
        handle_edit_key(key, app, action_tx);
        return;
    }

    let project_id = screen.project_id.clone();
    let selected = screen.selected_timer().cloned();

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Down | KeyCode::Char('j') => screen.select_next(),
        KeyCode::Up | KeyCode::Char('k') => screen.select_previous(),
        KeyCode::Esc | KeyCode::Backspace => {
            app.back_to_projects();
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Char('s') => {
            app.navigate(Route::Statistics);
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Char('r') => reload_visible(app, action_tx),
        KeyCode::Char('n') => app.open_timer_form(),
        KeyCode::Char('M') => {
            if !screen.cards.is_empty() {
                app.confirm(ConfirmKind::MarkAllPaid(project_id), screen_title(app));
            }
        }
        KeyCode::Char('e') => screen.start_editing(OffsetDateTime::now_utc()),
        code => {
            let Some(timer) = selected else {
                return;
            };
            let command = |op| Action::TimerCommand {
                project_id: project_id.clone(),
                timer_id: timer.id.clone(),
                op,
            };
            let update = |edit| Action::UpdateTimer {
                project_id: project_id.clone(),
                timer_id: timer.id.clone(),
                edit,
            };
            match code {
                KeyCode::Char(' ') => match timer.status() {
                    TimerStatus::Running => enqueue_action(action_tx, command(TimerOp::Pause)),
                    TimerStatus::Paused => enqueue_action(action_tx, command(TimerOp::Resume)),
                    TimerStatus::Stopped => app.notify_error("Таймер уже остановлен"),
                },
                KeyCode::Char('t') => {
                    if timer.is_open() {
                        enqueue_action(action_tx, command(TimerOp::Stop));
                    } else {
                        app.notify_error("Таймер уже остановлен");
                    }
                }
                KeyCode::Char('p') => enqueue_action(
                    action_tx,
                    update(TimerEdit {
                        is_paid: Some(!timer.is_paid),
                        ..Default::default()
                    }),
                ),
                KeyCode::Char('l') => enqueue_action(
                    action_tx,
                    update(TimerEdit {
                        is_logged: Some(!timer.is_logged),
                        ..Default::default()
                    }),
                ),
                KeyCode::Char('d') => {
                    let subject = format!("Таймер «{}» будет удалён.", timer.display_name());
                    app.confirm(
                        ConfirmKind::DeleteTimer {
                            project_id: project_id.clone(),
                            timer_id: timer.id.clone(),
                        },
                        subject,
                    );
                }
                _ => {}
            }
        }
    }
}

fn screen_title(app: &App) -> String {
    app.timers
        .as_ref()
        .map(|t| t.title().to_string())
        .unwrap_or_default()
}

fn handle_edit_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    let Some(screen) = app.timers.as_mut() else {
        return;
    };
    let project_id = screen.project_id.clone();
    let Some(timer_id) = screen.selected_timer().map(|t| t.id.clone()) else {
        return;
    };
    let Some(draft) = screen.editing_draft_mut() else {
        return;
    };

    match key.code {
        KeyCode::Tab | KeyCode::Down => draft.focused = draft.focused.next(),
        KeyCode::BackTab | KeyCode::Up => draft.focused = draft.focused.previous(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => draft.input_char(c),
        KeyCode::Backspace => draft.backspace(),
        KeyCode::Left => draft.focused_input().move_left(),
        KeyCode::Right => draft.focused_input().move_right(),
        KeyCode::Home => draft.focused_input().home(),
        KeyCode::End => draft.focused_input().end(),
        KeyCode::Esc => screen.cancel_editing(),
        KeyCode::Enter => match draft.to_edit() {
            Err(e) => draft.error = Some(e.to_string()),
            Ok(edit) if edit == TimerEdit::default() => screen.cancel_editing(),
            Ok(edit) => enqueue_action(
                action_tx,
                Action::UpdateTimer {
                    project_id,
                    timer_id,
                    edit,
                },
            ),
        },
        _ => {}
    }
}
