use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, ConfirmKind, Modal, NameForm, ProjectField};

use super::super::action_queue::{Action, ActionTx, TimerOp};
use super::enqueue_action;

pub(super) fn handle_modal_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if key.code == KeyCode::Esc {
        app.close_modal();
        return;
    }

    let categories = &app.projects.categories;
    let Some(modal) = app.modal.as_mut() else {
        return;
    };

    match modal {
        Modal::Project(form) => match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left if form.focused == ProjectField::Category => {
                form.cycle_category(categories, false)
            }
            KeyCode::Right | KeyCode::Char(' ') if form.focused == ProjectField::Category => {
                form.cycle_category(categories, true)
            }
            KeyCode::Enter => match form.to_input() {
                Ok(input) => enqueue_action(
                    action_tx,
                    Action::SaveProject {
                        id: form.editing.clone(),
                        input,
                    },
                ),
                Err(e) => form.error = Some(e.to_string()),
            },
            code => {
                if let Some(input) = form.focused_input() {
                    edit_text(code, key.modifiers, input);
                    form.error = None;
                }
            }
        },
        Modal::Category(form) => {
            if let Some(name) = submit_name(key, form) {
                enqueue_action(action_tx, Action::CreateCategory { name });
            }
        }
        Modal::Timer { project_id, form } => {
            if let Some(name) = submit_name(key, form) {
                enqueue_action(
                    action_tx,
                    Action::CreateTimer {
                        project_id: project_id.clone(),
                        name,
                    },
                );
            }
        }
        Modal::Confirm(confirm) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let action = match &confirm.kind {
                    ConfirmKind::DeleteProject(id) => Action::DeleteProject(id.clone()),
                    ConfirmKind::DeleteCategory(id) => Action::DeleteCategory(id.clone()),
                    ConfirmKind::DeleteTimer {
                        project_id,
                        timer_id,
                    } => Action::TimerCommand {
                        project_id: project_id.clone(),
                        timer_id: timer_id.clone(),
                        op: TimerOp::Delete,
                    },
                    ConfirmKind::MarkAllPaid(id) => Action::MarkAllPaid(id.clone()),
                };
                enqueue_action(action_tx, action);
            }
            KeyCode::Char('n') | KeyCode::Char('N') => app.close_modal(),
            _ => {}
        },
    }
}

/// Text editing shared by every single-line field in a modal.
fn edit_text(code: KeyCode, modifiers: KeyModifiers, input: &mut crate::app::TextInput) {
    match code {
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

/// Returns the validated name when Enter was pressed on a valid form.
fn submit_name(key: KeyEvent, form: &mut NameForm) -> Option<String> {
    if key.code != KeyCode::Enter {
        edit_text(key.code, key.modifiers, &mut form.name);
        form.error = None;
        return None;
    }
    match form.value() {
        Ok(name) => Some(name),
        Err(e) => {
            form.error = Some(e.to_string());
            None
        }
    }
}
