use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_auth_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_auth_mode();
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            app.auth.next_field();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.auth.focused_input().insert(c);
            app.auth.error = None;
        }
        KeyCode::Backspace => app.auth.focused_input().backspace(),
        KeyCode::Left => app.auth.focused_input().move_left(),
        KeyCode::Right => app.auth.focused_input().move_right(),
        KeyCode::Home => app.auth.focused_input().home(),
        KeyCode::End => app.auth.focused_input().end(),
        KeyCode::Enter => {
            if !app.auth.submitting {
                enqueue_action(action_tx, Action::SubmitAuth);
            }
        }
        KeyCode::Esc => app.quit(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::app::{AuthField, AuthMode};
    use crate::config::TimekeepConfig;
    use timekeep::Route;

    fn login_app() -> App {
        App::new(&TimekeepConfig::default(), false)
    }

    #[test]
    fn typing_fills_the_focused_field() {
        let mut app = login_app();
        type_text(&mut app, "me@x.ru");
        press(&mut app, &[key(KeyCode::Tab)]);
        type_text(&mut app, "secret");

        assert_eq!(app.auth.email.value, "me@x.ru");
        assert_eq!(app.auth.password.value, "secret");
        assert_eq!(app.auth.focused, AuthField::Password);
    }

    #[test]
    fn letters_are_not_shortcuts_on_the_login_screen() {
        let mut app = login_app();
        type_text(&mut app, "q");
        assert!(app.running);
        assert_eq!(app.auth.email.value, "q");
    }

    #[test]
    fn enter_submits_once() {
        let mut app = login_app();
        assert_eq!(press(&mut app, &[key(KeyCode::Enter)]), vec![Action::SubmitAuth]);

        app.auth.submitting = true;
        assert!(press(&mut app, &[key(KeyCode::Enter)]).is_empty());
    }

    #[test]
    fn ctrl_r_switches_to_register() {
        let mut app = login_app();
        press(&mut app, &[ctrl('r')]);
        assert_eq!(app.auth.mode, AuthMode::Register);
        assert_eq!(app.route, Route::Register);
    }
}
