use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;

use super::super::action_queue::{Action, ActionTx};
use super::{enqueue_action, reload_visible};

pub(super) fn handle_statistics_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            app.statistics.previous_period();
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.statistics.next_period();
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Char('f') => {
            app.statistics.next_filter();
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Down | KeyCode::Char('j') => app.statistics.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.statistics.scroll_up(),
        KeyCode::Char('r') => reload_visible(app, action_tx),
        KeyCode::Esc | KeyCode::Char('s') => {
            app.back_to_projects();
            enqueue_action(action_tx, Action::LoadVisible);
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use timekeep::domain::{PaidFilter, Period};
    use timekeep::{QueryKey, Route};

    fn stats_app() -> App {
        let mut app = signed_in_app();
        app.navigate(Route::Statistics);
        app
    }

    #[test]
    fn selectors_change_the_visible_query() {
        let mut app = stats_app();
        let actions = press(&mut app, &[key(KeyCode::Right), key(KeyCode::Char('f'))]);
        assert_eq!(actions, vec![Action::LoadVisible, Action::LoadVisible]);
        assert_eq!(
            app.visible_keys(),
            vec![QueryKey::Statistics {
                period: Period::Month,
                paid_filter: PaidFilter::Paid,
            }]
        );
    }

    #[test]
    fn period_selector_wraps_backwards() {
        let mut app = stats_app();
        press(&mut app, &[key(KeyCode::Left)]);
        assert_eq!(app.statistics.period, Period::All);
    }

    #[test]
    fn escape_goes_back() {
        let mut app = stats_app();
        press(&mut app, &[key(KeyCode::Esc)]);
        assert_eq!(app.route, Route::Projects);
    }
}
