use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::{backend::CrosstermBackend, Terminal};
use time::OffsetDateTime;
use timekeep::{QueryKey, Store};
use tokio::sync::broadcast::{error::TryRecvError, Receiver};

use crate::app::App;
use crate::ui;

use super::action_queue::{channel, Action, ActionTx};
use super::actions::run_action;
use super::views::handle_key;

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &Store,
) -> Result<()> {
    let (action_tx, mut action_rx) = channel();
    let mut invalidated = store.cache().subscribe();
    let _ = action_tx.send(Action::LoadVisible);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.is_loading {
            app.throbber_state.calc_next();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(key, app, &action_tx);
            }
        }

        while let Ok(action) = action_rx.try_recv() {
            run_action(action, app, store).await;
        }

        queue_reloads(&mut invalidated, app, &action_tx);

        let now = Instant::now();
        if let Some(timers) = app.timers.as_mut() {
            timers.tick(OffsetDateTime::now_utc(), now);
        }
        app.expire_notification(now);

        if !app.running {
            break;
        }
    }

    Ok(())
}

/// Turn invalidation notices into refetches of whatever is on screen.
fn queue_reloads(invalidated: &mut Receiver<QueryKey>, app: &App, action_tx: &ActionTx) {
    let visible = app.visible_keys();
    let mut pending: Vec<QueryKey> = Vec::new();
    loop {
        match invalidated.try_recv() {
            Ok(key) => {
                if visible.contains(&key) && !pending.contains(&key) {
                    pending.push(key);
                }
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "invalidation receiver lagged, reloading screen");
                pending = visible.clone();
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    for key in pending {
        let _ = action_tx.send(Action::Reload(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimekeepConfig;
    use timekeep::{Invalidate, QueryCache, QueryData};

    #[test]
    fn only_visible_invalidations_are_reloaded() {
        let cache = QueryCache::new();
        let mut rx = cache.subscribe();
        cache.insert(QueryKey::Categories, QueryData::Categories(Vec::new()));
        cache.insert(
            QueryKey::Projects { category: None },
            QueryData::Projects(Vec::new()),
        );
        cache.invalidate(&[
            Invalidate::Key(QueryKey::Categories),
            Invalidate::AllProjects,
            Invalidate::Key(QueryKey::Categories),
            Invalidate::AllStatistics,
        ]);

        let app = App::new(&TimekeepConfig::default(), true);
        let (tx, mut actions) = channel();
        queue_reloads(&mut rx, &app, &tx);

        let mut queued = Vec::new();
        while let Ok(action) = actions.try_recv() {
            queued.push(action);
        }
        assert_eq!(queued.len(), 2);
        assert!(queued.contains(&Action::Reload(QueryKey::Categories)));
        assert!(queued.contains(&Action::Reload(QueryKey::Projects { category: None })));
    }
}
