use std::time::Instant;

use time::OffsetDateTime;
use timekeep::domain::{PaidStatus, ProjectDetail, ProjectId, Timer, TimerId};
use timekeep::ElapsedTicker;

use super::edit::{CardMode, TimerDraft};

/// One visible timer with its own ticker and edit state.
#[derive(Debug, Clone)]
pub struct TimerCard {
    pub ticker: ElapsedTicker,
    pub mode: CardMode,
}

impl TimerCard {
    pub fn timer(&self) -> &Timer {
        self.ticker.snapshot()
    }
}

/// Timers of a single project.
#[derive(Debug, Clone)]
pub struct TimersScreen {
    pub project_id: ProjectId,
    pub detail: Option<ProjectDetail>,
    pub cards: Vec<TimerCard>,
    pub selected: usize,
}

impl TimersScreen {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            detail: None,
            cards: Vec::new(),
            selected: 0,
        }
    }

    pub fn title(&self) -> &str {
        self.detail.as_ref().map_or("", |d| d.name.as_str())
    }

    pub fn paid_status(&self) -> Option<PaidStatus> {
        self.detail.as_ref().and_then(ProjectDetail::paid_status)
    }

    /// Replace the snapshots with freshly fetched ones.
    ///
    /// Cards that survive keep their edit mode; tickers are re-armed or
    /// disarmed from the new snapshot.
    pub fn sync(&mut self, detail: ProjectDetail, wall: OffsetDateTime, mono: Instant) {
        let selected_id = self.selected_card().map(|c| c.timer().id.clone());
        let mut previous = std::mem::take(&mut self.cards);

        self.cards = detail
            .timers
            .iter()
            .map(|timer| {
                match previous
                    .iter()
                    .position(|c| c.timer().id == timer.id)
                {
                    Some(pos) => {
                        let mut card = previous.swap_remove(pos);
                        card.ticker.update(timer.clone(), wall, mono);
                        card
                    }
                    None => TimerCard {
                        ticker: ElapsedTicker::new(timer.clone(), wall, mono),
                        mode: CardMode::Viewing,
                    },
                }
            })
            .collect();
        self.detail = Some(detail);

        self.selected = selected_id
            .and_then(|id| self.cards.iter().position(|c| c.timer().id == id))
            .unwrap_or(0)
            .min(self.cards.len().saturating_sub(1));
    }

    /// Advance every armed ticker. Returns whether any display changed.
    pub fn tick(&mut self, wall: OffsetDateTime, mono: Instant) -> bool {
        let mut changed = false;
        for card in &mut self.cards {
            changed |= card.ticker.tick(wall, mono);
        }
        changed
    }

    pub fn selected_card(&self) -> Option<&TimerCard> {
        self.cards.get(self.selected)
    }

    pub fn selected_card_mut(&mut self) -> Option<&mut TimerCard> {
        self.cards.get_mut(self.selected)
    }

    pub fn card_mut(&mut self, id: &TimerId) -> Option<&mut TimerCard> {
        self.cards.iter_mut().find(|c| &c.timer().id == id)
    }

    pub fn selected_timer(&self) -> Option<&Timer> {
        self.selected_card().map(TimerCard::timer)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.cards.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn is_editing(&self) -> bool {
        self.cards.iter().any(|c| c.mode.is_editing())
    }

    pub fn start_editing(&mut self, now: OffsetDateTime) {
        if let Some(card) = self.selected_card_mut() {
            if !card.mode.is_editing() {
                card.mode = CardMode::Editing(TimerDraft::from_timer(card.timer(), now));
            }
        }
    }

    pub fn cancel_editing(&mut self) {
        if let Some(card) = self.selected_card_mut() {
            card.mode = CardMode::Viewing;
        }
    }

    pub fn editing_draft_mut(&mut self) -> Option<&mut TimerDraft> {
        self.selected_card_mut().and_then(|c| c.mode.draft_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    const T: OffsetDateTime = datetime!(2024-05-10 08:00 UTC);

    fn detail(timers: Vec<Timer>) -> ProjectDetail {
        ProjectDetail {
            id: ProjectId::new("p1"),
            name: "Site".to_string(),
            description: None,
            category_id: None,
            timers,
        }
    }

    #[test]
    fn refetch_keeps_the_draft_but_updates_the_snapshot() {
        let mono = Instant::now();
        let mut screen = TimersScreen::new(ProjectId::new("p1"));
        screen.sync(detail(vec![Timer::new("t1", "Old", T)]), T, mono);
        screen.start_editing(T + Duration::seconds(10));
        screen
            .editing_draft_mut()
            .unwrap()
            .name
            .insert('!');

        let renamed = Timer::new("t1", "New", T).paused_since(T + Duration::seconds(20));
        screen.sync(detail(vec![renamed]), T + Duration::seconds(30), mono);

        let card = screen.selected_card().unwrap();
        assert_eq!(card.timer().name, "New");
        assert!(!card.ticker.is_armed());
        match &card.mode {
            CardMode::Editing(draft) => assert_eq!(draft.name.value, "Old!"),
            CardMode::Viewing => panic!("draft was dropped"),
        }
    }

    #[test]
    fn selection_follows_the_timer_across_reorders() {
        let mono = Instant::now();
        let mut screen = TimersScreen::new(ProjectId::new("p1"));
        screen.sync(
            detail(vec![Timer::new("a", "", T), Timer::new("b", "", T)]),
            T,
            mono,
        );
        screen.select_next();

        screen.sync(
            detail(vec![
                Timer::new("c", "", T),
                Timer::new("b", "", T),
                Timer::new("a", "", T),
            ]),
            T,
            mono,
        );
        assert_eq!(screen.selected_timer().unwrap().id.as_str(), "b");

        screen.sync(detail(vec![]), T, mono);
        assert!(screen.selected_card().is_none());
        assert_eq!(screen.paid_status(), None);
    }

    #[test]
    fn only_running_cards_tick() {
        let mono = Instant::now();
        let mut screen = TimersScreen::new(ProjectId::new("p1"));
        screen.sync(
            detail(vec![
                Timer::new("run", "", T),
                Timer::new("stop", "", T).ended_at(T + Duration::seconds(5)),
            ]),
            T + Duration::seconds(5),
            mono,
        );

        assert!(screen.tick(
            T + Duration::seconds(6),
            mono + std::time::Duration::from_secs(1)
        ));
        assert_eq!(screen.cards[0].ticker.displayed(), 6);
        assert_eq!(screen.cards[1].ticker.displayed(), 5);
    }
}
