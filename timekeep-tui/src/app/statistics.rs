use timekeep::domain::{PaidFilter, Period, Statistics};
use timekeep::QueryKey;

#[derive(Debug, Clone, Default)]
pub struct StatisticsScreen {
    pub period: Period,
    pub paid_filter: PaidFilter,
    pub data: Option<Statistics>,
    pub scroll: u16,
}

impl StatisticsScreen {
    pub fn key(&self) -> QueryKey {
        QueryKey::Statistics {
            period: self.period,
            paid_filter: self.paid_filter,
        }
    }

    pub fn next_period(&mut self) {
        self.period = self.period.next();
        self.reset();
    }

    pub fn previous_period(&mut self) {
        self.period = self.period.previous();
        self.reset();
    }

    pub fn next_filter(&mut self) {
        self.paid_filter = self.paid_filter.next();
        self.reset();
    }

    fn reset(&mut self) {
        self.data = None;
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}
