use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ProjectId, TimerId};

/// Reporting window for `GET /timers/statistics/{period}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Year, Period::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Week => "Неделя",
            Period::Month => "Месяц",
            Period::Year => "Год",
            Period::All => "Все",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

/// Which timers contribute to the per-project breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

impl PaidFilter {
    pub const ALL: [PaidFilter; 3] = [PaidFilter::All, PaidFilter::Paid, PaidFilter::Unpaid];

    pub fn as_str(self) -> &'static str {
        match self {
            PaidFilter::All => "all",
            PaidFilter::Paid => "paid",
            PaidFilter::Unpaid => "unpaid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaidFilter::All => "Все",
            PaidFilter::Paid => "Оплаченные",
            PaidFilter::Unpaid => "Неоплаченные",
        }
    }

    pub fn next(self) -> Self {
        match self {
            PaidFilter::All => PaidFilter::Paid,
            PaidFilter::Paid => PaidFilter::Unpaid,
            PaidFilter::Unpaid => PaidFilter::All,
        }
    }

    pub fn accepts(self, is_paid: bool) -> bool {
        match self {
            PaidFilter::All => true,
            PaidFilter::Paid => is_paid,
            PaidFilter::Unpaid => !is_paid,
        }
    }
}

impl std::fmt::Display for PaidFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaidFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(PaidFilter::All),
            "paid" => Ok(PaidFilter::Paid),
            "unpaid" => Ok(PaidFilter::Unpaid),
            _ => Err(format!("Unknown paid filter: {}", s)),
        }
    }
}

/// Aggregates computed server-side. All durations are seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub total_time: i64,
    #[serde(default)]
    pub total_paid_time: i64,
    #[serde(default)]
    pub total_unpaid_time: i64,
    #[serde(default)]
    pub project_stats: Vec<ProjectStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStat {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub total_time: i64,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub timers: Vec<TimerStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStat {
    pub id: TimerId,
    #[serde(default)]
    pub name: String,
    /// Elapsed seconds within the period.
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        self.project_stats.is_empty()
    }

    /// Share of each project in the total, in percent. Zero totals yield zero shares.
    pub fn project_shares(&self) -> Vec<(&ProjectStat, f64)> {
        let total: i64 = self.project_stats.iter().map(|p| p.total_time.max(0)).sum();
        self.project_stats
            .iter()
            .map(|p| {
                let share = if total > 0 {
                    p.total_time.max(0) as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                (p, share)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_cycles_through_all_values() {
        assert_eq!(Period::Week.next(), Period::Month);
        assert_eq!(Period::All.next(), Period::Week);
        assert_eq!(Period::Week.previous(), Period::All);
        assert_eq!("YEAR".parse::<Period>().unwrap(), Period::Year);
        assert!("decade".parse::<Period>().is_err());
    }

    #[test]
    fn paid_filter_accepts_matching_timers() {
        assert!(PaidFilter::All.accepts(true));
        assert!(PaidFilter::All.accepts(false));
        assert!(PaidFilter::Paid.accepts(true));
        assert!(!PaidFilter::Paid.accepts(false));
        assert!(PaidFilter::Unpaid.accepts(false));
    }

    #[test]
    fn project_shares_sum_to_hundred() {
        let raw = r#"{
            "totalTime": 4000,
            "totalPaidTime": 1000,
            "totalUnpaidTime": 3000,
            "projectStats": [
                { "id": "a", "name": "A", "totalTime": 1000, "isPaid": true, "timers": [] },
                { "id": "b", "name": "B", "totalTime": 3000, "isPaid": false, "timers": [] }
            ]
        }"#;
        let stats: Statistics = serde_json::from_str(raw).unwrap();
        let shares: Vec<f64> = stats.project_shares().into_iter().map(|(_, s)| s).collect();
        assert_eq!(shares, vec![25.0, 75.0]);
    }
}
