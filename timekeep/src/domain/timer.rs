use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ProjectId, TimerId, UserId};

/// A timer as returned by the backend.
///
/// `paused_at` is present exactly when `is_paused` is set. Once `end_time` is
/// set the timer can no longer be paused, resumed or stopped. The in-progress
/// pause segment is not part of `total_pause` until the timer is resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub paused_at: Option<OffsetDateTime>,
    /// Accumulated paused seconds of finished pause segments.
    #[serde(default)]
    pub total_pause: i64,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_logged: bool,
    /// Missing when the timer is nested inside its project's payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    Paused,
    Stopped,
}

impl Timer {
    pub fn new(
        id: impl Into<TimerId>,
        name: impl Into<String>,
        start_time: OffsetDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            start_time,
            end_time: None,
            is_paused: false,
            paused_at: None,
            total_pause: 0,
            is_paid: false,
            is_logged: false,
            project_id: None,
            user_id: None,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_total_pause(mut self, seconds: i64) -> Self {
        self.total_pause = seconds;
        self
    }

    pub fn paused_since(mut self, at: OffsetDateTime) -> Self {
        self.is_paused = true;
        self.paused_at = Some(at);
        self
    }

    pub fn ended_at(mut self, at: OffsetDateTime) -> Self {
        self.end_time = Some(at);
        self.is_paused = false;
        self.paused_at = None;
        self
    }

    pub fn with_paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }

    pub fn with_logged(mut self, is_logged: bool) -> Self {
        self.is_logged = is_logged;
        self
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Open and not paused, i.e. the elapsed value is moving.
    pub fn is_running(&self) -> bool {
        self.is_open() && !self.is_paused
    }

    pub fn status(&self) -> TimerStatus {
        if !self.is_open() {
            TimerStatus::Stopped
        } else if self.is_paused {
            TimerStatus::Paused
        } else {
            TimerStatus::Running
        }
    }

    /// The in-progress pause segment start, if the timer is paused right now.
    pub fn current_pause_start(&self) -> Option<OffsetDateTime> {
        if self.is_paused {
            self.paused_at
        } else {
            None
        }
    }

    /// Display name, falling back to the placeholder used for unnamed timers.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Без названия"
        } else {
            &self.name
        }
    }
}
