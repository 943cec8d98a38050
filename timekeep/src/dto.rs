use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::{CategoryId, ProjectId};

#[derive(Debug, Clone, Serialize)]
pub struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryRequest<'a> {
    pub name: &'a str,
}

/// Body of `POST /projects` and `PATCH /projects/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Blank descriptions are sent as absent.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimerRequest<'a> {
    pub name: &'a str,
    pub project_id: &'a ProjectId,
}

/// Body of `PATCH /timers/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub start_time: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_logged: Option<bool>,
}

impl UpdateTimerRequest {
    pub fn paid(is_paid: bool) -> Self {
        Self {
            is_paid: Some(is_paid),
            ..Default::default()
        }
    }
}

/// A timer edit as the user expresses it: the duration, not a start instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Desired elapsed seconds, reconciled into a `startTime` before sending.
    pub elapsed: Option<u64>,
    pub is_paid: Option<bool>,
    pub is_logged: Option<bool>,
}

/// Error payload of the backend, `{ message, error, statusCode }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<ErrorMessage>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// Validation failures come back as a list of messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        match self.message {
            Some(ErrorMessage::One(m)) if !m.is_empty() => Some(m),
            Some(ErrorMessage::Many(list)) if !list.is_empty() => Some(list.join("; ")),
            _ => self.error,
        }
    }
}
