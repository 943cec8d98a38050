use serde::{Deserialize, Serialize};

use super::{CategoryId, ProjectId, Timer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A project as listed by `GET /projects`.
///
/// `total_time` and `is_paid` are computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Seconds.
    #[serde(default)]
    pub total_time: i64,
    #[serde(default)]
    pub is_paid: bool,
}

impl Project {
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category_id: None,
            category: None,
            total_time: 0,
            is_paid: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category_id = Some(category.id.clone());
        self.category = Some(category);
        self
    }

    /// The category reference, whichever way the backend chose to send it.
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category_id
            .as_ref()
            .or_else(|| self.category.as_ref().map(|c| &c.id))
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Payload of `GET /projects/{id}/timers`: the project with all its timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub timers: Vec<Timer>,
}

impl ProjectDetail {
    pub fn timer(&self, id: &super::TimerId) -> Option<&Timer> {
        self.timers.iter().find(|t| &t.id == id)
    }

    pub fn paid_status(&self) -> Option<PaidStatus> {
        paid_status(&self.timers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidStatus {
    Paid,
    Unpaid,
}

impl PaidStatus {
    pub fn from_flag(is_paid: bool) -> Self {
        if is_paid {
            PaidStatus::Paid
        } else {
            PaidStatus::Unpaid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaidStatus::Paid => "Оплачен",
            PaidStatus::Unpaid => "Не оплачен",
        }
    }
}

/// Paid badge for a set of timers. No badge at all for an empty project.
pub fn paid_status(timers: &[Timer]) -> Option<PaidStatus> {
    if timers.is_empty() {
        return None;
    }
    Some(PaidStatus::from_flag(timers.iter().all(|t| t.is_paid)))
}
