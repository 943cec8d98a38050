use timekeep::domain::{CategoryId, ProjectId, TimerId};
use timekeep::dto::{ProjectInput, TimerEdit};
use timekeep::QueryKey;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TimerOp {
    Pause,
    Resume,
    Stop,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Action {
    SubmitAuth,
    Logout,
    /// Refetch one query, bypassing the cache.
    Reload(QueryKey),
    /// Read every query the current screen shows (cache first).
    LoadVisible,
    CreateCategory {
        name: String,
    },
    DeleteCategory(CategoryId),
    SaveProject {
        id: Option<ProjectId>,
        input: ProjectInput,
    },
    DeleteProject(ProjectId),
    CreateTimer {
        project_id: ProjectId,
        name: String,
    },
    TimerCommand {
        project_id: ProjectId,
        timer_id: TimerId,
        op: TimerOp,
    },
    UpdateTimer {
        project_id: ProjectId,
        timer_id: TimerId,
        edit: TimerEdit,
    },
    MarkAllPaid(ProjectId),
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
