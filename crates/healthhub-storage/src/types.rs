use healthhub_core::{Priority, WorkflowStatus};
use serde::{Deserialize, Serialize};

/// Filter applied to exam work-queue listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamFilter {
    pub status: Option<WorkflowStatus>,
    pub priority: Option<Priority>,
}

impl ExamFilter {
    /// Whether an exam with the given status and priority passes the filter.
    pub fn matches(&self, status: WorkflowStatus, priority: Priority) -> bool {
        self.status.is_none_or(|s| s == status) && self.priority.is_none_or(|p| p == priority)
    }
}
