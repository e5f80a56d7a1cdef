//! Request and response bodies of the network-facing board surface
//!
//! Routing lives outside this crate; these types fix the JSON exchanged for
//! each operation so any HTTP layer can forward straight to [`SharedBoard`].
//!
//! [`SharedBoard`]: crate::SharedBoard

use crate::domain::{ColumnId, NewTask, TaskId, TaskPatch};
use crate::error::BoardError;
use crate::intent::MoveIntent;
use crate::manager::MoveOutcome;
use serde::{Deserialize, Serialize};

pub type CreateTaskRequest = NewTask;
pub type UpdateTaskRequest = TaskPatch;
pub type MoveTaskResponse = MoveOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderColumnsRequest {
    pub order: Vec<ColumnId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderColumnsResponse {
    pub column_order: Vec<ColumnId>,
}

/// Body of a move request; the task id travels in the path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub source_id: ColumnId,
    pub destination_id: ColumnId,
    pub source_index: usize,
    #[serde(default)]
    pub destination_index: Option<usize>,
}

impl MoveTaskRequest {
    pub fn into_intent(self, task_id: TaskId) -> MoveIntent {
        MoveIntent {
            task_id,
            source_id: self.source_id,
            destination_id: self.destination_id,
            source_index: self.source_index,
            destination_index: self.destination_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub message: String,
}

impl Default for DeleteTaskResponse {
    fn default() -> Self {
        Self {
            message: "Task deleted successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<&BoardError> for ErrorResponse {
    fn from(err: &BoardError) -> Self {
        Self {
            error: err.to_string(),
            status: err.kind().http_status(),
        }
    }
}
