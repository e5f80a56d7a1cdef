//! Translation of drag-and-drop gestures into move intents
//!
//! The drag layer only reports which task was picked up and what it was
//! released over. This module derives the source position and destination
//! index from the current board so the manager can validate and apply them.

use crate::domain::{Board, ColumnId, TaskId};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};

/// What the pointer was over when a dragged task was released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum DropTarget {
    /// Another task card
    Task(TaskId),
    /// The empty area of a column
    Column(ColumnId),
}

/// A request to relocate one task
///
/// `source_index` is where the caller believes the task currently sits;
/// the manager rejects the intent if that is no longer true.
/// A `destination_index` of `None` appends to the end of the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    pub task_id: TaskId,
    pub source_id: ColumnId,
    pub destination_id: ColumnId,
    pub source_index: usize,
    #[serde(default)]
    pub destination_index: Option<usize>,
}

impl MoveIntent {
    /// Move to an explicit index of the destination column
    pub fn new(
        task_id: impl Into<TaskId>,
        source_id: impl Into<ColumnId>,
        source_index: usize,
        destination_id: impl Into<ColumnId>,
        destination_index: usize,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            source_id: source_id.into(),
            destination_id: destination_id.into(),
            source_index,
            destination_index: Some(destination_index),
        }
    }

    /// Move to the end of the destination column
    pub fn to_column_end(
        task_id: impl Into<TaskId>,
        source_id: impl Into<ColumnId>,
        source_index: usize,
        destination_id: impl Into<ColumnId>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            source_id: source_id.into(),
            destination_id: destination_id.into(),
            source_index,
            destination_index: None,
        }
    }

    pub fn is_same_column(&self) -> bool {
        self.source_id == self.destination_id
    }
}

/// Resolves a drop gesture against the current board
///
/// Dropping onto a task targets that task's current index, so the dragged
/// task lands before it (within one column the usual array-move rule
/// applies). Dropping onto a column's empty area appends. Returns `None`
/// when the drop changes nothing: onto itself, or onto its own column's area.
pub fn resolve_drop(
    board: &Board,
    active: &TaskId,
    over: &DropTarget,
) -> Result<Option<MoveIntent>> {
    let source = board
        .column_of(active)
        .ok_or_else(|| BoardError::TaskNotFound(active.to_string()))?;
    let source_index = source
        .position_of(active)
        .ok_or_else(|| BoardError::TaskNotFound(active.to_string()))?;

    match over {
        DropTarget::Task(over_id) => {
            if over_id == active {
                return Ok(None);
            }

            let target = board
                .column_of(over_id)
                .ok_or_else(|| BoardError::TaskNotFound(over_id.to_string()))?;
            let target_index = target
                .position_of(over_id)
                .ok_or_else(|| BoardError::TaskNotFound(over_id.to_string()))?;

            Ok(Some(MoveIntent::new(
                active.clone(),
                source.id.clone(),
                source_index,
                target.id.clone(),
                target_index,
            )))
        }
        DropTarget::Column(column_id) => {
            if board.column(column_id).is_none() {
                return Err(BoardError::ColumnNotFound(column_id.to_string()));
            }
            if column_id == &source.id {
                return Ok(None);
            }

            Ok(Some(MoveIntent::to_column_end(
                active.clone(),
                source.id.clone(),
                source_index,
                column_id.clone(),
            )))
        }
    }
}
