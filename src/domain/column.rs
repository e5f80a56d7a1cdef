use crate::domain::task::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a board column; a task's status is the id of its column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column and the ordered ids of the tasks it holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.task_ids.contains(task_id)
    }

    /// Index of a task within this column
    pub fn position_of(&self, task_id: &TaskId) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }

    /// Whether `task_id` sits exactly at `index`
    pub fn holds_at(&self, task_id: &TaskId, index: usize) -> bool {
        self.task_ids.get(index) == Some(task_id)
    }

    pub(crate) fn push(&mut self, task_id: TaskId) {
        self.task_ids.push(task_id);
    }

    /// Inserts at `index`, clamped to the end of the sequence
    pub(crate) fn insert_clamped(&mut self, index: usize, task_id: TaskId) -> usize {
        let index = index.min(self.task_ids.len());
        self.task_ids.insert(index, task_id);
        index
    }

    pub(crate) fn remove(&mut self, task_id: &TaskId) {
        self.task_ids.retain(|id| id != task_id);
    }
}
