use crate::domain::column::{Column, ColumnId};
use crate::domain::task::{Task, TaskId};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Configuration for a single board column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: ColumnId,
    pub title: String,
}

impl ColumnConfig {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<ColumnConfig>,
    /// Column new tasks land in when no status is given; the first column if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_column: Option<ColumnId>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Project Board".to_string(),
            columns: vec![
                ColumnConfig::new("todo", "To Do"),
                ColumnConfig::new("inProgress", "In Progress"),
                ColumnConfig::new("done", "Done"),
            ],
            default_column: None,
        }
    }
}

impl BoardConfig {
    /// Rejects empty or duplicate column sets and unknown default columns
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(BoardError::validation("Board needs at least one column"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.id.as_str().trim().is_empty() {
                return Err(BoardError::validation("Column id must not be empty"));
            }
            if !seen.insert(&column.id) {
                return Err(BoardError::validation(format!(
                    "Duplicate column id: {}",
                    column.id
                )));
            }
        }

        if let Some(default) = &self.default_column {
            if !seen.contains(default) {
                return Err(BoardError::validation(format!(
                    "Default column {} is not a configured column",
                    default
                )));
            }
        }

        Ok(())
    }

    /// Column that receives tasks created without an explicit status
    pub fn default_column(&self) -> Option<&ColumnId> {
        self.default_column
            .as_ref()
            .or_else(|| self.columns.first().map(|c| &c.id))
    }
}

/// Snapshot of the whole board: tasks, columns and column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub config: BoardConfig,
    pub tasks: HashMap<TaskId, Task>,
    pub columns: HashMap<ColumnId, Column>,
    pub column_order: Vec<ColumnId>,
}

impl Board {
    /// Creates an empty board with the configured columns in configured order
    pub fn new(config: BoardConfig) -> Result<Self> {
        config.validate()?;

        let columns = config
            .columns
            .iter()
            .map(|c| (c.id.clone(), Column::new(c.id.clone(), c.title.clone())))
            .collect();
        let column_order = config.columns.iter().map(|c| c.id.clone()).collect();

        Ok(Self {
            config,
            tasks: HashMap::new(),
            columns,
            column_order,
        })
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Finds the column whose sequence holds the task
    pub fn column_of(&self, task_id: &TaskId) -> Option<&Column> {
        self.column_order
            .iter()
            .filter_map(|id| self.columns.get(id))
            .find(|column| column.contains(task_id))
    }

    /// Columns in display order
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|id| self.columns.get(id))
    }

    /// Tasks of a column in their board order
    pub fn tasks_in_column(&self, column_id: &ColumnId) -> Result<Vec<&Task>> {
        let column = self
            .columns
            .get(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;

        Ok(column
            .task_ids
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect())
    }

    /// Verifies the cross-reference invariants between tasks, columns and order
    pub fn check_invariants(&self) -> Result<()> {
        self.config.validate()?;

        let mut placed: HashMap<&TaskId, &ColumnId> = HashMap::new();

        for (column_id, column) in &self.columns {
            if &column.id != column_id {
                return Err(BoardError::validation(format!(
                    "Column keyed {} carries id {}",
                    column_id, column.id
                )));
            }

            for task_id in &column.task_ids {
                let task = self.tasks.get(task_id).ok_or_else(|| {
                    BoardError::validation(format!(
                        "Column {} references unknown task {}",
                        column_id, task_id
                    ))
                })?;

                if let Some(other) = placed.insert(task_id, column_id) {
                    return Err(BoardError::validation(format!(
                        "Task {} appears in both {} and {}",
                        task_id, other, column_id
                    )));
                }

                if &task.status != column_id {
                    return Err(BoardError::validation(format!(
                        "Task {} has status {} but sits in column {}",
                        task_id, task.status, column_id
                    )));
                }
            }
        }

        for (task_id, task) in &self.tasks {
            if &task.id != task_id {
                return Err(BoardError::validation(format!(
                    "Task keyed {} carries id {}",
                    task_id, task.id
                )));
            }
            if !placed.contains_key(task_id) {
                return Err(BoardError::validation(format!(
                    "Task {} is not in any column",
                    task_id
                )));
            }
        }

        check_permutation(&self.column_order, &self.columns)?;

        let configured: HashSet<&ColumnId> = self.config.columns.iter().map(|c| &c.id).collect();
        let actual: HashSet<&ColumnId> = self.columns.keys().collect();
        if configured != actual {
            return Err(BoardError::validation(
                "Board columns do not match the configured columns",
            ));
        }

        Ok(())
    }
}

/// Checks that `order` names every column exactly once
pub(crate) fn check_permutation(
    order: &[ColumnId],
    columns: &HashMap<ColumnId, Column>,
) -> Result<()> {
    if order.len() != columns.len() {
        return Err(BoardError::validation(format!(
            "Column order has {} entries, expected {}",
            order.len(),
            columns.len()
        )));
    }

    let mut seen = HashSet::new();
    for id in order {
        if !columns.contains_key(id) {
            return Err(BoardError::validation(format!(
                "Column order names unknown column {}",
                id
            )));
        }
        if !seen.insert(id) {
            return Err(BoardError::validation(format!(
                "Column order repeats column {}",
                id
            )));
        }
    }

    Ok(())
}
