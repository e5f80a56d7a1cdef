use crate::domain::board::check_permutation;
use crate::domain::task::validate_title;
use crate::domain::{Board, BoardConfig, Column, ColumnId, NewTask, Task, TaskId, TaskPatch};
use crate::error::{BoardError, Result};
use crate::intent::{resolve_drop, DropTarget, MoveIntent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of a move: the moved task and the (at most two) columns it touched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub task: Task,
    pub columns: HashMap<ColumnId, Column>,
}

/// Owns the board and is its only mutation path
///
/// Every operation validates first and then swaps in freshly built task and
/// column values, so a failed call leaves the board untouched.
#[derive(Debug, Clone)]
pub struct BoardManager {
    board: Board,
}

impl BoardManager {
    /// Creates a manager over an empty board
    pub fn new(config: BoardConfig) -> Result<Self> {
        Ok(Self {
            board: Board::new(config)?,
        })
    }

    /// Adopts an existing snapshot, e.g. one loaded from storage
    pub fn from_board(board: Board) -> Result<Self> {
        board.check_invariants()?;
        Ok(Self { board })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Owned copy of the current board
    pub fn snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn task(&self, id: &TaskId) -> Result<&Task> {
        self.board
            .task(id)
            .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
    }

    fn column(&self, id: &ColumnId) -> Result<&Column> {
        self.board
            .column(id)
            .ok_or_else(|| BoardError::ColumnNotFound(id.to_string()))
    }

    /// Creates a task and appends it to its column
    pub fn create_task(&mut self, draft: NewTask) -> Result<Task> {
        validate_title(&draft.title)?;

        let status = match draft.status {
            Some(status) => status,
            None => self
                .board
                .config
                .default_column()
                .cloned()
                .ok_or_else(|| BoardError::validation("Board has no columns"))?,
        };
        let mut column = self.column(&status)?.clone();

        let mut task = Task::new(TaskId::generate(), draft.title.trim().to_string(), status);
        task.description = draft.description.unwrap_or_default();
        task.deadline = draft.deadline;
        task.assignee = draft.assignee.unwrap_or_default();
        task.priority = draft.priority.unwrap_or_default();

        column.push(task.id.clone());
        self.board.columns.insert(column.id.clone(), column);
        self.board.tasks.insert(task.id.clone(), task.clone());

        tracing::debug!(task_id = %task.id, column = %task.status, "Created task");
        self.debug_check();
        Ok(task)
    }

    /// Merges the provided fields into a task
    ///
    /// A status change moves the task to the end of the new column.
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        let current = self.task(id)?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        let mut updated = current.clone();
        updated.apply_fields(&patch);

        let relocation = match patch.status.as_ref() {
            Some(target) if target != &current.status => {
                let mut from = self.column(&current.status)?.clone();
                let mut to = self.column(target)?.clone();
                from.remove(id);
                to.push(id.clone());
                updated.status = target.clone();
                Some((from, to))
            }
            _ => None,
        };

        if let Some((from, to)) = relocation {
            tracing::debug!(task_id = %id, from = %from.id, to = %to.id, "Task changed status");
            self.board.columns.insert(from.id.clone(), from);
            self.board.columns.insert(to.id.clone(), to);
        }
        self.board.tasks.insert(id.clone(), updated.clone());

        tracing::debug!(task_id = %id, "Updated task");
        self.debug_check();
        Ok(updated)
    }

    /// Removes a task from its column and from the board
    pub fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        let task = self.task(id)?;
        let mut column = self.column(&task.status)?.clone();
        column.remove(id);

        self.board.columns.insert(column.id.clone(), column);
        self.board.tasks.remove(id);

        tracing::debug!(task_id = %id, "Deleted task");
        self.debug_check();
        Ok(())
    }

    /// Replaces the column display order; `order` must be a permutation of the columns
    pub fn reorder_columns(&mut self, order: Vec<ColumnId>) -> Result<Vec<ColumnId>> {
        check_permutation(&order, &self.board.columns)?;
        self.board.column_order = order;

        tracing::debug!(order = ?self.board.column_order, "Reordered columns");
        Ok(self.board.column_order.clone())
    }

    /// Moves a task within or across columns
    ///
    /// The task must sit at `source_index` of `source_id`; otherwise the intent
    /// is stale and [`BoardError::Conflict`] is returned. Indices are applied
    /// against the sequence with the task already removed, and the
    /// destination index is clamped to that sequence's length.
    pub fn move_task(&mut self, intent: &MoveIntent) -> Result<MoveOutcome> {
        let task = self.task(&intent.task_id)?;
        let source = self.column(&intent.source_id)?;
        let destination = self.column(&intent.destination_id)?;

        if !source.holds_at(&intent.task_id, intent.source_index) {
            return Err(BoardError::Conflict {
                task_id: intent.task_id.to_string(),
                column_id: intent.source_id.to_string(),
                index: intent.source_index,
            });
        }

        let mut task = task.clone();
        let mut source = source.clone();
        source.task_ids.remove(intent.source_index);

        let touched = if intent.is_same_column() {
            let index = intent.destination_index.unwrap_or(intent.source_index);
            let index = source.insert_clamped(index, intent.task_id.clone());
            tracing::debug!(
                task_id = %intent.task_id,
                column = %source.id,
                from = intent.source_index,
                to = index,
                "Reordered task within column"
            );
            vec![source]
        } else {
            let mut destination = destination.clone();
            let index = intent.destination_index.unwrap_or(destination.len());
            let index = destination.insert_clamped(index, intent.task_id.clone());
            tracing::debug!(
                task_id = %intent.task_id,
                from = %source.id,
                to = %destination.id,
                index,
                "Moved task across columns"
            );
            vec![source, destination]
        };

        task.status = intent.destination_id.clone();
        self.board.tasks.insert(task.id.clone(), task.clone());

        let mut columns = HashMap::new();
        for column in touched {
            self.board.columns.insert(column.id.clone(), column.clone());
            columns.insert(column.id.clone(), column);
        }

        self.debug_check();
        Ok(MoveOutcome { task, columns })
    }

    /// Resolves a drop gesture and applies it; `None` when the drop is a no-op
    pub fn dispatch_drop(
        &mut self,
        active: &TaskId,
        over: &DropTarget,
    ) -> Result<Option<MoveOutcome>> {
        match resolve_drop(&self.board, active, over)? {
            Some(intent) => self.move_task(&intent).map(Some),
            None => Ok(None),
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.board.check_invariants().is_ok(),
            "board invariants violated: {:?}",
            self.board.check_invariants()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sample_board, ColumnConfig, Priority};
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn manager() -> BoardManager {
        BoardManager::new(BoardConfig::default()).unwrap()
    }

    fn ids(manager: &BoardManager, column: &str) -> Vec<String> {
        manager
            .board()
            .column(&ColumnId::from(column))
            .unwrap()
            .task_ids
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    /// Board whose `todo` column holds tasks titled after `titles`, in order
    fn manager_with_todo(titles: &[&str]) -> (BoardManager, Vec<TaskId>) {
        let mut manager = manager();
        let task_ids: Vec<TaskId> = titles
            .iter()
            .map(|t| manager.create_task(NewTask::new(*t)).unwrap().id)
            .collect();
        (manager, task_ids)
    }

    fn titles(manager: &BoardManager, column: &str) -> Vec<String> {
        manager
            .board()
            .tasks_in_column(&ColumnId::from(column))
            .unwrap()
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn test_create_task_defaults() {
        let mut manager = manager();
        let task = manager.create_task(NewTask::new("Write docs")).unwrap();

        assert_eq!(task.title, "Write docs");
        assert_eq!(task.description, "");
        assert_eq!(task.assignee, "");
        assert!(task.deadline.is_none());
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status.as_str(), "todo");
        assert_eq!(ids(&manager, "todo"), vec![task.id.to_string()]);
    }

    #[test]
    fn test_create_task_in_given_column_appends() {
        let mut manager = manager();
        let first = manager
            .create_task(NewTask::new("First").with_status("done"))
            .unwrap();
        let second = manager
            .create_task(
                NewTask::new("Second")
                    .with_status("done")
                    .with_priority(Priority::High)
                    .with_assignee("Li Wei"),
            )
            .unwrap();

        assert_eq!(second.priority, Priority::High);
        assert_eq!(second.assignee, "Li Wei");
        assert_eq!(
            ids(&manager, "done"),
            vec![first.id.to_string(), second.id.to_string()]
        );
    }

    #[test]
    fn test_create_uses_configured_default_column() {
        let config = BoardConfig {
            default_column: Some(ColumnId::from("inProgress")),
            ..BoardConfig::default()
        };
        let mut manager = BoardManager::new(config).unwrap();
        manager
            .reorder_columns(vec!["done".into(), "todo".into(), "inProgress".into()])
            .unwrap();

        let task = manager.create_task(NewTask::new("Task")).unwrap();
        assert_eq!(task.status.as_str(), "inProgress");
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut manager = manager();
        let before = manager.snapshot();

        for title in ["", "   "] {
            let err = manager.create_task(NewTask::new(title)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_create_rejects_unknown_status() {
        let mut manager = manager();
        let before = manager.snapshot();

        let err = manager
            .create_task(NewTask::new("Task").with_status("backlog"))
            .unwrap_err();
        assert!(matches!(err, BoardError::ColumnNotFound(_)));
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_create_then_delete_restores_board() {
        let mut manager = BoardManager::from_board(sample_board(Utc::now()).unwrap()).unwrap();
        let before = manager.snapshot();

        let task = manager
            .create_task(NewTask::new("Temporary").with_status("inProgress"))
            .unwrap();
        assert_ne!(manager.snapshot(), before);

        manager.delete_task(&task.id).unwrap();
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut manager = manager();
        let task = manager
            .create_task(
                NewTask::new("Original")
                    .with_description("Details")
                    .with_assignee("Sarah Chen"),
            )
            .unwrap();

        let updated = manager
            .update_task(&task.id, TaskPatch::default().title("Renamed").assignee(""))
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.assignee, "");
        assert_eq!(updated.description, "Details");
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(manager.task(&task.id).unwrap(), &updated);
    }

    #[test]
    fn test_update_status_moves_to_end_of_new_column() {
        let (mut manager, ids_todo) = manager_with_todo(&["a", "b"]);
        let existing = manager
            .create_task(NewTask::new("c").with_status("done"))
            .unwrap();

        let updated = manager
            .update_task(&ids_todo[0], TaskPatch::default().status("done"))
            .unwrap();

        assert_eq!(updated.status.as_str(), "done");
        assert_eq!(titles(&manager, "todo"), vec!["b"]);
        assert_eq!(titles(&manager, "done"), vec!["c", "a"]);
        assert_eq!(ids(&manager, "done")[0], existing.id.to_string());
    }

    #[test]
    fn test_update_same_status_keeps_position() {
        let (mut manager, ids_todo) = manager_with_todo(&["a", "b", "c"]);
        manager
            .update_task(&ids_todo[0], TaskPatch::default().status("todo").title("A"))
            .unwrap();
        assert_eq!(titles(&manager, "todo"), vec!["A", "b", "c"]);
    }

    #[test]
    fn test_update_failures_leave_board_unchanged() {
        let (mut manager, ids_todo) = manager_with_todo(&["a"]);
        let before = manager.snapshot();

        let err = manager
            .update_task(&TaskId::from("nonexistent"), TaskPatch::default().title("x"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = manager
            .update_task(&ids_todo[0], TaskPatch::default().title(" "))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = manager
            .update_task(
                &ids_todo[0],
                TaskPatch::default().title("changed").status("backlog"),
            )
            .unwrap_err();
        assert!(matches!(err, BoardError::ColumnNotFound(_)));

        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_delete_unknown_task() {
        let (mut manager, _) = manager_with_todo(&["a"]);
        let before = manager.snapshot();

        let err = manager.delete_task(&TaskId::from("nonexistent")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_delete_removes_from_column() {
        let (mut manager, ids_todo) = manager_with_todo(&["a", "b", "c"]);
        manager.delete_task(&ids_todo[1]).unwrap();

        assert_eq!(titles(&manager, "todo"), vec!["a", "c"]);
        assert!(manager.task(&ids_todo[1]).is_err());
    }

    #[test]
    fn test_reorder_columns() {
        let mut manager = manager();
        let order = manager
            .reorder_columns(vec!["done".into(), "todo".into(), "inProgress".into()])
            .unwrap();

        let order: Vec<&str> = order.iter().map(|c| c.as_str()).collect();
        assert_eq!(order, vec!["done", "todo", "inProgress"]);
        assert_eq!(manager.board().column_order[0].as_str(), "done");
    }

    #[test]
    fn test_reorder_columns_rejects_non_permutations() {
        let mut manager = manager();
        let before = manager.snapshot();

        let invalid: Vec<Vec<ColumnId>> = vec![
            vec!["todo".into(), "done".into()],
            vec!["todo".into(), "todo".into(), "done".into()],
            vec!["todo".into(), "inProgress".into(), "backlog".into()],
            vec![
                "todo".into(),
                "inProgress".into(),
                "done".into(),
                "done".into(),
            ],
        ];
        for order in invalid {
            let err = manager.reorder_columns(order).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_move_within_column() {
        let (mut manager, t) = manager_with_todo(&["a", "b", "c", "d"]);

        let outcome = manager
            .move_task(&MoveIntent::new(t[2].clone(), "todo", 2, "todo", 0))
            .unwrap();

        assert_eq!(titles(&manager, "todo"), vec!["c", "a", "b", "d"]);
        assert_eq!(outcome.columns.len(), 1);
        assert_eq!(outcome.task.status.as_str(), "todo");
    }

    #[test]
    fn test_move_within_column_downwards() {
        let (mut manager, t) = manager_with_todo(&["a", "b", "c", "d"]);

        manager
            .move_task(&MoveIntent::new(t[0].clone(), "todo", 0, "todo", 2))
            .unwrap();
        assert_eq!(titles(&manager, "todo"), vec!["b", "c", "a", "d"]);

        manager
            .move_task(&MoveIntent::new(t[1].clone(), "todo", 0, "todo", 99))
            .unwrap();
        assert_eq!(titles(&manager, "todo"), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_move_across_columns() {
        let (mut manager, t) = manager_with_todo(&["a"]);

        let outcome = manager
            .move_task(&MoveIntent::new(t[0].clone(), "todo", 0, "done", 0))
            .unwrap();

        assert!(ids(&manager, "todo").is_empty());
        assert_eq!(titles(&manager, "done"), vec!["a"]);
        assert_eq!(manager.task(&t[0]).unwrap().status.as_str(), "done");
        assert_eq!(outcome.task.status.as_str(), "done");
        assert_eq!(outcome.columns.len(), 2);
        assert!(outcome.columns[&ColumnId::from("todo")].is_empty());
        assert_eq!(outcome.columns[&ColumnId::from("done")].len(), 1);
    }

    #[test]
    fn test_move_across_columns_clamps_index() {
        let (mut manager, t) = manager_with_todo(&["a", "b"]);
        manager
            .create_task(NewTask::new("x").with_status("done"))
            .unwrap();

        manager
            .move_task(&MoveIntent::new(t[1].clone(), "todo", 1, "done", 42))
            .unwrap();
        assert_eq!(titles(&manager, "done"), vec!["x", "b"]);
    }

    #[test]
    fn test_move_to_column_end() {
        let (mut manager, t) = manager_with_todo(&["a", "b"]);
        manager
            .create_task(NewTask::new("x").with_status("done"))
            .unwrap();

        manager
            .move_task(&MoveIntent::to_column_end(t[0].clone(), "todo", 0, "done"))
            .unwrap();
        assert_eq!(titles(&manager, "done"), vec!["x", "a"]);
        assert_eq!(titles(&manager, "todo"), vec!["b"]);
    }

    #[test]
    fn test_move_to_own_column_end_is_noop() {
        let (mut manager, t) = manager_with_todo(&["a", "b", "c"]);
        let before = manager.snapshot();

        manager
            .move_task(&MoveIntent::to_column_end(t[1].clone(), "todo", 1, "todo"))
            .unwrap();
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_stale_move_conflicts() {
        let (mut manager, t) = manager_with_todo(&["a", "b", "c"]);
        let before = manager.snapshot();

        let err = manager
            .move_task(&MoveIntent::new(t[2].clone(), "todo", 0, "done", 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = manager
            .move_task(&MoveIntent::new(t[2].clone(), "done", 0, "todo", 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = manager
            .move_task(&MoveIntent::new(t[2].clone(), "todo", 10, "todo", 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_repeated_cross_column_move_conflicts() {
        let (mut manager, t) = manager_with_todo(&["a", "b"]);
        let intent = MoveIntent::new(t[0].clone(), "todo", 0, "done", 0);

        manager.move_task(&intent).unwrap();
        let after_first = manager.snapshot();

        let err = manager.move_task(&intent).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(manager.snapshot(), after_first);
    }

    #[test]
    fn test_repeated_identity_move_is_noop() {
        let (mut manager, t) = manager_with_todo(&["a", "b"]);
        let intent = MoveIntent::new(t[1].clone(), "todo", 1, "todo", 1);
        let before = manager.snapshot();

        manager.move_task(&intent).unwrap();
        manager.move_task(&intent).unwrap();
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_move_unknown_ids() {
        let (mut manager, t) = manager_with_todo(&["a"]);

        let err = manager
            .move_task(&MoveIntent::new("ghost", "todo", 0, "done", 0))
            .unwrap_err();
        assert!(matches!(err, BoardError::TaskNotFound(_)));

        let err = manager
            .move_task(&MoveIntent::new(t[0].clone(), "todo", 0, "backlog", 0))
            .unwrap_err();
        assert!(matches!(err, BoardError::ColumnNotFound(_)));
        assert_eq!(titles(&manager, "todo"), vec!["a"]);
    }

    #[test]
    fn test_dispatch_drop_onto_last_item_vs_column_area() {
        let mut manager = BoardManager::from_board(sample_board(Utc::now()).unwrap()).unwrap();

        // Onto the last task of another column: lands before it.
        manager
            .dispatch_drop(
                &TaskId::from("task-1"),
                &DropTarget::Task(TaskId::from("task-4")),
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            ids(&manager, "inProgress"),
            vec!["task-3", "task-1", "task-4"]
        );

        // Onto the column area: appended after the last task.
        manager
            .dispatch_drop(
                &TaskId::from("task-2"),
                &DropTarget::Column(ColumnId::from("inProgress")),
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            ids(&manager, "inProgress"),
            vec!["task-3", "task-1", "task-4", "task-2"]
        );
        assert!(ids(&manager, "todo").is_empty());
        assert_eq!(
            manager.task(&TaskId::from("task-2")).unwrap().status.as_str(),
            "inProgress"
        );
    }

    #[test]
    fn test_dispatch_drop_into_empty_column() {
        let config = BoardConfig {
            columns: vec![
                ColumnConfig::new("todo", "To Do"),
                ColumnConfig::new("blocked", "Blocked"),
            ],
            ..BoardConfig::default()
        };
        let mut manager = BoardManager::new(config).unwrap();
        let task = manager.create_task(NewTask::new("a")).unwrap();

        let outcome = manager
            .dispatch_drop(&task.id, &DropTarget::Column(ColumnId::from("blocked")))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.task.status.as_str(), "blocked");
        assert_eq!(ids(&manager, "blocked"), vec![task.id.to_string()]);
    }

    #[test]
    fn test_dispatch_drop_within_column() {
        let mut manager = BoardManager::from_board(sample_board(Utc::now()).unwrap()).unwrap();

        manager
            .dispatch_drop(
                &TaskId::from("task-1"),
                &DropTarget::Task(TaskId::from("task-2")),
            )
            .unwrap()
            .unwrap();
        assert_eq!(ids(&manager, "todo"), vec!["task-2", "task-1"]);

        let noop = manager
            .dispatch_drop(
                &TaskId::from("task-1"),
                &DropTarget::Column(ColumnId::from("todo")),
            )
            .unwrap();
        assert!(noop.is_none());
    }

    #[test]
    fn test_from_board_rejects_inconsistent_snapshot() {
        let mut board = sample_board(Utc::now()).unwrap();
        board
            .tasks
            .get_mut(&TaskId::from("task-1"))
            .unwrap()
            .status = ColumnId::from("done");

        let err = BoardManager::from_board(board).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_from_board_rejects_unknown_default_column() {
        let mut board = sample_board(Utc::now()).unwrap();
        board.config.default_column = Some(ColumnId::from("backlog"));

        let err = BoardManager::from_board(board).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
