//! # Taskboard Core
//!
//! Board state for a kanban-style task board.
//!
//! Tasks live in ordered columns. [`BoardManager`] is the single mutation
//! path: it creates, updates and deletes tasks, reorders columns and applies
//! drag-and-drop moves while keeping each task's status, its column's task
//! sequence and the column order consistent with one another.

pub mod api;
pub mod domain;
pub mod error;
pub mod intent;
pub mod manager;
pub mod shared;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig, ColumnConfig},
    column::{Column, ColumnId},
    task::{NewTask, Priority, Task, TaskId, TaskPatch},
};
pub use error::{BoardError, ErrorKind, Result};
pub use intent::{resolve_drop, DropTarget, MoveIntent};
pub use manager::{BoardManager, MoveOutcome};
pub use shared::SharedBoard;
pub use storage::Storage;
