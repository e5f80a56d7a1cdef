pub mod board;
pub mod column;
pub mod sample;
pub mod task;

pub use board::{Board, BoardConfig, ColumnConfig};
pub use column::{Column, ColumnId};
pub use sample::sample_board;
pub use task::{NewTask, Priority, Task, TaskId, TaskPatch};
